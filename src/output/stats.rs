//! Run statistics
//!
//! Counters are shared between the coordinator and every worker task, so
//! they are plain atomics behind an `Arc`; a [`StatisticsSnapshot`] is taken
//! for display once the run ends.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// How one artist task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtistOutcome {
    /// The endpoint accepted the upload
    Submitted { with_image: bool },

    /// The endpoint answered with a non-success status
    Rejected,

    /// The upload request itself failed
    Failed,
}

/// Live counters for a run
#[derive(Debug)]
pub struct RunStatistics {
    started_at: DateTime<Utc>,
    finished_at: Mutex<Option<DateTime<Utc>>>,

    listing_pages_fetched: AtomicU64,
    listing_pages_failed: AtomicU64,
    tags_completed: AtomicU64,
    tags_aborted: AtomicU64,
    artists_discovered: AtomicU64,
    images_resolved: AtomicU64,
    images_missing: AtomicU64,
    resolve_failures: AtomicU64,
    submissions_ok: AtomicU64,
    submissions_without_image: AtomicU64,
    submissions_rejected: AtomicU64,
    submissions_failed: AtomicU64,
    tasks_panicked: AtomicU64,
}

/// Point-in-time copy of [`RunStatistics`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsSnapshot {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub listing_pages_fetched: u64,
    pub listing_pages_failed: u64,
    pub tags_completed: u64,
    pub tags_aborted: u64,
    pub artists_discovered: u64,
    pub images_resolved: u64,
    pub images_missing: u64,
    pub resolve_failures: u64,
    pub submissions_ok: u64,
    pub submissions_without_image: u64,
    pub submissions_rejected: u64,
    pub submissions_failed: u64,
    pub tasks_panicked: u64,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: Mutex::new(None),
            listing_pages_fetched: AtomicU64::new(0),
            listing_pages_failed: AtomicU64::new(0),
            tags_completed: AtomicU64::new(0),
            tags_aborted: AtomicU64::new(0),
            artists_discovered: AtomicU64::new(0),
            images_resolved: AtomicU64::new(0),
            images_missing: AtomicU64::new(0),
            resolve_failures: AtomicU64::new(0),
            submissions_ok: AtomicU64::new(0),
            submissions_without_image: AtomicU64::new(0),
            submissions_rejected: AtomicU64::new(0),
            submissions_failed: AtomicU64::new(0),
            tasks_panicked: AtomicU64::new(0),
        }
    }

    pub fn record_listing_page(&self, artists: usize) {
        self.listing_pages_fetched.fetch_add(1, Ordering::Relaxed);
        self.artists_discovered
            .fetch_add(artists as u64, Ordering::Relaxed);
    }

    /// A listing fetch failed and the rest of the tag was skipped
    pub fn record_tag_aborted(&self) {
        self.listing_pages_failed.fetch_add(1, Ordering::Relaxed);
        self.tags_aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tag_completed(&self) {
        self.tags_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_image(&self, found: bool) {
        if found {
            self.images_resolved.fetch_add(1, Ordering::Relaxed);
        } else {
            self.images_missing.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// The gallery index could not be fetched; the artist goes on without an image
    pub fn record_resolve_failure(&self) {
        self.resolve_failures.fetch_add(1, Ordering::Relaxed);
        self.images_missing.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_outcome(&self, outcome: ArtistOutcome) {
        let counter = match outcome {
            ArtistOutcome::Submitted { with_image } => {
                if !with_image {
                    self.submissions_without_image
                        .fetch_add(1, Ordering::Relaxed);
                }
                &self.submissions_ok
            }
            ArtistOutcome::Rejected => &self.submissions_rejected,
            ArtistOutcome::Failed => &self.submissions_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_panics(&self, count: usize) {
        self.tasks_panicked
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn mark_finished(&self) {
        if let Ok(mut finished) = self.finished_at.lock() {
            *finished = Some(Utc::now());
        }
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        let finished_at = self.finished_at.lock().ok().and_then(|f| *f);
        StatisticsSnapshot {
            started_at: self.started_at,
            finished_at,
            listing_pages_fetched: self.listing_pages_fetched.load(Ordering::Relaxed),
            listing_pages_failed: self.listing_pages_failed.load(Ordering::Relaxed),
            tags_completed: self.tags_completed.load(Ordering::Relaxed),
            tags_aborted: self.tags_aborted.load(Ordering::Relaxed),
            artists_discovered: self.artists_discovered.load(Ordering::Relaxed),
            images_resolved: self.images_resolved.load(Ordering::Relaxed),
            images_missing: self.images_missing.load(Ordering::Relaxed),
            resolve_failures: self.resolve_failures.load(Ordering::Relaxed),
            submissions_ok: self.submissions_ok.load(Ordering::Relaxed),
            submissions_without_image: self.submissions_without_image.load(Ordering::Relaxed),
            submissions_rejected: self.submissions_rejected.load(Ordering::Relaxed),
            submissions_failed: self.submissions_failed.load(Ordering::Relaxed),
            tasks_panicked: self.tasks_panicked.load(Ordering::Relaxed),
        }
    }
}

impl Default for RunStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl StatisticsSnapshot {
    /// Artists whose task reached the upload step
    pub fn submissions_attempted(&self) -> u64 {
        self.submissions_ok + self.submissions_rejected + self.submissions_failed
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StatisticsSnapshot) {
    println!("=== Scrape Statistics ===\n");

    println!("Listings:");
    println!("  Pages fetched: {}", stats.listing_pages_fetched);
    println!("  Pages failed: {}", stats.listing_pages_failed);
    println!(
        "  Tags completed: {} (aborted: {})",
        stats.tags_completed, stats.tags_aborted
    );
    println!();

    println!("Artists:");
    println!("  Discovered: {}", stats.artists_discovered);
    println!("  With JPEG image: {}", stats.images_resolved);
    println!("  Without image: {}", stats.images_missing);
    if stats.resolve_failures > 0 {
        println!("  Gallery fetch failures: {}", stats.resolve_failures);
    }
    println!();

    println!("Uploads:");
    println!(
        "  Accepted: {} (name only: {})",
        stats.submissions_ok, stats.submissions_without_image
    );
    println!("  Rejected: {}", stats.submissions_rejected);
    println!("  Failed: {}", stats.submissions_failed);
    if stats.tasks_panicked > 0 {
        println!("  Panicked tasks: {}", stats.tasks_panicked);
    }
    println!();

    let attempted = stats.submissions_attempted();
    let success_rate = if attempted > 0 {
        (stats.submissions_ok as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} uploads accepted)",
        success_rate, stats.submissions_ok, attempted
    );

    if let Some(seconds) = stats.duration_seconds() {
        println!("Duration: {}s", seconds);
    }
}
