//! Crawl coordinator - main pipeline orchestration
//!
//! This module contains the control loop that:
//! - Walks each configured tag's listing pages in order
//! - Hands every discovered artist to the bounded scheduler
//! - Runs image resolution and upload inside each artist task
//! - Collects run statistics

use crate::config::{validate, Config};
use crate::crawler::paginator::{ArtistLink, ListingPaginator};
use crate::crawler::resolver::resolve_image;
use crate::crawler::scheduler::Scheduler;
use crate::crawler::build_http_client;
use crate::ingest::{ArtistSubmission, IngestClient};
use crate::output::{ArtistOutcome, RunStatistics, StatisticsSnapshot};
use crate::{ScraperError, SubmitError};
use reqwest::Client;
use std::sync::Arc;

/// Main pipeline coordinator
pub struct Coordinator {
    config: Arc<Config>,
    client: Client,
    ingest: IngestClient,
    stats: Arc<RunStatistics>,
}

impl Coordinator {
    /// Creates a new coordinator with its own HTTP client
    ///
    /// The configuration is validated first, so a config built in code gets
    /// the same checks as one loaded from a file.
    ///
    /// # Arguments
    ///
    /// * `config` - The scraper configuration
    /// * `token` - Bearer token for the ingestion endpoint
    pub fn new(config: Config, token: impl Into<String>) -> Result<Self, ScraperError> {
        validate(&config)?;
        let client = build_http_client(&config.http)?;
        Ok(Self::with_client(config, client, token))
    }

    /// Creates a coordinator around an existing HTTP client
    pub fn with_client(config: Config, client: Client, token: impl Into<String>) -> Self {
        let ingest = IngestClient::new(client.clone(), config.backend.artists_add_url(), token);
        Self {
            config: Arc::new(config),
            client,
            ingest,
            stats: Arc::new(RunStatistics::new()),
        }
    }

    /// Runs the whole pipeline
    ///
    /// Tags are walked one after another, each page strictly after the
    /// previous one. A listing fetch failure ends only the current tag.
    /// Artist tasks never report errors back here; their outcomes end up in
    /// the returned statistics. Returns once every submitted task finished.
    pub async fn run(&self) -> Result<StatisticsSnapshot, ScraperError> {
        let catalog = &self.config.catalog;
        let mut scheduler = Scheduler::new(self.config.workers.capacity as usize);

        tracing::info!(
            "Starting scrape of {} tags ({} pages each, {} workers)",
            catalog.tags.len(),
            catalog.max_page,
            scheduler.capacity()
        );

        let base_url: Arc<str> = Arc::from(catalog.base_url.trim_end_matches('/'));

        for tag in &catalog.tags {
            let mut paginator =
                ListingPaginator::new(self.client.clone(), &base_url, tag, catalog.max_page);
            let mut aborted = false;

            while let Some(page) = paginator.next_page().await {
                let page_number = paginator.query().current_page();
                let links = match page {
                    Ok(links) => links,
                    Err(e) => {
                        tracing::warn!(
                            "Listing fetch failed for tag {} page {}, skipping rest of tag: {}",
                            tag,
                            page_number,
                            e
                        );
                        self.stats.record_tag_aborted();
                        aborted = true;
                        break;
                    }
                };

                tracing::info!(
                    "Tag {} page {}/{}: {} artists",
                    tag,
                    page_number,
                    catalog.max_page,
                    links.len()
                );
                self.stats.record_listing_page(links.len());

                for link in links {
                    scheduler
                        .submit(process_artist(
                            self.client.clone(),
                            base_url.clone(),
                            self.ingest.clone(),
                            self.stats.clone(),
                            link,
                        ))
                        .await;
                }
            }

            if !aborted {
                self.stats.record_tag_completed();
            }
        }

        tracing::debug!("All tags walked, waiting for {} tasks", scheduler.in_flight());
        let panicked = scheduler.join_all().await;
        self.stats.record_panics(panicked);
        self.stats.mark_finished();

        let snapshot = self.stats.snapshot();
        tracing::info!(
            "Scrape completed: {} artists, {} uploads accepted",
            snapshot.artists_discovered,
            snapshot.submissions_ok
        );

        Ok(snapshot)
    }
}

/// Resolves and uploads one artist
///
/// Everything that goes wrong here stays here: a failed gallery fetch means
/// the artist is uploaded without an image, and a failed upload is logged
/// and counted.
pub async fn process_artist(
    client: Client,
    base_url: Arc<str>,
    ingest: IngestClient,
    stats: Arc<RunStatistics>,
    link: ArtistLink,
) {
    tracing::info!("Processing: {}", link.name);

    let image = match resolve_image(&client, &base_url, &link.href).await {
        Ok(image) => {
            stats.record_image(image.is_some());
            image
        }
        Err(e) => {
            tracing::warn!("Gallery lookup failed for {}: {}", link.name, e);
            stats.record_resolve_failure();
            None
        }
    };

    if let Some(candidate) = &image {
        tracing::debug!("{}: {} {}", link.name, candidate.mime, candidate.filename);
    }

    let submission = ArtistSubmission {
        name: link.name,
        image,
    };
    let with_image = submission.image.is_some();

    let outcome = match ingest.submit(&submission).await {
        Ok(()) => ArtistOutcome::Submitted { with_image },
        Err(SubmitError::Rejected { status, body }) => {
            tracing::warn!("Upload of {} rejected: {} {}", submission.name, status, body);
            ArtistOutcome::Rejected
        }
        Err(e) => {
            tracing::warn!("Upload of {} failed: {}", submission.name, e);
            ArtistOutcome::Failed
        }
    };

    stats.record_outcome(outcome);
}

/// Runs a complete scrape with a fresh coordinator
///
/// # Example
///
/// ```no_run
/// use cvrs_scraper::config::load_config;
/// use cvrs_scraper::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("scraper.toml"))?;
/// let stats = run_crawl(config, "token").await?;
/// println!("{} artists uploaded", stats.submissions_ok);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    token: impl Into<String>,
) -> Result<StatisticsSnapshot, ScraperError> {
    let coordinator = Coordinator::new(config, token)?;
    coordinator.run().await
}
