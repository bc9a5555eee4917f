//! Crawler module for the catalog pipeline
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching of pages and raw images
//! - HTML queries by tag and class
//! - Tag listing pagination
//! - Gallery walking and image selection
//! - The bounded worker pool and overall coordination

mod coordinator;
mod fetcher;
mod paginator;
mod parser;
mod resolver;
mod scheduler;

pub use coordinator::{process_artist, run_crawl, Coordinator};
pub use fetcher::{build_http_client, fetch_binary, fetch_page, BinaryResponse, Page};
pub use paginator::{extract_artist_links, ArtistLink, ListingPaginator, TagQuery};
pub use parser::{Document, Element};
pub use resolver::{gallery_url, image_filename, resolve_image, ImageCandidate, ACCEPTED_MIME};
pub use scheduler::Scheduler;

use crate::config::Config;
use crate::output::StatisticsSnapshot;
use crate::ScraperError;

/// Runs a complete scrape
///
/// This is the main entry point. It will:
/// 1. Build the shared HTTP client
/// 2. Walk every tag's listing pages
/// 3. Resolve and upload each artist on the worker pool
/// 4. Wait for all artist tasks and return the run statistics
pub async fn crawl(
    config: Config,
    token: impl Into<String>,
) -> Result<StatisticsSnapshot, ScraperError> {
    run_crawl(config, token).await
}
