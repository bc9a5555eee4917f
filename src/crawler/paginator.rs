//! Tag listing pagination
//!
//! Each configured tag is walked page by page through
//! `{base}/tag/{tag}/artists?page={n}` for a fixed number of pages. The
//! markup carries no reliable "last page" marker, so the page cap alone ends
//! the walk.

use crate::crawler::fetcher::fetch_page;
use crate::crawler::parser::Document;
use crate::FetchError;
use reqwest::Client;

/// Heading that wraps each artist entry on a listing page
const ARTIST_TITLE_TAG: &str = "h3";
const ARTIST_TITLE_CLASS: &str = "big-artist-list-title";

/// An artist entry extracted from a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistLink {
    /// Display name as shown in the listing
    pub name: String,

    /// Profile path relative to the catalog root (e.g. "/music/Artist")
    pub href: String,
}

/// Pagination state for one tag
#[derive(Debug, Clone)]
pub struct TagQuery {
    pub tag: String,
    listing_url: String,
    page: u32,
    max_page: u32,
}

impl TagQuery {
    /// Creates a query positioned before page 1
    pub fn new(base_url: &str, tag: &str, max_page: u32) -> Self {
        Self {
            tag: tag.to_string(),
            listing_url: format!("{}/tag/{}/artists", base_url.trim_end_matches('/'), tag),
            page: 0,
            max_page,
        }
    }

    /// Listing URL without the page parameter
    pub fn listing_url(&self) -> &str {
        &self.listing_url
    }

    /// Last page handed out by [`TagQuery::next_page`] (0 before the first)
    pub fn current_page(&self) -> u32 {
        self.page
    }

    /// Advances to the next page number, or `None` once past the cap
    ///
    /// The counter never goes backwards; after the cap is reached every
    /// further call returns `None`.
    pub fn next_page(&mut self) -> Option<u32> {
        if self.page >= self.max_page {
            return None;
        }
        self.page += 1;
        Some(self.page)
    }
}

/// Walks the listing pages of one tag, yielding the artists found on each
pub struct ListingPaginator {
    client: Client,
    query: TagQuery,

    /// Set after a failed fetch; the remaining pages are skipped
    stopped: bool,
}

impl ListingPaginator {
    pub fn new(client: Client, base_url: &str, tag: &str, max_page: u32) -> Self {
        Self {
            client,
            query: TagQuery::new(base_url, tag, max_page),
            stopped: false,
        }
    }

    pub fn query(&self) -> &TagQuery {
        &self.query
    }

    /// Fetches the next listing page
    ///
    /// # Returns
    ///
    /// * `Some(Ok(links))` - The artists listed on the page (possibly none)
    /// * `Some(Err(e))` - The page could not be fetched; the paginator is
    ///   exhausted afterwards, so the rest of this tag is skipped
    /// * `None` - All pages up to the cap have been handed out
    pub async fn next_page(&mut self) -> Option<Result<Vec<ArtistLink>, FetchError>> {
        if self.stopped {
            return None;
        }
        let page = self.query.next_page()?;

        let result = fetch_page(
            &self.client,
            self.query.listing_url(),
            &[("page", page.to_string())],
        )
        .await;

        match result {
            Ok(fetched) => {
                let links = extract_artist_links(&fetched.document());
                tracing::debug!(
                    "Tag {} page {}: {} artists",
                    self.query.tag,
                    page,
                    links.len()
                );
                Some(Ok(links))
            }
            Err(e) => {
                self.stopped = true;
                Some(Err(e))
            }
        }
    }
}

/// Extracts every artist entry from a listing page
///
/// Headings without an anchor, or anchors without an `href`, are skipped.
/// Duplicates are kept.
pub fn extract_artist_links(document: &Document) -> Vec<ArtistLink> {
    document
        .find_all(ARTIST_TITLE_TAG, ARTIST_TITLE_CLASS)
        .iter()
        .filter_map(|heading| {
            let anchor = heading.find("a")?;
            let href = anchor.attr("href")?;
            Some(ArtistLink {
                name: anchor.text(),
                href: href.to_string(),
            })
        })
        .collect()
}
