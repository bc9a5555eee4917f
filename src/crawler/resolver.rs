//! Artist image resolution
//!
//! An artist's image is found by walking three dependent hops:
//!
//! 1. `{base}/{artist}/+images` - the gallery index, listing entry pages
//! 2. each entry page - holds one `img.js-gallery-image` element
//! 3. that image's `src` - fetched raw to read its declared Content-Type
//!
//! Entries are visited in listing order and the walk stops at the first
//! image served as `image/jpeg`. Later entries are never fetched.

use crate::crawler::fetcher::{fetch_binary, fetch_page};
use crate::crawler::parser::Document;
use crate::FetchError;
use reqwest::Client;
use url::Url;

const GALLERY_ITEM_TAG: &str = "a";
const GALLERY_ITEM_CLASS: &str = "image-list-item";
const GALLERY_IMAGE_TAG: &str = "img";
const GALLERY_IMAGE_CLASS: &str = "js-gallery-image";

/// The only MIME type accepted for upload
pub const ACCEPTED_MIME: &str = "image/jpeg";

/// Used when the image URL has no usable last path segment
const FALLBACK_FILENAME: &str = "image.jpg";

/// An image selected for an artist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub content: Vec<u8>,

    /// Derived from the last path segment of the image URL
    pub filename: String,

    /// Declared MIME type
    pub mime: String,
}

/// Resolves the first JPEG image from an artist's gallery
///
/// # Arguments
///
/// * `client` - The shared HTTP client
/// * `base_url` - Catalog root URL
/// * `artist_href` - Profile path from the listing (e.g. "/music/Artist")
///
/// # Returns
///
/// * `Ok(Some(candidate))` - The first gallery entry served as `image/jpeg`
/// * `Ok(None)` - The gallery has no entries, or none of them is a JPEG
/// * `Err(FetchError)` - The gallery index itself could not be fetched
///
/// Failures on individual entries are logged and the scan moves on to the
/// next entry.
pub async fn resolve_image(
    client: &Client,
    base_url: &str,
    artist_href: &str,
) -> Result<Option<ImageCandidate>, FetchError> {
    let gallery_url = gallery_url(base_url, artist_href);
    let gallery = fetch_page(client, &gallery_url, &[]).await?;
    let entries = gallery_entry_urls(&gallery.document(), &gallery.url);

    if entries.is_empty() {
        tracing::debug!("No gallery entries at {}", gallery_url);
        return Ok(None);
    }

    for entry_url in &entries {
        match resolve_entry(client, entry_url).await {
            Ok(Some(candidate)) => return Ok(Some(candidate)),
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!("Skipping gallery entry {}: {}", entry_url, e);
                continue;
            }
        }
    }

    tracing::debug!(
        "No {} image among {} entries at {}",
        ACCEPTED_MIME,
        entries.len(),
        gallery_url
    );
    Ok(None)
}

/// Fetches one gallery entry and its image, accepting only JPEGs
async fn resolve_entry(
    client: &Client,
    entry_url: &str,
) -> Result<Option<ImageCandidate>, FetchError> {
    let entry = fetch_page(client, entry_url, &[]).await?;
    let src = gallery_image_src(&entry.document());
    let src = match src {
        Some(src) => src,
        None => {
            tracing::debug!("No gallery image element on {}", entry_url);
            return Ok(None);
        }
    };

    let image_url = entry
        .url
        .join(&src)
        .map_err(|source| FetchError::InvalidUrl {
            url: src.clone(),
            source,
        })?;

    let image = fetch_binary(client, image_url.as_str()).await?;
    match image.content_type.as_deref() {
        Some(ACCEPTED_MIME) => {
            let filename = image_filename(&src);
            tracing::debug!("Accepted {} ({})", filename, ACCEPTED_MIME);
            Ok(Some(ImageCandidate {
                content: image.content,
                filename,
                mime: ACCEPTED_MIME.to_string(),
            }))
        }
        other => {
            tracing::debug!("Rejected {}: content type {:?}", image_url, other);
            Ok(None)
        }
    }
}

/// Gallery index URL for an artist profile path
pub fn gallery_url(base_url: &str, artist_href: &str) -> String {
    format!(
        "{}/{}/+images",
        base_url.trim_end_matches('/'),
        artist_href.trim_matches('/')
    )
}

/// Absolute URLs of every gallery entry, in page order
///
/// Hrefs are resolved against the gallery page URL, so root-relative,
/// path-relative and protocol-relative links all land where a browser would
/// send them. Hrefs that cannot be joined are skipped.
fn gallery_entry_urls(document: &Document, page_url: &Url) -> Vec<String> {
    document
        .find_all(GALLERY_ITEM_TAG, GALLERY_ITEM_CLASS)
        .iter()
        .filter_map(|item| item.attr("href"))
        .filter_map(|href| match page_url.join(href) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                tracing::debug!("Skipping gallery href {:?}: {}", href, e);
                None
            }
        })
        .collect()
}

fn gallery_image_src(document: &Document) -> Option<String> {
    document
        .find_first(GALLERY_IMAGE_TAG, GALLERY_IMAGE_CLASS)?
        .attr("src")
        .map(|src| src.to_string())
}

/// Filename for an image URL: the last path segment, fragment stripped
///
/// ```
/// use cvrs_scraper::crawler::image_filename;
///
/// assert_eq!(image_filename("https://cdn.example/i/u/cover.jpg#ignore"), "cover.jpg");
/// ```
pub fn image_filename(src: &str) -> String {
    let last = src.rsplit('/').next().unwrap_or_default();
    let name = last.split('#').next().unwrap_or_default();
    if name.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        name.to_string()
    }
}
