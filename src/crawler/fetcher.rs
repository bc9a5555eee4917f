//! HTTP fetcher implementation
//!
//! This module handles all GET requests against the catalog site:
//! - Building the shared HTTP client
//! - HTML page fetches (listings, galleries, gallery entries)
//! - Raw binary fetches for image sources
//! - Error classification into `FetchError`

use crate::config::HttpConfig;
use crate::crawler::parser::Document;
use crate::FetchError;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

/// An HTML page fetched from the catalog
#[derive(Debug, Clone)]
pub struct Page {
    /// Final URL after redirects, used to resolve relative links
    pub url: Url,

    /// Page body content
    pub body: String,
}

impl Page {
    /// Parses the body into a queryable document
    ///
    /// The returned tree is not `Send`; extract what you need from it before
    /// the next await point.
    pub fn document(&self) -> Document {
        Document::parse(&self.body)
    }
}

/// A raw (non-HTML) response, such as an image
#[derive(Debug, Clone)]
pub struct BinaryResponse {
    /// Declared Content-Type header value, if any
    pub content_type: Option<String>,

    pub content: Vec<u8>,
}

/// Builds the HTTP client shared by every fetch and upload
///
/// The client pools connections internally and is cheap to clone, so it is
/// built once and handed to every component.
///
/// # Example
///
/// ```no_run
/// use cvrs_scraper::config::HttpConfig;
/// use cvrs_scraper::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches an HTML page with optional query parameters
///
/// Any non-2xx status is reported as `FetchError::Status` carrying the body,
/// so callers never parse an error page as if it were content.
///
/// # Arguments
///
/// * `client` - The shared HTTP client
/// * `url` - The URL to fetch
/// * `query` - Query parameters appended to the URL
pub async fn fetch_page(
    client: &Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<Page, FetchError> {
    tracing::debug!("GET {} {:?}", url, query);

    let response = send_get(client, url, query).await?;
    let final_url = response.url().clone();

    let body = response.text().await.map_err(|source| FetchError::Transport {
        url: url.to_string(),
        source,
    })?;

    Ok(Page {
        url: final_url,
        body,
    })
}

/// Fetches a URL as raw bytes, keeping the declared Content-Type
pub async fn fetch_binary(client: &Client, url: &str) -> Result<BinaryResponse, FetchError> {
    tracing::debug!("GET (binary) {}", url);

    let response = send_get(client, url, &[]).await?;
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    let content = response
        .bytes()
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?
        .to_vec();

    Ok(BinaryResponse {
        content_type,
        content,
    })
}

/// Sends a GET and turns transport failures and non-2xx statuses into errors
async fn send_get(
    client: &Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<Response, FetchError> {
    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|source| {
            if source.is_timeout() {
                tracing::warn!("Request timeout for {}", url);
            }
            FetchError::Transport {
                url: url.to_string(),
                source,
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    Ok(response)
}
