//! cvrs-scraper: artist discovery for the cvrs catalog
//!
//! This crate walks the tag listings of a catalog site, resolves one
//! representative image per artist and uploads the pair to the cvrs
//! ingestion endpoint.

pub mod config;
pub mod crawler;
pub mod ingest;
pub mod output;

use thiserror::Error;

/// Main error type for scraper operations
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised by a GET against the catalog site
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: ::url::ParseError,
    },
}

/// Errors raised by an upload to the ingestion endpoint
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Upload HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Ingestion endpoint rejected upload with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to encode metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// Result type alias for scraper operations
pub type Result<T> = std::result::Result<T, ScraperError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{ArtistLink, ImageCandidate};
pub use ingest::{ArtistSubmission, IngestClient};
