//! Configuration module for cvrs-scraper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use cvrs_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scraper.toml")).unwrap();
//! println!("Walking {} tags", config.catalog.tags.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BackendConfig, CatalogConfig, Config, HttpConfig, WorkerConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, read_token};

pub use validation::validate;
