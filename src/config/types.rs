use serde::Deserialize;

/// Main configuration structure for the scraper
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub workers: WorkerConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Catalog site traversal configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Root URL of the catalog site (e.g., "https://www.last.fm")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Pre-encoded tag identifiers whose artist listings are walked
    pub tags: Vec<String>,

    /// Number of listing pages fetched per tag
    #[serde(rename = "max-page")]
    pub max_page: u32,
}

/// Ingestion endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the cvrs API (e.g., "http://localhost:3000/api")
    pub url: String,

    /// Environment variable holding the bearer token
    #[serde(rename = "token-env", default = "default_token_env")]
    pub token_env: String,
}

/// Worker pool configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Maximum number of artist tasks in flight
    #[serde(default = "default_capacity")]
    pub capacity: u32,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(
        rename = "connect-timeout-secs",
        default = "default_connect_timeout_secs"
    )]
    pub connect_timeout_secs: u64,
}

impl BackendConfig {
    /// URL of the artist upload route
    pub fn artists_add_url(&self) -> String {
        format!("{}/artists/add", self.url.trim_end_matches('/'))
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_token_env() -> String {
    "CVRS_TOKEN".to_string()
}

fn default_capacity() -> u32 {
    16
}

fn default_user_agent() -> String {
    format!("cvrs-scraper/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}
