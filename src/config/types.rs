// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub static_files: StaticFilesConfig,
    pub upstream: UpstreamConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
}

/// Static asset configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StaticFilesConfig {
    /// Base directory assets are resolved against
    pub root: PathBuf,
    /// Document served for `/`
    pub default_document: String,
}

/// Upstream trade-data API configuration
#[derive(Deserialize, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    /// Empty means "not configured"; proxy operations fail per request
    #[serde(default)]
    pub api_key: String,
    /// Per-request timeout in seconds, unset means wait indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Path prefix reserved for proxy operations
    pub api_prefix: String,
}

impl UpstreamConfig {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

// Keeps the key out of `{:?}` output
impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.has_api_key() { "<redacted>" } else { "<unset>" })
            .field("timeout_secs", &self.timeout_secs)
            .field("api_prefix", &self.api_prefix)
            .finish()
    }
}
