// Configuration module entry point
// Loads layered configuration and exposes the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, StaticFilesConfig,
    UpstreamConfig,
};

/// Environment variable the upstream API key is read from
pub const API_KEY_ENV: &str = "API_KEY";

/// Prefix for environment overrides, e.g. `TRADEPROXY_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "TRADEPROXY";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Precedence, lowest first: defaults, config file, `TRADEPROXY_*`
    /// environment, then `API_KEY` for the upstream key.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());

        let builder = Self::defaults(config::Config::builder())?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("upstream.api_key", api_key)?;

        builder.build()?.try_deserialize()
    }

    /// Built-in configuration without any file or environment input
    pub fn default_config() -> Result<Self, config::ConfigError> {
        Self::defaults(config::Config::builder())?
            .build()?
            .try_deserialize()
    }

    fn defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "tradeproxy/0.1")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("static_files.root", ".")?
            .set_default("static_files.default_document", "index.html")?
            .set_default("upstream.base_url", "https://api.tradingeconomics.com")?
            .set_default("upstream.api_key", "")?
            .set_default("upstream.api_prefix", "/api/")
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default_config().unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.static_files.default_document, "index.html");
        assert_eq!(cfg.upstream.base_url, "https://api.tradingeconomics.com");
        assert_eq!(cfg.upstream.api_prefix, "/api/");
        assert!(!cfg.upstream.has_api_key());
        assert!(cfg.upstream.timeout_secs.is_none());
        assert!(cfg.performance.max_connections.is_none());
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::default_config().unwrap();
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 8080);

        cfg.server.host = "not an ip".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let mut cfg = Config::default_config().unwrap();
        cfg.upstream.api_key = "secret-key".to_string();
        let rendered = format!("{:?}", cfg.upstream);
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxy.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9090\n\n[static_files]\nroot = \"public\"\n",
        )
        .unwrap();

        let stem = dir.path().join("proxy");
        let cfg = Config::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.static_files.root, std::path::PathBuf::from("public"));
        // Unset keys keep their defaults
        assert_eq!(cfg.server.host, "127.0.0.1");
    }
}
