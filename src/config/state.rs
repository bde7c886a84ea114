// Application state module
// Read-only configuration plus the handles shared by every request

use super::types::Config;
use crate::upstream::UpstreamClient;

/// Application state
pub struct AppState {
    pub config: Config,
    pub upstream: UpstreamClient,
}

impl AppState {
    /// Build state from a loaded configuration
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        Ok(Self { config, upstream })
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
