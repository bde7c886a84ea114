//! Logger module
//!
//! Thin helpers over `tracing` so call sites read the same everywhere:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging

mod format;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Target access log lines are emitted under
pub const ACCESS_TARGET: &str = "access";

/// Initialize the global subscriber
///
/// `RUST_LOG` takes precedence over `logging.level`. Should be called once at
/// application startup.
pub fn init(config: &Config) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .compact(),
        )
        .try_init()
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("======================================");
    tracing::info!("Trade proxy started successfully");
    tracing::info!("Listening on: http://{addr}");
    tracing::info!("Static root: {}", config.static_files.root.display());
    tracing::info!("Upstream: {}", config.upstream.base_url);
    if !config.upstream.has_api_key() {
        tracing::warn!("No upstream API key configured, proxy operations will fail");
    }
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    tracing::info!("======================================");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_idle(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Closing idle keep-alive connection from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_upstream_call(redacted_url: &str) {
    tracing::debug!("Calling upstream: {redacted_url}");
}

pub fn log_static_path(requested: &str, resolved: &std::path::Path) {
    tracing::debug!("Serving {requested} from {}", resolved.display());
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}

pub fn log_shutdown() {
    tracing::info!("Shutdown requested, no longer accepting connections");
}
