//! Static asset server with a read-only proxy to a third-party trade-data API.

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod upstream;
