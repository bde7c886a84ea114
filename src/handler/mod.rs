//! Request handler module
//!
//! Responsible for request routing dispatch and business logic processing.
//! Requests under the API prefix are proxied upstream; everything else is a static asset.

pub mod api;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
