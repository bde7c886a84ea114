//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from specific business logic.
//! Shared between the static asset responder and the upstream proxy operations.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use response::{
    build_304_response, build_405_response, build_413_response,
    build_json_response, build_options_response, build_text_response,
};
