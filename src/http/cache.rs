//! HTTP cache validation module
//!
//! `ETag` generation and `If-None-Match` handling for static assets.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Cache-Control value sent with static assets
pub const ASSET_CACHE_CONTROL: &str = "public, max-age=3600";

/// Generate a quoted `ETag` from content and length
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}-{:x}\"", content.len(), hasher.finish())
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Handles a list of tags, weak tags (`W/"..."`) and the `*` wildcard.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|header| {
        header.split(',').map(str::trim).any(|candidate| {
            candidate == "*" || candidate.trim_start_matches("W/") == etag
        })
    })
}
