//! Content-Type allow-list
//!
//! Only three kinds of asset are ever served. Anything else is treated as
//! not found, whether or not the file exists on disk.

/// Suffixes that may be served, in match order
const ALLOWED: [(&str, &str); 3] = [
    (".html", "text/html"),
    (".js", "application/javascript"),
    (".css", "text/css"),
];

/// Content-Type for a request path, or `None` if the suffix is not allow-listed
///
/// # Examples
/// ```
/// use tradeproxy::http::mime::content_type_for;
/// assert_eq!(content_type_for("/index.html"), Some("text/html"));
/// assert_eq!(content_type_for("/app/main.js"), Some("application/javascript"));
/// assert_eq!(content_type_for("/style.txt"), None);
/// ```
pub fn content_type_for(path: &str) -> Option<&'static str> {
    ALLOWED
        .iter()
        .find(|(suffix, _)| path.ends_with(suffix))
        .map(|&(_, content_type)| content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_types() {
        assert_eq!(content_type_for("/index.html"), Some("text/html"));
        assert_eq!(content_type_for("/css/site.css"), Some("text/css"));
        assert_eq!(content_type_for("/index.js"), Some("application/javascript"));
    }

    #[test]
    fn test_rejected_types() {
        assert_eq!(content_type_for("/style.txt"), None);
        assert_eq!(content_type_for("/data.json"), None);
        assert_eq!(content_type_for("/index.htm"), None);
        assert_eq!(content_type_for("/script.mjs"), None);
        assert_eq!(content_type_for("/"), None);
        assert_eq!(content_type_for("/.env"), None);
    }

    #[test]
    fn test_suffix_is_case_sensitive() {
        assert_eq!(content_type_for("/INDEX.HTML"), None);
    }
}
