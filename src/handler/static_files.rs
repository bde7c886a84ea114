//! Static file serving module
//!
//! Serves allow-listed assets from the configured base directory.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::config::StaticFilesConfig;
use crate::error::{Result, RouteError};
use crate::http::{self, cache, mime};
use crate::logger;

/// The parts of a request the asset responder looks at
#[derive(Debug, Clone, Copy)]
pub struct AssetRequest<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
}

/// Serve a single asset
pub async fn serve(req: &AssetRequest<'_>, config: &StaticFilesConfig) -> Result<Response<Full<Bytes>>> {
    let asset_path = if req.path == "/" {
        format!("/{}", config.default_document)
    } else {
        req.path.to_string()
    };

    // Unlisted extensions are never served, even if present on disk
    let content_type = mime::content_type_for(&asset_path).ok_or(RouteError::NotFound)?;

    let file_path = resolve_path(&config.root, &asset_path)?;
    logger::log_static_path(&asset_path, &file_path);

    let file_path = confine_to_root(&config.root, &file_path).await?;
    let data = fs::read(&file_path).await?;

    let etag = cache::generate_etag(&data);
    if cache::check_etag_match(req.if_none_match, &etag) {
        return Ok(http::build_304_response(&etag));
    }

    Ok(http::response::build_asset_response(
        Bytes::from(data),
        content_type,
        &etag,
        req.is_head,
    ))
}

/// Join a request path onto `root` and make it absolute
///
/// Only plain path segments are accepted; `..` (or anything else that is
/// not a normal file name) is reported as not found.
pub fn resolve_path(root: &Path, request_path: &str) -> Result<PathBuf> {
    let relative = Path::new(request_path.trim_start_matches('/'));
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        logger::log_warning(&format!("Path traversal attempt blocked: {request_path}"));
        return Err(RouteError::NotFound);
    }

    std::path::absolute(root.join(relative)).map_err(RouteError::PathResolution)
}

/// Follow symlinks and make sure the target still lives under `root`
async fn confine_to_root(root: &Path, file_path: &Path) -> Result<PathBuf> {
    let canonical = fs::canonicalize(file_path).await?;
    let root = fs::canonicalize(root).await?;

    if !canonical.starts_with(&root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            file_path.display(),
            canonical.display()
        ));
        return Err(RouteError::NotFound);
    }

    if !fs::metadata(&canonical).await?.is_file() {
        return Err(RouteError::NotFound);
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_joins_under_root() {
        let root = Path::new("/srv/site");
        let resolved = resolve_path(root, "/js/app.js").unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/site/js/app.js"));
    }

    #[test]
    fn test_resolve_is_absolute_for_relative_root() {
        let resolved = resolve_path(Path::new("public"), "/index.html").unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("public/index.html"));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let root = Path::new("/srv/site");
        for path in ["/../etc/passwd.html", "/a/../../b.css", "/./index.html"] {
            assert!(
                matches!(resolve_path(root, path), Err(RouteError::NotFound)),
                "path: {path}"
            );
        }
    }
}
