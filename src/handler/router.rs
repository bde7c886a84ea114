//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: body size check, API prefix
//! matching, method validation for assets, and access logging.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SERVER};
use hyper::{Method, Request, Response};
use std::borrow::Cow;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::error::RouteError;
use crate::handler::{api, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let access_entry = state
        .access_log_enabled()
        .then(|| access_log_entry(&req, peer_addr));

    let mut response = route_request(req, &state).await;

    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server_name);
    }

    if let Some(mut entry) = access_entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.elapsed = started.elapsed();
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request to a proxy operation or the asset responder
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    // 1. Reject oversized bodies up front
    if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        return resp;
    }

    // 2. Percent-decode once so `%2e%2e` is caught like `..`
    let Some(path) = decode_path(req.uri().path()) else {
        return error_response(RouteError::NotFound);
    };
    let path = path.into_owned();

    // 3. Proxy operations, any method
    if let Some(operation) = path.strip_prefix(state.config.upstream.api_prefix.as_str()) {
        return api::dispatch(operation, req, state)
            .await
            .unwrap_or_else(error_response);
    }

    // 4. Static assets, GET/HEAD only
    if let Some(resp) = check_http_method(req.method(), state.config.http.enable_cors) {
        return resp;
    }

    let asset = static_files::AssetRequest {
        path: &path,
        is_head: req.method() == Method::HEAD,
        if_none_match: req
            .headers()
            .get("if-none-match")
            .and_then(|v| v.to_str().ok()),
    };

    static_files::serve(&asset, &state.config.static_files)
        .await
        .unwrap_or_else(error_response)
}

/// Percent-decode the request path, `None` if it is not valid UTF-8
fn decode_path(raw: &str) -> Option<Cow<'_, str>> {
    urlencoding::decode(raw).ok()
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    let size = content_length.to_str().ok()?.parse::<u64>().ok()?;
    if size > max_body_size {
        logger::log_error(&format!(
            "Request body too large: {size} bytes (max: {max_body_size})"
        ));
        return Some(http::build_413_response());
    }
    None
}

/// Log and convert a routing failure
fn error_response(err: RouteError) -> Response<Full<Bytes>> {
    if err.is_server_fault() {
        logger::log_error(&err.to_string());
    } else {
        tracing::debug!("Request rejected: {err}");
    }
    err.into_response()
}

fn access_log_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.referer = header_string(req, "referer");
    entry.user_agent = header_string(req, "user-agent");
    entry
}

fn header_string<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/my%20page.html").unwrap(), "/my page.html");
        assert_eq!(decode_path("/%2e%2e/secret.html").unwrap(), "/../secret.html");
        assert!(decode_path("/%ff.html").is_none());
    }

    #[test]
    fn test_check_http_method() {
        assert!(check_http_method(&Method::GET, false).is_none());
        assert!(check_http_method(&Method::HEAD, false).is_none());
        assert_eq!(
            check_http_method(&Method::OPTIONS, false).unwrap().status(),
            204
        );
        assert_eq!(check_http_method(&Method::DELETE, false).unwrap().status(), 405);
    }

    #[test]
    fn test_check_body_size() {
        let req = Request::builder()
            .header("content-length", "2048")
            .body(())
            .unwrap();
        assert_eq!(check_body_size(&req, 1024).unwrap().status(), 413);
        assert!(check_body_size(&req, 4096).is_none());

        let bogus = Request::builder()
            .header("content-length", "lots")
            .body(())
            .unwrap();
        assert!(check_body_size(&bogus, 1024).is_none());
    }
}
