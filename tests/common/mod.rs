#![allow(dead_code)]

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{HeaderMap, Method, Request, StatusCode};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tradeproxy::config::{AppState, Config};
use tradeproxy::handler::handle_request;

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn content_type(&self) -> &str {
        self.headers
            .get("Content-Type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

pub fn state(root: &Path, base_url: &str, api_key: &str) -> Arc<AppState> {
    state_with(root, base_url, api_key, |_| {})
}

pub fn state_with(
    root: &Path,
    base_url: &str,
    api_key: &str,
    configure: impl FnOnce(&mut Config),
) -> Arc<AppState> {
    let mut cfg = Config::default_config().unwrap();
    cfg.static_files.root = root.to_path_buf();
    cfg.upstream.base_url = base_url.to_string();
    cfg.upstream.api_key = api_key.to_string();
    cfg.logging.access_log = false;
    configure(&mut cfg);
    Arc::new(AppState::new(cfg).unwrap())
}

pub async fn send(state: &Arc<AppState>, req: Request<Full<Bytes>>) -> TestResponse {
    let peer: SocketAddr = "127.0.0.1:50000".parse().unwrap();
    let resp = handle_request(req, Arc::clone(state), peer).await.unwrap();
    let (parts, body) = resp.into_parts();
    TestResponse {
        status: parts.status,
        headers: parts.headers,
        body: body.collect().await.unwrap().to_bytes(),
    }
}

pub async fn get(state: &Arc<AppState>, uri: &str) -> TestResponse {
    send(state, request(Method::GET, uri, "")).await
}

pub async fn post(state: &Arc<AppState>, uri: &str, body: &str) -> TestResponse {
    send(state, request(Method::POST, uri, body)).await
}

pub fn request(method: Method, uri: &str, body: &str) -> Request<Full<Bytes>> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}
