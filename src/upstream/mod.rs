//! Upstream trade-data API client
//!
//! One pooled `reqwest::Client` shared by all requests. Each proxy
//! operation is a single unretried GET; failures surface immediately.

mod request;

pub use request::TradeDataRequest;

use hyper::body::Bytes;
use std::time::Duration;

use crate::config::UpstreamConfig;
use crate::error::{Result, RouteError};
use crate::logger;

/// Client for the third-party trade-data API
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> std::result::Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// URL of the category listing
    pub fn categories_url(&self) -> String {
        format!("{}/comtrade/categories?c={}&f=json", self.base_url, self.api_key)
    }

    /// URL of a trade data query, path segments inserted verbatim
    pub fn trade_data_url(&self, request: &TradeDataRequest) -> String {
        format!(
            "{}/comtrade/{}/{}/{}?c={}&f=json",
            self.base_url, request.trade_type, request.country, request.category, self.api_key
        )
    }

    fn require_api_key(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(RouteError::ConfigurationMissing);
        }
        Ok(())
    }

    /// Fetch the category listing, bytes forwarded without validation
    pub async fn fetch_categories(&self) -> Result<Bytes> {
        self.require_api_key()?;
        let url = self.categories_url();
        self.get_bytes(&url, "categories").await
    }

    /// Fetch trade data and normalize it through an untyped JSON round trip
    pub async fn fetch_trade_data(&self, request: &TradeDataRequest) -> Result<Bytes> {
        self.require_api_key()?;
        let url = self.trade_data_url(request);
        let raw = self.get_bytes(&url, "trade data").await?;
        reserialize_json(&raw)
    }

    async fn get_bytes(&self, url: &str, operation: &'static str) -> Result<Bytes> {
        logger::log_upstream_call(&self.redact(url));

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| RouteError::UpstreamUnreachable {
                operation,
                source: source.without_url(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            logger::log_warning(&format!("Upstream {operation} call returned {status}"));
        }

        resp.bytes()
            .await
            .map_err(|e| RouteError::UpstreamBodyUnreadable(e.without_url()))
    }

    /// Copy of `url` safe to write to logs
    fn redact(&self, url: &str) -> String {
        if self.api_key.is_empty() {
            url.to_string()
        } else {
            url.replace(&format!("c={}", self.api_key), "c=<redacted>")
        }
    }
}

/// Decode untyped JSON and encode it again
///
/// Any valid JSON document survives, including top-level arrays and scalars.
pub fn reserialize_json(raw: &[u8]) -> Result<Bytes> {
    let value: serde_json::Value = serde_json::from_slice(raw).map_err(RouteError::UpstreamMalformed)?;
    serde_json::to_vec(&value)
        .map(Bytes::from)
        .map_err(RouteError::UpstreamMalformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn client(base_url: &str, api_key: &str) -> UpstreamClient {
        let mut cfg = Config::default_config().unwrap().upstream;
        cfg.base_url = base_url.to_string();
        cfg.api_key = api_key.to_string();
        UpstreamClient::new(&cfg).unwrap()
    }

    fn trade_request() -> TradeDataRequest {
        TradeDataRequest {
            country: "sweden".to_string(),
            trade_type: "export".to_string(),
            category: "live animals".to_string(),
        }
    }

    #[test]
    fn test_categories_url() {
        let c = client("https://api.example.com", "k3y");
        assert_eq!(
            c.categories_url(),
            "https://api.example.com/comtrade/categories?c=k3y&f=json"
        );
    }

    #[test]
    fn test_trade_data_url_segments_verbatim() {
        let c = client("https://api.example.com/", "k3y");
        assert_eq!(
            c.trade_data_url(&trade_request()),
            "https://api.example.com/comtrade/export/sweden/live animals?c=k3y&f=json"
        );
    }

    #[test]
    fn test_redact() {
        let c = client("https://api.example.com", "k3y");
        let logged = c.redact(&c.categories_url());
        assert!(!logged.contains("k3y"));
        assert!(logged.contains("c=<redacted>&f=json"));
    }

    #[tokio::test]
    async fn test_missing_key_short_circuits() {
        // Unroutable base URL: the call must never be attempted
        let c = client("http://127.0.0.1:1", "");
        assert!(matches!(
            c.fetch_categories().await,
            Err(RouteError::ConfigurationMissing)
        ));
        assert!(matches!(
            c.fetch_trade_data(&trade_request()).await,
            Err(RouteError::ConfigurationMissing)
        ));
    }

    #[test]
    fn test_reserialize_preserves_structure() {
        for raw in [r#"{"a":1,"b":[2,3]}"#, "[1, 2, 3]", "\"text\"", "42", "null"] {
            let out = reserialize_json(raw.as_bytes()).unwrap();
            let before: serde_json::Value = serde_json::from_str(raw).unwrap();
            let after: serde_json::Value = serde_json::from_slice(&out).unwrap();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn test_reserialize_compacts_whitespace() {
        let out = reserialize_json(b"{ \"a\" :  [ 1 , 2 ] }").unwrap();
        assert_eq!(out, Bytes::from_static(br#"{"a":[1,2]}"#));
    }

    #[test]
    fn test_reserialize_rejects_invalid() {
        assert!(matches!(
            reserialize_json(b"<html>rate limited</html>"),
            Err(RouteError::UpstreamMalformed(_))
        ));
    }
}
