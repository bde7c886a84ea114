//! Request error taxonomy
//!
//! Every failure a request can hit maps to exactly one status code and a
//! plain-text body. Nothing here is retried.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use thiserror::Error;

use crate::http::response::build_text_response;

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("API key not found")]
    ConfigurationMissing,

    #[error("Error fetching {operation}: {source}")]
    UpstreamUnreachable {
        operation: &'static str,
        source: reqwest::Error,
    },

    #[error("Error reading response: {0}")]
    UpstreamBodyUnreadable(#[source] reqwest::Error),

    #[error("Error parsing API response: {0}")]
    UpstreamMalformed(#[source] serde_json::Error),

    #[error("Error reading request body: {0}")]
    RequestBodyUnreadable(String),

    #[error("413 Payload Too Large")]
    PayloadTooLarge,

    #[error("Error parsing JSON data: {0}")]
    InvalidRequestBody(#[source] serde_json::Error),

    #[error("Missing required parameters: country, tradeType, and category are required")]
    MissingParameters,

    #[error("404 Not Found")]
    NotFound,

    #[error("403 Forbidden")]
    Forbidden,

    #[error("Error resolving absolute path: {0}")]
    PathResolution(#[source] std::io::Error),

    #[error("Error reading file: {0}")]
    FileUnreadable(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RouteError>;

impl RouteError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_)
            | Self::MissingParameters
            | Self::RequestBodyUnreadable(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::ConfigurationMissing
            | Self::UpstreamUnreachable { .. }
            | Self::UpstreamBodyUnreadable(_)
            | Self::UpstreamMalformed(_)
            | Self::PathResolution(_)
            | Self::FileUnreadable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the failure is worth an error-level log line
    pub fn is_server_fault(&self) -> bool {
        self.status().is_server_error()
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        build_text_response(self.status(), self.to_string())
    }
}

impl From<std::io::Error> for RouteError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound,
            std::io::ErrorKind::PermissionDenied => Self::Forbidden,
            _ => Self::FileUnreadable(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("{not json").unwrap_err()
    }

    #[test]
    fn test_client_errors_are_400() {
        assert_eq!(RouteError::MissingParameters.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            RouteError::InvalidRequestBody(json_error()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_server_errors_are_500() {
        assert_eq!(
            RouteError::ConfigurationMissing.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RouteError::UpstreamMalformed(json_error()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(RouteError::ConfigurationMissing.is_server_fault());
        assert!(!RouteError::NotFound.is_server_fault());
    }

    #[test]
    fn test_io_error_mapping() {
        let not_found = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert!(matches!(RouteError::from(not_found), RouteError::NotFound));

        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert!(matches!(RouteError::from(denied), RouteError::Forbidden));

        let other = std::io::Error::other("disk on fire");
        assert!(matches!(RouteError::from(other), RouteError::FileUnreadable(_)));
    }

    #[test]
    fn test_messages() {
        assert_eq!(RouteError::ConfigurationMissing.to_string(), "API key not found");
        assert!(RouteError::InvalidRequestBody(json_error())
            .to_string()
            .starts_with("Error parsing JSON data: "));
    }

    #[test]
    fn test_path_resolution_is_500_plain_text() {
        let err = RouteError::PathResolution(std::io::Error::other("cwd removed"));
        assert!(err.is_server_fault());
        assert_eq!(err.to_string(), "Error resolving absolute path: cwd removed");

        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            resp.headers().get("Content-Type").unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn test_into_response_is_plain_text() {
        let resp = RouteError::ConfigurationMissing.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            resp.headers().get("Content-Type").unwrap(),
            "text/plain; charset=utf-8"
        );
    }
}
