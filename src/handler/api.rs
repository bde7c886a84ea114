//! Proxy operations
//!
//! Named operations reachable under the API prefix. Each one performs at
//! most a single upstream call and never touches the local filesystem.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Request, Response};

use crate::config::AppState;
use crate::error::{Result, RouteError};
use crate::http;
use crate::upstream::TradeDataRequest;

pub const GET_CATEGORIES: &str = "get-categories";
pub const GET_TRADE_DATA: &str = "get-trade-data";

/// Dispatch an operation name (path with the API prefix stripped)
pub async fn dispatch<B>(
    operation: &str,
    req: Request<B>,
    state: &AppState,
) -> Result<Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match operation {
        GET_CATEGORIES => get_categories(state).await,
        GET_TRADE_DATA => get_trade_data(req, state).await,
        _ => Err(RouteError::NotFound),
    }
}

/// Forward the upstream category listing as-is
async fn get_categories(state: &AppState) -> Result<Response<Full<Bytes>>> {
    let body = state.upstream.fetch_categories().await?;
    Ok(http::build_json_response(body))
}

/// Validate the query, fetch it upstream and return normalized JSON
async fn get_trade_data<B>(req: Request<B>, state: &AppState) -> Result<Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = usize::try_from(state.config.http.max_body_size).unwrap_or(usize::MAX);
    let body = read_body(req, limit).await?;
    let query = TradeDataRequest::from_body(&body)?;
    let data = state.upstream.fetch_trade_data(&query).await?;
    Ok(http::build_json_response(data))
}

/// Collect the request body, failing once it grows past `limit` bytes
async fn read_body<B>(req: Request<B>, limit: usize) -> Result<Bytes>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(RouteError::PayloadTooLarge),
        Err(e) => Err(RouteError::RequestBodyUnreadable(e.to_string())),
    }
}
