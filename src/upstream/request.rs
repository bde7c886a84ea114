// Trade data request body
// Decoded once per request from the client's JSON payload

use serde::Deserialize;

use crate::error::{Result, RouteError};

/// Body of `POST /api/get-trade-data`
///
/// Missing keys decode as empty strings so that they fail the same
/// validation as explicitly empty values.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TradeDataRequest {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub trade_type: String,
    #[serde(default)]
    pub category: String,
}

impl TradeDataRequest {
    /// Decode and validate a request body
    ///
    /// Only the first JSON document is read; anything after it is ignored.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        let request: Self = serde_json::Deserializer::from_slice(body)
            .into_iter::<Self>()
            .next()
            .unwrap_or_else(|| serde_json::from_slice(body))
            .map_err(RouteError::InvalidRequestBody)?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<()> {
        if self.country.is_empty() || self.trade_type.is_empty() || self.category.is_empty() {
            return Err(RouteError::MissingParameters);
        }
        Ok(())
    }
}
