//! API key extraction
//!
//! The key may arrive as `Authorization: Bearer <key>`, `X-API-Key: <key>` or
//! an `apiKey` query parameter, tried in that order. A missing key is not a
//! rejection here: the access guard counts it like a wrong one.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Query},
    http::{header, request::Parts, HeaderMap, Uri},
};
use serde::Deserialize;

/// Raw key presented by the caller, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedApiKey(pub Option<String>);

impl PresentedApiKey {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for PresentedApiKey
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(extract_api_key(&parts.headers, &parts.uri)))
    }
}

#[derive(Debug, Deserialize)]
struct ApiKeyQuery {
    #[serde(rename = "apiKey", alias = "api_key")]
    api_key: Option<String>,
}

/// Find the presented key in headers, then the query string
pub fn extract_api_key(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if let Some(key) = non_empty(bearer) {
        return Some(key);
    }

    let header_key = headers
        .get("x-api-key")
        .and_then(|value| value.to_str().ok());

    if let Some(key) = non_empty(header_key) {
        return Some(key);
    }

    Query::<ApiKeyQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(query)| non_empty(query.api_key.as_deref()))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
