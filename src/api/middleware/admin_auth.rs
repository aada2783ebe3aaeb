//! Admin authentication
//!
//! Admin routes take `Authorization: Bearer <jwt>`. The token must verify
//! against the configured secret and carry `is_admin`.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::infrastructure::auth::AdminClaims;

/// Extractor that requires a valid admin token
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AdminClaims);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            ApiError::unauthorized("Admin token required. Provide 'Authorization: Bearer <token>'")
        })?;

        let claims = state.jwt_service.validate(token).map_err(|e| {
            debug!("Admin token rejected: {}", e);
            ApiError::unauthorized("Invalid or expired admin token")
        })?;

        if !claims.is_admin {
            return Err(ApiError::forbidden("Admin access required"));
        }

        debug!(subject = %claims.sub, "Admin access granted");
        Ok(RequireAdmin(claims))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
