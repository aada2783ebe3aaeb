//! Abuse inspection and blacklist management

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::ClientIdentity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbuseStatusResponse {
    pub identity: String,
    pub blocked: bool,
    pub remaining_attempts: u32,
    pub failure_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlacklistRequest {
    pub identity: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlacklistResponse {
    pub identity: String,
    pub blocked: bool,
}

fn parse_identity(raw: impl Into<String>) -> Result<ClientIdentity, ApiError> {
    ClientIdentity::new(raw).map_err(|e| ApiError::from(e).with_param("identity"))
}

/// GET /admin/abuse/{identity}
pub async fn get_abuse_status(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(identity): Path<String>,
) -> Result<Json<AbuseStatusResponse>, ApiError> {
    let identity = parse_identity(identity)?;

    let status = state.access_guard.check(&identity).await?;
    let failure_count = state.abuse_tracker.failure_count(&identity).await?;

    Ok(Json(AbuseStatusResponse {
        identity: identity.to_string(),
        blocked: status.blocked,
        remaining_attempts: status.remaining_attempts,
        failure_count,
    }))
}

/// POST /admin/blacklist
pub async fn add_to_blacklist(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    Json(request): Json<BlacklistRequest>,
) -> Result<Json<BlacklistResponse>, ApiError> {
    let identity = parse_identity(request.identity)?;

    state.abuse_tracker.add_to_blacklist(&identity).await?;
    info!(identity = %identity, admin = %claims.sub, "Client blacklisted by operator");

    Ok(Json(BlacklistResponse {
        identity: identity.to_string(),
        blocked: true,
    }))
}

/// DELETE /admin/blacklist/{identity}
///
/// Also clears the failure counter so the client starts from a full budget.
pub async fn remove_from_blacklist(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    Path(identity): Path<String>,
) -> Result<Json<BlacklistResponse>, ApiError> {
    let identity = parse_identity(identity)?;

    if !state.abuse_tracker.remove_from_blacklist(&identity).await? {
        return Err(ApiError::not_found(format!(
            "'{}' is not blacklisted",
            identity
        )));
    }

    state.abuse_tracker.clear_failures(&identity).await?;
    info!(identity = %identity, admin = %claims.sub, "Client removed from blacklist");

    Ok(Json(BlacklistResponse {
        identity: identity.to_string(),
        blocked: false,
    }))
}
