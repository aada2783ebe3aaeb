//! API key management admin endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::api_key::{ApiKeyId, ApiKeySummary, OwnerId};

/// Request to create a new API key
#[derive(Debug, Clone, Deserialize)]
pub struct CreateApiKeyRequest {
    pub name: String,
    pub owner_id: String,
    #[serde(default)]
    pub expires_in_days: Option<u32>,
}

/// Returned once, on creation. `api_key` is the raw secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApiKeyResponse {
    pub id: String,
    pub api_key: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevokeApiKeyResponse {
    pub id: String,
    pub revoked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListApiKeysResponse {
    pub owner_id: String,
    pub api_keys: Vec<ApiKeySummary>,
    pub total: usize,
}

/// POST /admin/api-keys
pub async fn create_api_key(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<CreateApiKeyResponse>), ApiError> {
    debug!(owner_id = %request.owner_id, admin = %claims.sub, "Admin creating API key");

    let owner_id = OwnerId::new(request.owner_id)
        .map_err(|e| ApiError::bad_request(e.to_string()).with_param("owner_id"))?;

    let created = state
        .api_key_service
        .create(request.name, owner_id, request.expires_in_days)
        .await?;

    info!(key_id = %created.id(), admin = %claims.sub, "API key issued");

    Ok((
        StatusCode::CREATED,
        Json(CreateApiKeyResponse {
            id: created.id().to_string(),
            api_key: created.secret,
            message: "Store this key now; it cannot be shown again".to_string(),
        }),
    ))
}

/// DELETE /admin/api-keys/{key_id}
pub async fn revoke_api_key(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    Path(key_id): Path<String>,
) -> Result<Json<RevokeApiKeyResponse>, ApiError> {
    let id = ApiKeyId::new(key_id.as_str())
        .map_err(|e| ApiError::bad_request(e.to_string()).with_param("id"))?;

    if !state.api_key_service.revoke(&id).await? {
        return Err(ApiError::not_found(format!("API key '{}' not found", key_id)));
    }

    info!(key_id = %id, admin = %claims.sub, "API key revoked");

    Ok(Json(RevokeApiKeyResponse {
        id: id.to_string(),
        revoked: true,
    }))
}

/// GET /admin/api-keys/owner/{owner_id}
pub async fn list_owner_api_keys(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(owner_id): Path<String>,
) -> Result<Json<ListApiKeysResponse>, ApiError> {
    let owner = OwnerId::new(owner_id.as_str())
        .map_err(|e| ApiError::bad_request(e.to_string()).with_param("owner_id"))?;

    let api_keys = state.api_key_service.list_by_owner(&owner).await?;
    let total = api_keys.len();

    Ok(Json(ListApiKeysResponse {
        owner_id,
        api_keys,
        total,
    }))
}
