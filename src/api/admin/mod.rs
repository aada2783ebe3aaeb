//! Admin API endpoints for key and abuse management

pub mod abuse;
pub mod api_keys;

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::state::AppState;

/// Create admin API router
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        // API key management
        .route("/api-keys", post(api_keys::create_api_key))
        .route("/api-keys/{key_id}", delete(api_keys::revoke_api_key))
        .route(
            "/api-keys/owner/{owner_id}",
            get(api_keys::list_owner_api_keys),
        )
        // Abuse tracking
        .route("/abuse/{identity}", get(abuse::get_abuse_status))
        .route("/blacklist", post(abuse::add_to_blacklist))
        .route("/blacklist/{identity}", delete(abuse::remove_from_blacklist))
}
