//! API Key repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use super::entity::{ApiKey, ApiKeyId, OwnerId};
use crate::domain::DomainError;

/// Repository trait for API key storage
///
/// Lookups return `Ok(None)` / an empty list when nothing matches and
/// `Err(DomainError::Storage)` when the backend itself fails.
#[async_trait]
pub trait ApiKeyRepository: Send + Sync + Debug {
    /// Insert a new key. Duplicate id or hash is a `Conflict`.
    async fn create(&self, api_key: ApiKey) -> Result<ApiKey, DomainError>;

    /// Replace an existing key. Missing id is `NotFound`.
    async fn update(&self, api_key: &ApiKey) -> Result<ApiKey, DomainError>;

    /// Set `last_used_at` on a key. Missing id is `NotFound`.
    async fn update_last_used(
        &self,
        id: &ApiKeyId,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError>;

    /// Get an API key by its ID
    async fn find_by_id(&self, id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError>;

    /// Get an API key by the hash of its secret
    async fn find_by_hashed_secret(&self, hash: &str) -> Result<Option<ApiKey>, DomainError>;

    /// All keys belonging to an owner, oldest first
    async fn find_by_owner_id(&self, owner_id: &OwnerId) -> Result<Vec<ApiKey>, DomainError>;

    /// Backend reachability check used by readiness probes
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
