//! API Key service
//!
//! Provides high-level operations for the API key lifecycle: issue, validate,
//! revoke and list.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use crate::domain::api_key::{
    validate_expiry_days, validate_key_name, ApiKey, ApiKeyId, ApiKeyRepository, ApiKeySummary,
    OwnerId,
};
use crate::domain::{Clock, DomainError, SystemClock};
use crate::infrastructure::observability::record_key_validation;

use super::generator::ApiKeyGenerator;

/// Result of creating a new API key
pub struct CreatedApiKey {
    /// The stored key (hash only)
    pub api_key: ApiKey,
    /// The full secret key (only returned once)
    pub secret: String,
}

impl CreatedApiKey {
    pub fn id(&self) -> &ApiKeyId {
        self.api_key.id()
    }
}

impl std::fmt::Debug for CreatedApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreatedApiKey")
            .field("api_key", &self.api_key)
            .field("secret", &"[redacted]")
            .finish()
    }
}

/// API Key service for managing API keys
#[derive(Debug, Clone)]
pub struct ApiKeyService {
    repository: Arc<dyn ApiKeyRepository>,
    generator: ApiKeyGenerator,
    clock: Arc<dyn Clock>,
}

impl ApiKeyService {
    /// Create a new API key service
    pub fn new(repository: Arc<dyn ApiKeyRepository>) -> Self {
        Self {
            repository,
            generator: ApiKeyGenerator::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Create with a custom generator
    pub fn with_generator(mut self, generator: ApiKeyGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Create with a custom time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Issue a new key. The raw secret is only available in the result.
    pub async fn create(
        &self,
        name: impl Into<String>,
        owner_id: OwnerId,
        expires_in_days: Option<u32>,
    ) -> Result<CreatedApiKey, DomainError> {
        let name = name.into();
        validate_key_name(&name).map_err(|e| DomainError::validation(e.to_string()))?;

        if let Some(days) = expires_in_days {
            validate_expiry_days(days).map_err(|e| DomainError::validation(e.to_string()))?;
        }

        let now = self.clock.now();
        let generated = self.generator.generate();
        let id = ApiKeyId::generate();

        info!("Creating API key: id={}, owner={}", id, owner_id);

        let mut api_key = ApiKey::new(id, name, generated.hash.clone(), owner_id, now);

        if let Some(days) = expires_in_days {
            api_key = api_key.with_expiration(now + Duration::seconds(i64::from(days) * 86_400));
        }

        let created = self.repository.create(api_key).await?;

        info!("API key created: id={}", created.id());

        Ok(CreatedApiKey {
            api_key: created,
            secret: generated.key,
        })
    }

    /// Check a presented secret.
    ///
    /// Unknown, inactive and expired keys are all `Ok(false)`. Storage
    /// failures during the lookup are errors, never `false`.
    pub async fn validate(&self, raw_secret: &str) -> Result<bool, DomainError> {
        let Some(hash) = self.generator.hash_key(raw_secret) else {
            record_key_validation("invalid");
            return Ok(false);
        };

        let found = match self.repository.find_by_hashed_secret(&hash).await {
            Ok(found) => found,
            Err(e) => {
                record_key_validation("error");
                return Err(e);
            }
        };

        let Some(api_key) = found else {
            debug!("API key not found");
            record_key_validation("invalid");
            return Ok(false);
        };

        let now = self.clock.now();

        if !api_key.is_usable_at(now) {
            debug!(
                "API key rejected: id={}, active={}, expired={}",
                api_key.id(),
                api_key.is_active(),
                api_key.is_expired_at(now)
            );
            record_key_validation("invalid");
            return Ok(false);
        }

        if let Err(e) = self.repository.update_last_used(api_key.id(), now).await {
            warn!("Failed to record API key usage: id={}, error={}", api_key.id(), e);
        }

        record_key_validation("valid");
        Ok(true)
    }

    /// Deactivate a key. Returns false when the key does not exist.
    pub async fn revoke(&self, id: &ApiKeyId) -> Result<bool, DomainError> {
        let Some(mut api_key) = self.repository.find_by_id(id).await? else {
            return Ok(false);
        };

        if !api_key.is_active() {
            debug!("API key already revoked: id={}", id);
            return Ok(true);
        }

        api_key.deactivate();
        self.repository.update(&api_key).await?;

        info!("API key revoked: id={}", id);

        Ok(true)
    }

    /// Get an API key by ID
    pub async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError> {
        self.repository.find_by_id(id).await
    }

    /// List an owner's keys with masked secrets
    pub async fn list_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<ApiKeySummary>, DomainError> {
        let keys = self.repository.find_by_owner_id(owner_id).await?;
        Ok(keys.iter().map(ApiKeySummary::from).collect())
    }

    /// Backend reachability check
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.repository.ping().await
    }
}
