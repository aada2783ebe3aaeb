//! API Key entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{
    validate_api_key_id, validate_owner_id, ApiKeyValidationError,
};

/// Number of hash characters shown in listings
const MASK_VISIBLE_CHARS: usize = 8;

/// API Key identifier - alphanumeric + hyphens, max 50 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiKeyId(String);

impl ApiKeyId {
    /// Create a new ApiKeyId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, ApiKeyValidationError> {
        let id = id.into();
        validate_api_key_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a fresh random identifier (UUID v4)
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ApiKeyId {
    type Error = ApiKeyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ApiKeyId> for String {
    fn from(id: ApiKeyId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ApiKeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the party that owns a set of keys
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(owner: impl Into<String>) -> Result<Self, ApiKeyValidationError> {
        let owner = owner.into();
        validate_owner_id(&owner)?;
        Ok(Self(owner))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OwnerId {
    type Error = ApiKeyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OwnerId> for String {
    fn from(owner: OwnerId) -> Self {
        owner.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// API Key entity
///
/// Only the hash of the secret is held here. The raw secret exists once,
/// in the value returned by key creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKey {
    id: ApiKeyId,
    name: String,
    hashed_secret: String,
    owner_id: OwnerId,
    created_at: DateTime<Utc>,
    /// None = never expires
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_used_at: Option<DateTime<Utc>>,
    is_active: bool,
}

impl ApiKey {
    /// Create a new, active API key
    pub fn new(
        id: ApiKeyId,
        name: impl Into<String>,
        hashed_secret: impl Into<String>,
        owner_id: OwnerId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            hashed_secret: hashed_secret.into(),
            owner_id,
            created_at,
            expires_at: None,
            last_used_at: None,
            is_active: true,
        }
    }

    /// Rebuild a key from persisted columns
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: ApiKeyId,
        name: String,
        hashed_secret: String,
        owner_id: OwnerId,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
        last_used_at: Option<DateTime<Utc>>,
        is_active: bool,
    ) -> Self {
        Self {
            id,
            name,
            hashed_secret,
            owner_id,
            created_at,
            expires_at,
            last_used_at,
            is_active,
        }
    }

    /// Set expiration
    pub fn with_expiration(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    // Getters

    pub fn id(&self) -> &ApiKeyId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hashed_secret(&self) -> &str {
        &self.hashed_secret
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn last_used_at(&self) -> Option<DateTime<Utc>> {
        self.last_used_at
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    // Status checks

    /// A key is usable while active and not past its expiry instant
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired_at(now)
    }

    /// Expired strictly after `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }

    /// Hash prefix for display, never usable as a credential
    pub fn masked_secret(&self) -> String {
        let visible: String = self.hashed_secret.chars().take(MASK_VISIBLE_CHARS).collect();
        format!("{}...", visible)
    }

    // Mutators

    /// Mark the key as revoked. There is no way back to active.
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    pub fn mark_used(&mut self, at: DateTime<Utc>) {
        self.last_used_at = Some(at);
    }
}

/// Listing view of a key, safe to return to administrators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiKeySummary {
    pub id: String,
    pub name: String,
    pub masked_secret: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl From<&ApiKey> for ApiKeySummary {
    fn from(key: &ApiKey) -> Self {
        Self {
            id: key.id().as_str().to_string(),
            name: key.name().to_string(),
            masked_secret: key.masked_secret(),
            owner_id: key.owner_id().as_str().to_string(),
            created_at: key.created_at(),
            expires_at: key.expires_at(),
            last_used_at: key.last_used_at(),
            is_active: key.is_active(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn create_test_key() -> ApiKey {
        ApiKey::new(
            ApiKeyId::new("key-1").unwrap(),
            "Website",
            "3f2a9c0d8e7b6a5f4e3d2c1b0a998877",
            OwnerId::new("owner-1").unwrap(),
            now(),
        )
    }

    #[test]
    fn test_generated_id_is_valid() {
        let id = ApiKeyId::generate();
        assert!(ApiKeyId::new(id.as_str()).is_ok());
        assert_ne!(ApiKeyId::generate(), id);
    }

    #[test]
    fn test_new_key_is_active_and_unused() {
        let key = create_test_key();

        assert!(key.is_active());
        assert!(key.last_used_at().is_none());
        assert!(key.expires_at().is_none());
        assert!(key.is_usable_at(now()));
    }

    #[test]
    fn test_expiry_boundary() {
        let expires = now() + Duration::days(1);
        let key = create_test_key().with_expiration(expires);

        assert!(key.is_usable_at(now()));
        assert!(key.is_usable_at(expires));
        assert!(!key.is_usable_at(expires + Duration::milliseconds(1)));
        assert!(key.is_expired_at(expires + Duration::days(1)));
    }

    #[test]
    fn test_deactivate_is_sticky() {
        let mut key = create_test_key();

        key.deactivate();
        key.deactivate();

        assert!(!key.is_active());
        assert!(!key.is_usable_at(now()));
    }

    #[test]
    fn test_masked_secret() {
        let key = create_test_key();
        assert_eq!(key.masked_secret(), "3f2a9c0d...");
    }

    #[test]
    fn test_summary_does_not_contain_hash() {
        let key = create_test_key();
        let summary = ApiKeySummary::from(&key);
        let json = serde_json::to_string(&summary).unwrap();

        assert!(!json.contains(key.hashed_secret()));
        assert!(json.contains("3f2a9c0d..."));
        assert_eq!(summary.owner_id, "owner-1");
    }

    #[test]
    fn test_owner_id_serde_rejects_invalid() {
        let result: Result<OwnerId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }
}
