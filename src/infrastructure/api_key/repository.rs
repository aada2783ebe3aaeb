//! In-memory API key repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyRepository, OwnerId};
use crate::domain::DomainError;

/// In-memory implementation of ApiKeyRepository
///
/// Lock order is always `keys` then `hash_index`.
#[derive(Debug, Default)]
pub struct InMemoryApiKeyRepository {
    keys: Arc<RwLock<HashMap<String, ApiKey>>>,
    hash_index: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryApiKeyRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn create(&self, api_key: ApiKey) -> Result<ApiKey, DomainError> {
        let mut keys = self.keys.write().await;
        let mut hash_index = self.hash_index.write().await;

        let id = api_key.id().as_str().to_string();
        let hash = api_key.hashed_secret().to_string();

        if keys.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "API key with ID '{}' already exists",
                id
            )));
        }

        if hash_index.contains_key(&hash) {
            return Err(DomainError::conflict("API key with the same secret already exists"));
        }

        keys.insert(id.clone(), api_key.clone());
        hash_index.insert(hash, id);

        Ok(api_key)
    }

    async fn update(&self, api_key: &ApiKey) -> Result<ApiKey, DomainError> {
        let mut keys = self.keys.write().await;
        let mut hash_index = self.hash_index.write().await;
        let id = api_key.id().as_str().to_string();

        let Some(previous) = keys.get(&id) else {
            return Err(DomainError::not_found(format!(
                "API key '{}' not found",
                id
            )));
        };

        if previous.hashed_secret() != api_key.hashed_secret() {
            if hash_index.contains_key(api_key.hashed_secret()) {
                return Err(DomainError::conflict(
                    "API key with the same secret already exists",
                ));
            }

            hash_index.remove(previous.hashed_secret());
            hash_index.insert(api_key.hashed_secret().to_string(), id.clone());
        }

        keys.insert(id, api_key.clone());
        Ok(api_key.clone())
    }

    async fn update_last_used(
        &self,
        id: &ApiKeyId,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut keys = self.keys.write().await;

        match keys.get_mut(id.as_str()) {
            Some(key) => {
                key.mark_used(at);
                Ok(())
            }
            None => Err(DomainError::not_found(format!("API key '{}' not found", id))),
        }
    }

    async fn find_by_id(&self, id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError> {
        let keys = self.keys.read().await;
        Ok(keys.get(id.as_str()).cloned())
    }

    async fn find_by_hashed_secret(&self, hash: &str) -> Result<Option<ApiKey>, DomainError> {
        let keys = self.keys.read().await;
        let hash_index = self.hash_index.read().await;

        Ok(hash_index.get(hash).and_then(|id| keys.get(id)).cloned())
    }

    async fn find_by_owner_id(&self, owner_id: &OwnerId) -> Result<Vec<ApiKey>, DomainError> {
        let keys = self.keys.read().await;

        let mut owned: Vec<ApiKey> = keys
            .values()
            .filter(|k| k.owner_id() == owner_id)
            .cloned()
            .collect();
        owned.sort_by_key(|k| k.created_at());

        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_test_key(id: &str, owner: &str) -> ApiKey {
        ApiKey::new(
            ApiKeyId::new(id).unwrap(),
            format!("Key {}", id),
            format!("hash-{}", id),
            OwnerId::new(owner).unwrap(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryApiKeyRepository::new();
        let key = create_test_key("key-1", "owner-1");

        repo.create(key.clone()).await.unwrap();

        let found = repo.find_by_id(key.id()).await.unwrap();
        assert_eq!(found, Some(key.clone()));

        let by_hash = repo.find_by_hashed_secret("hash-key-1").await.unwrap();
        assert_eq!(by_hash, Some(key));
    }

    #[tokio::test]
    async fn test_not_found_is_none() {
        let repo = InMemoryApiKeyRepository::new();

        assert!(repo
            .find_by_id(&ApiKeyId::new("missing").unwrap())
            .await
            .unwrap()
            .is_none());
        assert!(repo.find_by_hashed_secret("nope").await.unwrap().is_none());
        assert!(repo
            .find_by_owner_id(&OwnerId::new("nobody").unwrap())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_id_conflicts() {
        let repo = InMemoryApiKeyRepository::new();
        let key = create_test_key("key-1", "owner-1");

        repo.create(key.clone()).await.unwrap();
        let result = repo.create(key).await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_hash_conflicts() {
        let repo = InMemoryApiKeyRepository::new();
        repo.create(create_test_key("key-1", "owner-1")).await.unwrap();

        let clash = ApiKey::new(
            ApiKeyId::new("key-2").unwrap(),
            "Other",
            "hash-key-1",
            OwnerId::new("owner-2").unwrap(),
            Utc::now(),
        );

        assert!(matches!(
            repo.create(clash).await,
            Err(DomainError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_record() {
        let repo = InMemoryApiKeyRepository::new();
        let mut key = create_test_key("key-1", "owner-1");
        repo.create(key.clone()).await.unwrap();

        key.deactivate();
        repo.update(&key).await.unwrap();

        let stored = repo.find_by_id(key.id()).await.unwrap().unwrap();
        assert!(!stored.is_active());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = InMemoryApiKeyRepository::new();
        let key = create_test_key("key-1", "owner-1");

        let result = repo.update(&key).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_last_used() {
        let repo = InMemoryApiKeyRepository::new();
        let key = create_test_key("key-1", "owner-1");
        repo.create(key.clone()).await.unwrap();

        let at = Utc::now() + Duration::minutes(5);
        repo.update_last_used(key.id(), at).await.unwrap();

        let stored = repo.find_by_hashed_secret("hash-key-1").await.unwrap().unwrap();
        assert_eq!(stored.last_used_at(), Some(at));

        let missing = repo
            .update_last_used(&ApiKeyId::new("ghost").unwrap(), at)
            .await;
        assert!(matches!(missing, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_find_by_owner() {
        let repo = InMemoryApiKeyRepository::new();
        repo.create(create_test_key("key-1", "owner-1")).await.unwrap();
        repo.create(create_test_key("key-2", "owner-1")).await.unwrap();
        repo.create(create_test_key("key-3", "owner-2")).await.unwrap();

        let owned = repo
            .find_by_owner_id(&OwnerId::new("owner-1").unwrap())
            .await
            .unwrap();

        assert_eq!(owned.len(), 2);
        assert!(owned.iter().all(|k| k.owner_id().as_str() == "owner-1"));
    }
}
