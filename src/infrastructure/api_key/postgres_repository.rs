//! PostgreSQL API key repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;

use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyRepository, OwnerId};
use crate::domain::DomainError;

/// PostgreSQL implementation of ApiKeyRepository
#[derive(Debug, Clone)]
pub struct PostgresApiKeyRepository {
    pool: PgPool,
}

impl PostgresApiKeyRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(std::time::Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool))
    }

    /// Create the api_keys table and its indexes when missing
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS api_keys (
                id VARCHAR(50) PRIMARY KEY,
                name VARCHAR(100) NOT NULL,
                hashed_secret CHAR(64) NOT NULL UNIQUE,
                owner_id VARCHAR(100) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                expires_at TIMESTAMPTZ,
                last_used_at TIMESTAMPTZ,
                is_active BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create api_keys table: {}", e)))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_api_keys_owner_id ON api_keys (owner_id)")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create owner index: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl ApiKeyRepository for PostgresApiKeyRepository {
    async fn create(&self, api_key: ApiKey) -> Result<ApiKey, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO api_keys (id, name, hashed_secret, owner_id, created_at,
                                  expires_at, last_used_at, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(api_key.id().as_str())
        .bind(api_key.name())
        .bind(api_key.hashed_secret())
        .bind(api_key.owner_id().as_str())
        .bind(api_key.created_at())
        .bind(api_key.expires_at())
        .bind(api_key.last_used_at())
        .bind(api_key.is_active())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                if msg.contains("hashed_secret") {
                    DomainError::conflict("API key with the same secret already exists")
                } else {
                    DomainError::conflict(format!(
                        "API key with ID '{}' already exists",
                        api_key.id()
                    ))
                }
            } else {
                DomainError::storage(format!("Failed to create API key: {}", e))
            }
        })?;

        Ok(api_key)
    }

    async fn update(&self, api_key: &ApiKey) -> Result<ApiKey, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE api_keys
            SET name = $2, hashed_secret = $3, owner_id = $4, expires_at = $5,
                last_used_at = $6, is_active = $7
            WHERE id = $1
            "#,
        )
        .bind(api_key.id().as_str())
        .bind(api_key.name())
        .bind(api_key.hashed_secret())
        .bind(api_key.owner_id().as_str())
        .bind(api_key.expires_at())
        .bind(api_key.last_used_at())
        .bind(api_key.is_active())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict("API key with the same secret already exists")
            } else {
                DomainError::storage(format!("Failed to update API key: {}", e))
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "API key '{}' not found",
                api_key.id()
            )));
        }

        Ok(api_key.clone())
    }

    async fn update_last_used(
        &self,
        id: &ApiKeyId,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE api_keys SET last_used_at = $2 WHERE id = $1")
            .bind(id.as_str())
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to record key usage: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("API key '{}' not found", id)));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, hashed_secret, owner_id, created_at,
                   expires_at, last_used_at, is_active
            FROM api_keys
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get API key: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_api_key(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_hashed_secret(&self, hash: &str) -> Result<Option<ApiKey>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, hashed_secret, owner_id, created_at,
                   expires_at, last_used_at, is_active
            FROM api_keys
            WHERE hashed_secret = $1
            "#,
        )
        .bind(hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to look up API key: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_api_key(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_owner_id(&self, owner_id: &OwnerId) -> Result<Vec<ApiKey>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, hashed_secret, owner_id, created_at,
                   expires_at, last_used_at, is_active
            FROM api_keys
            WHERE owner_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(owner_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list API keys: {}", e)))?;

        let mut keys = Vec::with_capacity(rows.len());

        for row in rows {
            keys.push(row_to_api_key(&row)?);
        }

        Ok(keys)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Database unreachable: {}", e)))?;

        Ok(())
    }
}

fn row_to_api_key(row: &sqlx::postgres::PgRow) -> Result<ApiKey, DomainError> {
    let id: String = row.get("id");
    let name: String = row.get("name");
    let hashed_secret: String = row.get("hashed_secret");
    let owner_id: String = row.get("owner_id");
    let created_at: DateTime<Utc> = row.get("created_at");
    let expires_at: Option<DateTime<Utc>> = row.get("expires_at");
    let last_used_at: Option<DateTime<Utc>> = row.get("last_used_at");
    let is_active: bool = row.get("is_active");

    let id = ApiKeyId::new(&id)
        .map_err(|e| DomainError::storage(format!("Invalid API key ID in database: {}", e)))?;
    let owner_id = OwnerId::new(&owner_id)
        .map_err(|e| DomainError::storage(format!("Invalid owner ID in database: {}", e)))?;

    Ok(ApiKey::restore(
        id,
        name,
        hashed_secret,
        owner_id,
        created_at,
        expires_at,
        last_used_at,
        is_active,
    ))
}
