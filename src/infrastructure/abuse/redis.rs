//! Redis-backed abuse tracker
//!
//! Layout under the configured prefix:
//! - `{prefix}:failures:{identity}` - counter, TTL = block duration, refreshed
//!   on every failure
//! - `{prefix}:blacklist` - set of blocked identities, no TTL
//!
//! Expiry is driven by Redis TTLs, so this backend follows server time.

use std::fmt;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{info, warn};

use crate::domain::abuse::{AbusePolicy, AbuseTracker, ClientIdentity};
use crate::domain::DomainError;

/// Default key namespace
pub const DEFAULT_ABUSE_KEY_PREFIX: &str = "contact-mailer:abuse";

/// Abuse tracker shared by every instance pointing at the same Redis
#[derive(Clone)]
pub struct RedisAbuseTracker {
    connection: ConnectionManager,
    policy: AbusePolicy,
    key_prefix: String,
}

impl fmt::Debug for RedisAbuseTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisAbuseTracker")
            .field("policy", &self.policy)
            .field("key_prefix", &self.key_prefix)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisAbuseTracker {
    /// Connect to Redis at `url`
    pub async fn connect(
        url: &str,
        key_prefix: impl Into<String>,
        policy: AbusePolicy,
    ) -> Result<Self, DomainError> {
        let client = Client::open(url)
            .map_err(|e| DomainError::cache(format!("Failed to create Redis client: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self {
            connection,
            policy,
            key_prefix: key_prefix.into(),
        })
    }

    /// Add configured identities to the shared blacklist
    pub async fn seed_blacklist(&self, identities: &[ClientIdentity]) -> Result<(), DomainError> {
        for identity in identities {
            self.add_to_blacklist(identity).await?;
        }

        Ok(())
    }

    fn failures_key(&self, identity: &ClientIdentity) -> String {
        failures_key(&self.key_prefix, identity)
    }

    fn blacklist_key(&self) -> String {
        blacklist_key(&self.key_prefix)
    }

    fn window_secs(&self) -> i64 {
        self.policy.block_duration.num_seconds().max(1)
    }
}

fn failures_key(prefix: &str, identity: &ClientIdentity) -> String {
    format!("{}:failures:{}", prefix, identity.as_str())
}

fn blacklist_key(prefix: &str) -> String {
    format!("{}:blacklist", prefix)
}

#[async_trait]
impl AbuseTracker for RedisAbuseTracker {
    async fn record_failure(&self, identity: &ClientIdentity) -> Result<bool, DomainError> {
        let key = self.failures_key(identity);
        let mut conn = self.connection.clone();

        let (count, _): (u32, i64) = redis::pipe()
            .atomic()
            .incr(&key, 1)
            .expire(&key, self.window_secs())
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                DomainError::cache(format!("Failed to record failure for '{}': {}", identity, e))
            })?;

        if !self.policy.is_exceeded(count) {
            return Ok(false);
        }

        let added: i64 = conn
            .sadd(self.blacklist_key(), identity.as_str())
            .await
            .map_err(|e| {
                DomainError::cache(format!("Failed to blacklist '{}': {}", identity, e))
            })?;

        if added > 0 {
            warn!(
                "Client blacklisted after {} failed attempts: {}",
                count, identity
            );
        }

        Ok(true)
    }

    async fn is_blacklisted(&self, identity: &ClientIdentity) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();

        conn.sismember(self.blacklist_key(), identity.as_str())
            .await
            .map_err(|e| {
                DomainError::cache(format!(
                    "Failed to check blacklist for '{}': {}",
                    identity, e
                ))
            })
    }

    async fn failure_count(&self, identity: &ClientIdentity) -> Result<u32, DomainError> {
        let mut conn = self.connection.clone();

        let count: Option<u32> = conn.get(self.failures_key(identity)).await.map_err(|e| {
            DomainError::cache(format!("Failed to read failures for '{}': {}", identity, e))
        })?;

        Ok(count.unwrap_or(0))
    }

    async fn clear_failures(&self, identity: &ClientIdentity) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();

        let _: i64 = conn.del(self.failures_key(identity)).await.map_err(|e| {
            DomainError::cache(format!("Failed to clear failures for '{}': {}", identity, e))
        })?;

        Ok(())
    }

    async fn add_to_blacklist(&self, identity: &ClientIdentity) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();

        let added: i64 = conn
            .sadd(self.blacklist_key(), identity.as_str())
            .await
            .map_err(|e| {
                DomainError::cache(format!("Failed to blacklist '{}': {}", identity, e))
            })?;

        if added > 0 {
            info!("Client added to blacklist: {}", identity);
        }

        Ok(())
    }

    async fn remove_from_blacklist(
        &self,
        identity: &ClientIdentity,
    ) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();

        let removed: i64 = conn
            .srem(self.blacklist_key(), identity.as_str())
            .await
            .map_err(|e| {
                DomainError::cache(format!(
                    "Failed to remove '{}' from blacklist: {}",
                    identity, e
                ))
            })?;

        if removed > 0 {
            info!("Client removed from blacklist: {}", identity);
        }

        Ok(removed > 0)
    }

    fn policy(&self) -> &AbusePolicy {
        &self.policy
    }

    async fn ping(&self) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();

        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Redis unreachable: {}", e)))?;

        Ok(())
    }
}
