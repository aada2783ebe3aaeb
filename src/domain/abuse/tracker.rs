//! Abuse tracker trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{AbusePolicy, ClientIdentity};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Per-identity failure counting and blacklist membership
///
/// Implementations must make `record_failure` atomic per identity: two
/// concurrent failures for the same identity always add two.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AbuseTracker: Send + Sync + Debug {
    /// Count a failure. Returns true when this failure put the identity on
    /// the blacklist.
    async fn record_failure(&self, identity: &ClientIdentity) -> Result<bool, DomainError>;

    async fn is_blacklisted(&self, identity: &ClientIdentity) -> Result<bool, DomainError>;

    /// Failures inside the current window, 0 when none or stale
    async fn failure_count(&self, identity: &ClientIdentity) -> Result<u32, DomainError>;

    async fn clear_failures(&self, identity: &ClientIdentity) -> Result<(), DomainError>;

    async fn add_to_blacklist(&self, identity: &ClientIdentity) -> Result<(), DomainError>;

    /// Returns false when the identity was not blacklisted
    async fn remove_from_blacklist(&self, identity: &ClientIdentity)
    -> Result<bool, DomainError>;

    fn policy(&self) -> &AbusePolicy;

    /// Backend reachability check used by readiness probes
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
