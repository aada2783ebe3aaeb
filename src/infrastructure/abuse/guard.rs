//! Access guard
//!
//! Gates a protected action behind the blacklist and API key validation, and
//! counts every rejected attempt against the caller's identity.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::abuse::{AbuseStatus, AbuseTracker, ClientIdentity};
use crate::domain::DomainError;
use crate::infrastructure::api_key::ApiKeyService;
use crate::infrastructure::observability::record_abuse_failure;

/// How a protected action can fail
#[derive(Debug)]
pub enum ActionFailure {
    /// Counts against the caller, e.g. the mail relay refused the message
    Rejected(String),
    /// Server-side problem, never counted
    Error(DomainError),
}

impl From<DomainError> for ActionFailure {
    fn from(error: DomainError) -> Self {
        Self::Error(error)
    }
}

/// Why a request was turned away without being blocked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    InvalidApiKey,
    ActionFailed(String),
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidApiKey => write!(f, "Invalid API key"),
            Self::ActionFailed(message) => write!(f, "{}", message),
        }
    }
}

/// Outcome of a guarded request
#[derive(Debug, PartialEq)]
pub enum GuardDecision<T> {
    /// Key accepted and the action succeeded
    Passed(T),
    /// Caller is blacklisted. `escalated` is true when this request put it there.
    Forbidden { escalated: bool },
    /// Counted failure below the threshold
    Rejected {
        reason: RejectionReason,
        remaining_attempts: u32,
    },
}

/// Composes key validation with abuse tracking
#[derive(Debug, Clone)]
pub struct AccessGuard {
    api_keys: Arc<ApiKeyService>,
    tracker: Arc<dyn AbuseTracker>,
}

impl AccessGuard {
    pub fn new(api_keys: Arc<ApiKeyService>, tracker: Arc<dyn AbuseTracker>) -> Self {
        Self { api_keys, tracker }
    }

    pub fn tracker(&self) -> &Arc<dyn AbuseTracker> {
        &self.tracker
    }

    /// Current standing of an identity
    pub async fn check(&self, identity: &ClientIdentity) -> Result<AbuseStatus, DomainError> {
        if self.tracker.is_blacklisted(identity).await? {
            return Ok(AbuseStatus::blocked());
        }

        let failures = self.tracker.failure_count(identity).await?;

        Ok(AbuseStatus {
            blocked: false,
            remaining_attempts: self.tracker.policy().remaining_attempts(failures),
        })
    }

    /// Run `action` for `identity` if it is not blacklisted and presents a
    /// valid key.
    ///
    /// A blacklisted identity never reaches key validation. Backend errors
    /// are returned as `Err` and are not counted against the caller.
    pub async fn run<T, F, Fut>(
        &self,
        identity: &ClientIdentity,
        presented_key: Option<&str>,
        action: F,
    ) -> Result<GuardDecision<T>, DomainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ActionFailure>>,
    {
        if self.tracker.is_blacklisted(identity).await? {
            debug!("Blocked request from blacklisted client: {}", identity);
            return Ok(GuardDecision::Forbidden { escalated: false });
        }

        let key_valid = match presented_key {
            Some(key) => self.api_keys.validate(key).await?,
            None => false,
        };

        if !key_valid {
            return self.reject(identity, RejectionReason::InvalidApiKey).await;
        }

        match action().await {
            Ok(value) => {
                if self.tracker.policy().forgive_on_success {
                    if let Err(e) = self.tracker.clear_failures(identity).await {
                        warn!("Failed to clear failures for {}: {}", identity, e);
                    }
                }

                Ok(GuardDecision::Passed(value))
            }
            Err(ActionFailure::Rejected(message)) => {
                self.reject(identity, RejectionReason::ActionFailed(message))
                    .await
            }
            Err(ActionFailure::Error(e)) => Err(e),
        }
    }

    async fn reject<T>(
        &self,
        identity: &ClientIdentity,
        reason: RejectionReason,
    ) -> Result<GuardDecision<T>, DomainError> {
        let escalated = self.tracker.record_failure(identity).await?;
        record_abuse_failure(escalated);

        if escalated {
            warn!("Client blocked after repeated failures: {} ({})", identity, reason);
            return Ok(GuardDecision::Forbidden { escalated: true });
        }

        let failures = self.tracker.failure_count(identity).await?;
        let remaining_attempts = self.tracker.policy().remaining_attempts(failures);

        debug!(
            "Rejected request from {}: {} ({} attempts left)",
            identity, reason, remaining_attempts
        );

        Ok(GuardDecision::Rejected {
            reason,
            remaining_attempts,
        })
    }
}
