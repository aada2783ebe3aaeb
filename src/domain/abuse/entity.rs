//! Abuse tracking value types

use std::net::IpAddr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

const MAX_IDENTITY_LENGTH: usize = 255;

/// Default number of failures that triggers a block
pub const DEFAULT_MAX_FAILED_ATTEMPTS: u32 = 5;

/// Default sliding window, 24 hours
pub const DEFAULT_BLOCK_DURATION_SECS: i64 = 24 * 60 * 60;

/// Key under which failures are counted, usually the client address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientIdentity(String);

impl ClientIdentity {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(DomainError::validation("Client identity cannot be empty"));
        }

        if trimmed.len() > MAX_IDENTITY_LENGTH {
            return Err(DomainError::validation(format!(
                "Client identity exceeds maximum length of {} characters",
                MAX_IDENTITY_LENGTH
            )));
        }

        if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(DomainError::validation(
                "Client identity cannot contain whitespace or control characters",
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Identity used when no client address is available
    pub fn unknown() -> Self {
        Self("0.0.0.0".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<IpAddr> for ClientIdentity {
    fn from(ip: IpAddr) -> Self {
        Self(ip.to_string())
    }
}

impl TryFrom<String> for ClientIdentity {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClientIdentity> for String {
    fn from(identity: ClientIdentity) -> Self {
        identity.0
    }
}

impl std::fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Thresholds for failure tracking
#[derive(Debug, Clone, PartialEq)]
pub struct AbusePolicy {
    pub max_failed_attempts: u32,
    /// Window after the last failure during which failures accumulate
    pub block_duration: Duration,
    /// Clear an identity's failures after a successful request
    pub forgive_on_success: bool,
}

impl Default for AbusePolicy {
    fn default() -> Self {
        Self {
            max_failed_attempts: DEFAULT_MAX_FAILED_ATTEMPTS,
            block_duration: Duration::seconds(DEFAULT_BLOCK_DURATION_SECS),
            forgive_on_success: false,
        }
    }
}

impl AbusePolicy {
    pub fn new(max_failed_attempts: u32, block_duration: Duration) -> Self {
        Self {
            max_failed_attempts,
            block_duration,
            forgive_on_success: false,
        }
    }

    pub fn with_forgive_on_success(mut self, forgive: bool) -> Self {
        self.forgive_on_success = forgive;
        self
    }

    /// Attempts left before a block for a given failure count
    pub fn remaining_attempts(&self, failures: u32) -> u32 {
        self.max_failed_attempts.saturating_sub(failures)
    }

    pub fn is_exceeded(&self, failures: u32) -> bool {
        failures >= self.max_failed_attempts
    }
}

/// Failure counter for one identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureRecord {
    pub count: u32,
    /// Time of the most recent failure
    pub window_start: DateTime<Utc>,
}

impl FailureRecord {
    pub fn first(now: DateTime<Utc>) -> Self {
        Self {
            count: 1,
            window_start: now,
        }
    }

    pub fn is_stale_at(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.window_start > window
    }

    /// Count one more failure. A stale record restarts at one.
    pub fn register(&mut self, now: DateTime<Utc>, window: Duration) {
        if self.is_stale_at(now, window) {
            *self = Self::first(now);
            return;
        }

        self.count = self.count.saturating_add(1);
        self.window_start = now;
    }
}

/// Answer to "may this identity keep trying?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AbuseStatus {
    pub blocked: bool,
    pub remaining_attempts: u32,
}

impl AbuseStatus {
    pub fn blocked() -> Self {
        Self {
            blocked: true,
            remaining_attempts: 0,
        }
    }
}
