//! Abuse mitigation domain
//!
//! Failure counting per client identity with a sliding window, and a
//! blacklist that holds until an operator removes the entry.

mod entity;
mod tracker;

pub use entity::{
    AbusePolicy, AbuseStatus, ClientIdentity, FailureRecord, DEFAULT_BLOCK_DURATION_SECS,
    DEFAULT_MAX_FAILED_ATTEMPTS,
};
pub use tracker::AbuseTracker;

#[cfg(test)]
pub use tracker::MockAbuseTracker;
