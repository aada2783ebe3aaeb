//! Abuse mitigation infrastructure
//!
//! Tracker backends, the access guard and the per-client request throttle.

mod guard;
mod in_memory;
mod rate_limiter;
mod redis;

pub use guard::{AccessGuard, ActionFailure, GuardDecision, RejectionReason};
pub use in_memory::InMemoryAbuseTracker;
pub use rate_limiter::{RateLimitResult, RateLimiter};
pub use self::redis::{RedisAbuseTracker, DEFAULT_ABUSE_KEY_PREFIX};
