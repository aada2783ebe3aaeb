//! In-memory abuse tracker

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::domain::abuse::{AbusePolicy, AbuseTracker, ClientIdentity, FailureRecord};
use crate::domain::{Clock, DomainError, SystemClock};

#[derive(Debug)]
struct AbuseState {
    failures: HashMap<ClientIdentity, FailureRecord>,
    blacklist: HashSet<ClientIdentity>,
    last_cleanup: DateTime<Utc>,
}

impl AbuseState {
    fn new(blacklist: HashSet<ClientIdentity>, now: DateTime<Utc>) -> Self {
        Self {
            failures: HashMap::new(),
            blacklist,
            last_cleanup: now,
        }
    }

    /// Drop failure records whose window has lapsed, at most once per interval
    fn maybe_cleanup(&mut self, now: DateTime<Utc>, window: Duration, interval: Duration) {
        if now - self.last_cleanup < interval {
            return;
        }

        self.last_cleanup = now;

        let before = self.failures.len();
        self.failures.retain(|_, record| !record.is_stale_at(now, window));

        let dropped = before - self.failures.len();
        if dropped > 0 {
            debug!("Dropped {} stale failure records", dropped);
        }
    }
}

/// Abuse tracker holding all state in process memory
///
/// Failures and blacklist share one lock so a failure that escalates also
/// lands on the blacklist in the same critical section.
#[derive(Debug)]
pub struct InMemoryAbuseTracker {
    state: Arc<RwLock<AbuseState>>,
    policy: AbusePolicy,
    clock: Arc<dyn Clock>,
    cleanup_interval: Duration,
}

impl InMemoryAbuseTracker {
    pub fn new(policy: AbusePolicy) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        Self {
            state: Arc::new(RwLock::new(AbuseState::new(HashSet::new(), clock.now()))),
            policy,
            clock,
            cleanup_interval: Duration::minutes(5),
        }
    }

    /// Create with a custom time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        if let Ok(mut state) = self.state.try_write() {
            state.last_cleanup = clock.now();
        }
        self.clock = clock;
        self
    }

    /// Seed the blacklist, e.g. from configuration
    pub fn with_blocked(mut self, identities: impl IntoIterator<Item = ClientIdentity>) -> Self {
        self.state = Arc::new(RwLock::new(AbuseState::new(
            identities.into_iter().collect(),
            self.clock.now(),
        )));
        self
    }
}

#[async_trait]
impl AbuseTracker for InMemoryAbuseTracker {
    async fn record_failure(&self, identity: &ClientIdentity) -> Result<bool, DomainError> {
        let now = self.clock.now();
        let window = self.policy.block_duration;
        let mut state = self.state.write().await;
        state.maybe_cleanup(now, window, self.cleanup_interval);

        let count = match state.failures.get_mut(identity) {
            Some(record) => {
                record.register(now, window);
                record.count
            }
            None => {
                state
                    .failures
                    .insert(identity.clone(), FailureRecord::first(now));
                1
            }
        };

        if self.policy.is_exceeded(count) {
            let newly_added = state.blacklist.insert(identity.clone());

            if newly_added {
                warn!(
                    "Client blacklisted after {} failed attempts: {}",
                    count, identity
                );
            }

            return Ok(true);
        }

        Ok(false)
    }

    async fn is_blacklisted(&self, identity: &ClientIdentity) -> Result<bool, DomainError> {
        let state = self.state.read().await;
        Ok(state.blacklist.contains(identity))
    }

    async fn failure_count(&self, identity: &ClientIdentity) -> Result<u32, DomainError> {
        let now = self.clock.now();
        let mut state = self.state.write().await;

        match state.failures.get(identity) {
            Some(record) if record.is_stale_at(now, self.policy.block_duration) => {
                state.failures.remove(identity);
                Ok(0)
            }
            Some(record) => Ok(record.count),
            None => Ok(0),
        }
    }

    async fn clear_failures(&self, identity: &ClientIdentity) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        state.failures.remove(identity);
        Ok(())
    }

    async fn add_to_blacklist(&self, identity: &ClientIdentity) -> Result<(), DomainError> {
        let mut state = self.state.write().await;

        if state.blacklist.insert(identity.clone()) {
            info!("Client added to blacklist: {}", identity);
        }

        Ok(())
    }

    async fn remove_from_blacklist(
        &self,
        identity: &ClientIdentity,
    ) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        let removed = state.blacklist.remove(identity);

        if removed {
            info!("Client removed from blacklist: {}", identity);
        }

        Ok(removed)
    }

    fn policy(&self) -> &AbusePolicy {
        &self.policy
    }
}
