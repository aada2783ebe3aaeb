//! Application state for shared services

use std::sync::Arc;

use crate::domain::AbuseTracker;
use crate::infrastructure::abuse::{AccessGuard, RateLimiter};
use crate::infrastructure::api_key::ApiKeyService;
use crate::infrastructure::auth::JwtService;
use crate::infrastructure::mail::ContactService;

/// Shared services handed to every handler and middleware
#[derive(Debug, Clone)]
pub struct AppState {
    pub api_key_service: Arc<ApiKeyService>,
    pub abuse_tracker: Arc<dyn AbuseTracker>,
    pub access_guard: Arc<AccessGuard>,
    pub contact_service: Arc<ContactService>,
    pub rate_limiter: Arc<RateLimiter>,
    pub jwt_service: Arc<JwtService>,
    /// Resolve the client from proxy headers instead of the socket peer
    pub trust_proxy: bool,
}

impl AppState {
    pub fn new(
        api_key_service: Arc<ApiKeyService>,
        abuse_tracker: Arc<dyn AbuseTracker>,
        contact_service: Arc<ContactService>,
        rate_limiter: Arc<RateLimiter>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        let access_guard = Arc::new(AccessGuard::new(
            api_key_service.clone(),
            abuse_tracker.clone(),
        ));

        Self {
            api_key_service,
            abuse_tracker,
            access_guard,
            contact_service,
            rate_limiter,
            jwt_service,
            trust_proxy: false,
        }
    }

    pub fn with_trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }
}
