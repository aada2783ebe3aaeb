//! API middleware components

pub mod admin_auth;
pub mod auth;
pub mod blacklist;
pub mod client_identity;
pub mod logging;
pub mod metrics;
pub mod security;
pub mod throttle;

pub use admin_auth::RequireAdmin;
pub use auth::{extract_api_key, PresentedApiKey};
pub use blacklist::blacklist_middleware;
pub use client_identity::{resolve_client_identity, ClientIp};
pub use logging::{logging_middleware, redact_query};
pub use metrics::metrics_middleware;
pub use security::{security_headers_middleware, MAX_BODY_SIZE};
pub use throttle::throttle_middleware;
