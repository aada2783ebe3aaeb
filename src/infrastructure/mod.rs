//! Infrastructure layer - External service implementations

pub mod abuse;
pub mod api_key;
pub mod auth;
pub mod logging;
pub mod mail;
pub mod observability;
