//! API Key domain
//!
//! Types and traits for the API key lifecycle: identifiers, the key entity,
//! its listing view and the storage contract.

mod entity;
mod repository;
mod validation;

pub use entity::{ApiKey, ApiKeyId, ApiKeySummary, OwnerId};
pub use repository::ApiKeyRepository;
pub use validation::{
    validate_api_key_id, validate_expiry_days, validate_key_name, validate_owner_id,
    ApiKeyValidationError, MAX_EXPIRY_DAYS,
};

#[cfg(test)]
pub use repository::mock;
