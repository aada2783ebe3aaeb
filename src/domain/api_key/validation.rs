//! API key field validation

use thiserror::Error;

/// Errors raised while validating API key fields
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiKeyValidationError {
    #[error("API key ID cannot be empty")]
    EmptyId,

    #[error("API key ID exceeds maximum length of {0} characters")]
    TooLong(usize),

    #[error("API key ID must start with a letter or number")]
    InvalidStart,

    #[error("API key ID must end with a letter or number")]
    InvalidEnd,

    #[error("API key ID contains invalid character: '{0}'. Only alphanumeric characters and hyphens are allowed")]
    InvalidCharacter(char),

    #[error("API key ID cannot contain consecutive hyphens")]
    ConsecutiveHyphens,

    #[error("Owner ID cannot be empty")]
    EmptyOwner,

    #[error("Owner ID exceeds maximum length of {0} characters")]
    OwnerTooLong(usize),

    #[error("Owner ID cannot contain whitespace or control characters")]
    InvalidOwnerCharacter,

    #[error("API key name cannot be empty")]
    EmptyName,

    #[error("API key name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("Expiry must be between 1 and {0} days")]
    ExpiryOutOfRange(u32),
}

const MAX_API_KEY_ID_LENGTH: usize = 50;
const MAX_OWNER_ID_LENGTH: usize = 100;
const MAX_NAME_LENGTH: usize = 100;

/// Upper bound for `expires_in_days` (ten years)
pub const MAX_EXPIRY_DAYS: u32 = 3650;

/// Validate an API key ID
///
/// Rules:
/// - Cannot be empty
/// - Maximum 50 characters
/// - Only alphanumeric characters and hyphens
/// - Must start and end with alphanumeric
/// - No consecutive hyphens
pub fn validate_api_key_id(id: &str) -> Result<(), ApiKeyValidationError> {
    if id.is_empty() {
        return Err(ApiKeyValidationError::EmptyId);
    }

    if id.len() > MAX_API_KEY_ID_LENGTH {
        return Err(ApiKeyValidationError::TooLong(MAX_API_KEY_ID_LENGTH));
    }

    let chars: Vec<char> = id.chars().collect();

    if !chars[0].is_ascii_alphanumeric() {
        return Err(ApiKeyValidationError::InvalidStart);
    }

    if !chars[chars.len() - 1].is_ascii_alphanumeric() {
        return Err(ApiKeyValidationError::InvalidEnd);
    }

    let mut prev_hyphen = false;

    for c in &chars {
        if *c == '-' {
            if prev_hyphen {
                return Err(ApiKeyValidationError::ConsecutiveHyphens);
            }
            prev_hyphen = true;
        } else if c.is_ascii_alphanumeric() {
            prev_hyphen = false;
        } else {
            return Err(ApiKeyValidationError::InvalidCharacter(*c));
        }
    }

    Ok(())
}

/// Validate an owner identifier (user id, email, tenant slug...)
pub fn validate_owner_id(owner: &str) -> Result<(), ApiKeyValidationError> {
    if owner.is_empty() {
        return Err(ApiKeyValidationError::EmptyOwner);
    }

    if owner.chars().count() > MAX_OWNER_ID_LENGTH {
        return Err(ApiKeyValidationError::OwnerTooLong(MAX_OWNER_ID_LENGTH));
    }

    if owner.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ApiKeyValidationError::InvalidOwnerCharacter);
    }

    Ok(())
}

/// Validate a display name
pub fn validate_key_name(name: &str) -> Result<(), ApiKeyValidationError> {
    if name.trim().is_empty() {
        return Err(ApiKeyValidationError::EmptyName);
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ApiKeyValidationError::NameTooLong(MAX_NAME_LENGTH));
    }

    Ok(())
}

/// Validate a requested lifetime in days
pub fn validate_expiry_days(days: u32) -> Result<(), ApiKeyValidationError> {
    if days == 0 || days > MAX_EXPIRY_DAYS {
        return Err(ApiKeyValidationError::ExpiryOutOfRange(MAX_EXPIRY_DAYS));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ids() {
        assert!(validate_api_key_id("key-1").is_ok());
        assert!(validate_api_key_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_api_key_id("a").is_ok());
    }

    #[test]
    fn test_invalid_ids() {
        assert_eq!(validate_api_key_id(""), Err(ApiKeyValidationError::EmptyId));
        assert_eq!(
            validate_api_key_id("-key"),
            Err(ApiKeyValidationError::InvalidStart)
        );
        assert_eq!(
            validate_api_key_id("key-"),
            Err(ApiKeyValidationError::InvalidEnd)
        );
        assert_eq!(
            validate_api_key_id("key--1"),
            Err(ApiKeyValidationError::ConsecutiveHyphens)
        );
        assert_eq!(
            validate_api_key_id("key_1"),
            Err(ApiKeyValidationError::InvalidCharacter('_'))
        );
        assert_eq!(
            validate_api_key_id(&"a".repeat(51)),
            Err(ApiKeyValidationError::TooLong(50))
        );
    }

    #[test]
    fn test_owner_validation() {
        assert!(validate_owner_id("user-42").is_ok());
        assert!(validate_owner_id("owner@example.com").is_ok());
        assert_eq!(validate_owner_id(""), Err(ApiKeyValidationError::EmptyOwner));
        assert_eq!(
            validate_owner_id("two words"),
            Err(ApiKeyValidationError::InvalidOwnerCharacter)
        );
        assert_eq!(
            validate_owner_id(&"o".repeat(101)),
            Err(ApiKeyValidationError::OwnerTooLong(100))
        );
    }

    #[test]
    fn test_name_validation() {
        assert!(validate_key_name("Portfolio site").is_ok());
        assert_eq!(validate_key_name("   "), Err(ApiKeyValidationError::EmptyName));
        assert_eq!(
            validate_key_name(&"n".repeat(101)),
            Err(ApiKeyValidationError::NameTooLong(100))
        );
    }

    #[test]
    fn test_expiry_validation() {
        assert!(validate_expiry_days(1).is_ok());
        assert!(validate_expiry_days(MAX_EXPIRY_DAYS).is_ok());
        assert!(validate_expiry_days(0).is_err());
        assert!(validate_expiry_days(MAX_EXPIRY_DAYS + 1).is_err());
    }
}
