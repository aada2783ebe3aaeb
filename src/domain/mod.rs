//! Domain layer - Core business logic and entities

pub mod abuse;
pub mod api_key;
pub mod clock;
pub mod contact;
pub mod error;

pub use abuse::{AbusePolicy, AbuseStatus, AbuseTracker, ClientIdentity, FailureRecord};
pub use api_key::{
    ApiKey, ApiKeyId, ApiKeyRepository, ApiKeySummary, ApiKeyValidationError, OwnerId,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use contact::{
    ContactRequest, EmailTemplate, MailMessage, MailTransport, TemplateError, TemplateRenderer,
};
pub use error::DomainError;
