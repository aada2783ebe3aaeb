//! Mail transport trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::MailMessage;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Delivers a composed message. A refused message is reported as
/// `DomainError::Mail`; other variants mean the transport itself is broken.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MailTransport: Send + Sync + Debug {
    async fn send(&self, message: &MailMessage) -> Result<(), DomainError>;

    /// Short name for logs and metrics
    fn name(&self) -> &'static str;
}
