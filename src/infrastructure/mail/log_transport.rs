//! Transport that writes mail to the log instead of sending it

use async_trait::async_trait;
use tracing::info;

use crate::domain::contact::{MailMessage, MailTransport};
use crate::domain::DomainError;

/// Logs each message and reports success. Meant for development.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailTransport;

impl LogMailTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), DomainError> {
        info!(
            from = %message.from,
            to = %message.to,
            reply_to = message.reply_to.as_deref().unwrap_or("-"),
            subject = %message.subject,
            "Mail delivered to log transport"
        );

        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
