//! Contact mail composition and delivery

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::contact::{ContactRequest, MailMessage, MailTransport, TemplateRenderer};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_contact_email;

use super::renderer::CONTACT_TEMPLATE;

/// Turns a contact submission into a mail to the site owner
#[derive(Debug, Clone)]
pub struct ContactService {
    renderer: Arc<dyn TemplateRenderer>,
    transport: Arc<dyn MailTransport>,
    from: String,
    to: String,
}

impl ContactService {
    /// `from` is the sending address; `to` receives every submission
    pub fn new(
        renderer: Arc<dyn TemplateRenderer>,
        transport: Arc<dyn MailTransport>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            renderer,
            transport,
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Build the outgoing message. The submitter becomes the reply-to address.
    pub fn compose(&self, request: &ContactRequest) -> Result<MailMessage, DomainError> {
        let subject = request.subject();
        let mut values = HashMap::from([
            ("subject".to_string(), subject.clone()),
            ("name".to_string(), request.name.clone()),
            ("email".to_string(), request.email.clone()),
            ("message".to_string(), request.message.clone()),
        ]);

        if let Some(company) = non_blank(request.company.as_deref()) {
            values.insert("company".to_string(), company.to_string());
        }

        if let Some(source) = non_blank(request.source.as_deref()) {
            values.insert("source".to_string(), source.to_string());
        }

        let html = self
            .renderer
            .render(CONTACT_TEMPLATE, &values)
            .map_err(|e| DomainError::template(e.to_string()))?;

        Ok(MailMessage {
            from: self.from.clone(),
            to: self.to.clone(),
            reply_to: Some(request.email.clone()),
            subject,
            text: format!(
                "Message from {} ({}): {}",
                request.name, request.email, request.message
            ),
            html,
        })
    }

    /// Compose and deliver. Only a `DomainError::Mail` from the transport means
    /// the message was refused; anything else is passed through untouched.
    pub async fn send(&self, request: &ContactRequest) -> Result<(), DomainError> {
        let message = self.compose(request)?;
        let transport = self.transport.name();

        match self.transport.send(&message).await {
            Ok(()) => {
                record_contact_email(transport, "sent");
                info!("Contact mail sent via {}: subject={}", transport, message.subject);
                Ok(())
            }
            Err(e) => {
                record_contact_email(transport, "failed");
                warn!("Contact mail failed via {}: {}", transport, e);
                Err(e)
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
