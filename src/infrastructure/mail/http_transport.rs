//! HTTP mail relay transport
//!
//! Posts the composed message as JSON to a relay endpoint. Any non-2xx answer
//! is a delivery failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::domain::contact::{MailMessage, MailTransport};
use crate::domain::DomainError;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Transport that hands mail to an HTTP relay
#[derive(Clone)]
pub struct HttpMailTransport {
    client: Client,
    relay_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for HttpMailTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMailTransport")
            .field("relay_url", &self.relay_url)
            .field("token", &self.token.as_ref().map(|_| "[hidden]"))
            .finish()
    }
}

impl HttpMailTransport {
    pub fn new(relay_url: impl Into<String>, token: Option<String>) -> Result<Self, DomainError> {
        let relay_url = relay_url.into();

        if relay_url.trim().is_empty() {
            return Err(DomainError::configuration("Mail relay URL is not configured"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            relay_url,
            token: token.filter(|t| !t.is_empty()),
        })
    }
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), DomainError> {
        let mut request = self.client.post(&self.relay_url).json(message);

        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            warn!("Mail relay request failed: {}", e);
            DomainError::mail(format!("Mail relay unreachable: {}", e))
        })?;

        let status = response.status();

        if !status.is_success() {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(200)
                .collect();
            warn!("Mail relay rejected message: status={}, body={}", status, body);

            return Err(DomainError::mail(format!(
                "Mail relay returned status {}",
                status.as_u16()
            )));
        }

        debug!("Mail relay accepted message: status={}", status);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
