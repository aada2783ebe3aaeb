//! Contact form submission and outgoing mail types

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::DomainError;

/// A contact form submission
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(max = 100))]
    #[serde(default)]
    pub company: Option<String>,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 2000))]
    pub message: String,

    /// Page the form was posted from
    #[validate(url, length(max = 500))]
    #[serde(default)]
    pub source: Option<String>,
}

impl ContactRequest {
    /// Run field validation, flattening the report into one message
    pub fn validate_fields(&self) -> Result<(), DomainError> {
        self.validate().map_err(|errors| {
            let mut fields: Vec<String> = errors
                .field_errors()
                .into_iter()
                .map(|(field, errs)| {
                    let codes: Vec<String> = errs.iter().map(|e| e.code.to_string()).collect();
                    format!("{} ({})", field, codes.join(", "))
                })
                .collect();
            fields.sort();

            DomainError::validation(format!("Invalid fields: {}", fields.join("; ")))
        })
    }

    /// Subject line for the notification mail
    pub fn subject(&self) -> String {
        match self.company.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(company) => format!("New message from {} ({})", self.name, company),
            None => format!("New message from {}", self.name),
        }
    }
}

/// A fully composed mail ready for a transport
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> ContactRequest {
        ContactRequest {
            name: "Ada Lovelace".to_string(),
            company: Some("Analytical Engines".to_string()),
            email: "ada@example.com".to_string(),
            message: "Hello there".to_string(),
            source: Some("https://example.com/contact".to_string()),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_request().validate_fields().is_ok());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let mut request = valid_request();
        request.email = "not-an-email".to_string();

        let err = request.validate_fields().unwrap_err();
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn test_length_limits() {
        let mut request = valid_request();
        request.name = String::new();
        request.message = "m".repeat(2001);
        request.company = Some("c".repeat(101));

        let message = request.validate_fields().unwrap_err().to_string();
        assert!(message.contains("name"));
        assert!(message.contains("message"));
        assert!(message.contains("company"));
    }

    #[test]
    fn test_source_must_be_url() {
        let mut request = valid_request();
        request.source = Some("not a url".to_string());
        assert!(request.validate_fields().is_err());

        request.source = None;
        assert!(request.validate_fields().is_ok());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let json = r#"{"name":"a","email":"a@b.co","message":"m","admin":true}"#;
        let result: Result<ContactRequest, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_subject_with_and_without_company() {
        let mut request = valid_request();
        assert_eq!(
            request.subject(),
            "New message from Ada Lovelace (Analytical Engines)"
        );

        request.company = Some("  ".to_string());
        assert_eq!(request.subject(), "New message from Ada Lovelace");
    }
}
