//! Contact form domain
//!
//! The submission type, the composed mail, the template language and the
//! transport contract.

mod entity;
mod template;
mod transport;

pub use entity::{ContactRequest, MailMessage};
pub use template::{escape_html, EmailTemplate, Placeholder, TemplateError, TemplateRenderer};
pub use transport::MailTransport;

#[cfg(test)]
pub use transport::MockMailTransport;
