//! Mail infrastructure
//!
//! Template registry, transports and the contact service that ties them
//! together.

mod http_transport;
mod log_transport;
mod renderer;
mod service;

pub use http_transport::HttpMailTransport;
pub use log_transport::LogMailTransport;
pub use renderer::{EmailTemplateRenderer, CONTACT_TEMPLATE};
pub use service::ContactService;
