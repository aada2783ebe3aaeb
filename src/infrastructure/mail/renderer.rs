//! Named email template registry

use std::collections::HashMap;

use chrono::{Datelike, Utc};

use crate::domain::contact::{EmailTemplate, TemplateError, TemplateRenderer};

/// Name of the built-in contact notification template
pub const CONTACT_TEMPLATE: &str = "contact";

const CONTACT_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>{{subject}}</title>
  </head>
  <body style="font-family: sans-serif; color: #222;">
    <h2>{{subject}}</h2>
    <table cellpadding="4">
      <tr><th align="left">Name</th><td>{{name}}</td></tr>
      <tr><th align="left">Company</th><td>{{company:-}}</td></tr>
      <tr><th align="left">Email</th><td><a href="mailto:{{email}}">{{email}}</a></td></tr>
      <tr><th align="left">Sent from</th><td>{{source:unknown page}}</td></tr>
    </table>
    <p style="white-space: pre-wrap;">{{message}}</p>
    <hr>
    <small>&copy; {{current_year}}</small>
  </body>
</html>
"#;

/// In-memory registry of parsed templates
///
/// Every render gets a `current_year` value unless the caller supplies one.
#[derive(Debug, Clone)]
pub struct EmailTemplateRenderer {
    templates: HashMap<String, EmailTemplate>,
}

impl EmailTemplateRenderer {
    /// Registry holding the built-in templates
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
        .register(CONTACT_TEMPLATE, CONTACT_HTML)
    }

    /// Add or replace a template
    pub fn register(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.templates
            .insert(name.into(), EmailTemplate::parse(content));
        self
    }

    pub fn get(&self, name: &str) -> Option<&EmailTemplate> {
        self.templates.get(name)
    }
}

impl Default for EmailTemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for EmailTemplateRenderer {
    fn render(
        &self,
        name: &str,
        values: &HashMap<String, String>,
    ) -> Result<String, TemplateError> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| TemplateError::UnknownTemplate {
                name: name.to_string(),
            })?;

        if values.contains_key("current_year") {
            return template.render_html(values);
        }

        let mut values = values.clone();
        values.insert("current_year".to_string(), Utc::now().year().to_string());

        template.render_html(&values)
    }
}
