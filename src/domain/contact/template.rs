//! Email template parsing and rendering
//!
//! Supports placeholder syntax: `{{name}}` and `{{name:default}}`
//! - `{{name}}` - Required value, error if not provided
//! - `{{name:default}}` - Optional value with a default
//!
//! Substituted values are HTML-escaped. The template text itself is trusted.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

/// Matches `{{name}}` or `{{name:default}}`
static PLACEHOLDER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z][a-zA-Z0-9_]*)(?::([^}]*))?\s*\}\}")
        .expect("placeholder pattern is a valid regex")
});

/// Template processing errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TemplateError {
    #[error("Missing required value: {name}")]
    MissingValue { name: String },

    #[error("Unknown template: {name}")]
    UnknownTemplate { name: String },
}

/// A placeholder found in a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    pub default: Option<String>,
}

impl Placeholder {
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// A parsed email template
#[derive(Debug, Clone)]
pub struct EmailTemplate {
    content: String,
    placeholders: Vec<Placeholder>,
}

impl EmailTemplate {
    /// Parse a template string and collect its placeholders
    pub fn parse(content: impl Into<String>) -> Self {
        let content = content.into();
        let mut placeholders = Vec::new();
        let mut seen = HashSet::new();

        for cap in PLACEHOLDER_PATTERN.captures_iter(&content) {
            let name = cap[1].to_string();

            if !seen.insert(name.clone()) {
                continue;
            }

            placeholders.push(Placeholder {
                name,
                default: cap.get(2).map(|m| m.as_str().to_string()),
            });
        }

        Self {
            content,
            placeholders,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    /// Render with HTML-escaped values
    pub fn render_html(&self, values: &HashMap<String, String>) -> Result<String, TemplateError> {
        self.render_with(values, escape_html)
    }

    /// Render with values inserted verbatim (plain-text bodies)
    pub fn render_text(&self, values: &HashMap<String, String>) -> Result<String, TemplateError> {
        self.render_with(values, |v| v.to_string())
    }

    fn render_with(
        &self,
        values: &HashMap<String, String>,
        encode: impl Fn(&str) -> String,
    ) -> Result<String, TemplateError> {
        if let Some(missing) = self
            .placeholders
            .iter()
            .find(|p| p.is_required() && !values.contains_key(&p.name))
        {
            return Err(TemplateError::MissingValue {
                name: missing.name.clone(),
            });
        }

        let rendered = PLACEHOLDER_PATTERN.replace_all(&self.content, |cap: &Captures<'_>| {
            let value = values
                .get(&cap[1])
                .map(String::as_str)
                .or_else(|| cap.get(2).map(|m| m.as_str()))
                .unwrap_or_default();
            encode(value)
        });

        Ok(rendered.into_owned())
    }
}

/// Renders a named template with a set of values
pub trait TemplateRenderer: Send + Sync + Debug {
    fn render(&self, name: &str, values: &HashMap<String, String>)
    -> Result<String, TemplateError>;
}

/// Escape the five HTML-significant characters
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }

    escaped
}
