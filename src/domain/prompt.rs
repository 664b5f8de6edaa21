//! Prompt template parsing and rendering
//!
//! Templates use `${var:name}` for required variables and
//! `${var:name:default}` for variables with a fallback value. Rendering is
//! plain text substitution; templates carry no dependency on any generation
//! backend.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

static VARIABLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{var:([a-zA-Z0-9][-_a-zA-Z0-9]*)(?::([^}]*))?\}").unwrap()
});

/// Template processing errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TemplateError {
    #[error("Missing required variable: {name}")]
    MissingVariable { name: String },
}

/// A variable referenced by a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptVariable {
    pub name: String,
    pub default: Option<String>,
}

impl PromptVariable {
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// A parsed prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    content: String,
    variables: Vec<PromptVariable>,
}

impl PromptTemplate {
    /// Parse a template string and extract its variables
    pub fn parse(content: impl Into<String>) -> Self {
        let content = content.into();
        let mut variables: Vec<PromptVariable> = Vec::new();

        for cap in VARIABLE_PATTERN.captures_iter(&content) {
            let name = cap.get(1).unwrap().as_str().to_string();
            if variables.iter().any(|v| v.name == name) {
                continue;
            }
            variables.push(PromptVariable {
                name,
                default: cap.get(2).map(|m| m.as_str().to_string()),
            });
        }

        Self { content, variables }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn variables(&self) -> &[PromptVariable] {
        &self.variables
    }

    /// Render the template with the provided values.
    ///
    /// Missing values fall back to the variable's default; a required
    /// variable with no value is an error.
    pub fn render(&self, values: &HashMap<String, String>) -> Result<String, TemplateError> {
        let mut missing: Option<String> = None;

        let rendered = VARIABLE_PATTERN.replace_all(&self.content, |caps: &Captures| {
            let name = &caps[1];
            if let Some(value) = values.get(name) {
                value.clone()
            } else if let Some(default) = caps.get(2) {
                default.as_str().to_string()
            } else {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        });

        match missing {
            Some(name) => Err(TemplateError::MissingVariable { name }),
            None => Ok(rendered.into_owned()),
        }
    }
}

/// Render a template string directly
pub fn render_template(
    template: &str,
    values: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    PromptTemplate::parse(template).render(values)
}
