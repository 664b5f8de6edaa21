use thiserror::Error;

use super::prompt::TemplateError;

/// Core agent errors
///
/// Quality-threshold misses (a score below 4.0) are never errors; they are
/// handled by the workflow gates as normal control flow. Errors here mean a
/// capability call failed or returned something the caller cannot use, and
/// they abort the whole workflow invocation.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Generation error: {provider} - {message}")]
    Generation { provider: String, message: String },

    #[error("Retrieval error: {message}")]
    Retrieval { message: String },

    #[error("Score parse error: {metric} evaluator returned {raw:?}, expected a number in [1, 5]")]
    ScoreParse { metric: String, raw: String },

    #[error("Guardrail error: {message}")]
    Guardrail { message: String },

    #[error("Memory error: {message}")]
    Memory { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
}

impl AgentError {
    pub fn generation(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generation {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval {
            message: message.into(),
        }
    }

    pub fn score_parse(metric: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::ScoreParse {
            metric: metric.into(),
            raw: raw.into(),
        }
    }

    pub fn guardrail(message: impl Into<String>) -> Self {
        Self::Guardrail {
            message: message.into(),
        }
    }

    pub fn memory(message: impl Into<String>) -> Self {
        Self::Memory {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
