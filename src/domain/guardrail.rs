//! Safety classification capability
//!
//! User input passes through a content-safety classifier before the workflow
//! core is ever invoked. The classifier returns a free-form verdict token;
//! only tokens on the allow-list proceed, everything else blocks.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::AgentError;

/// Verdict tokens that allow the query through the gate.
///
/// `unsafe S6` (specialized advice) and `unsafe S7` (privacy) are allowed
/// because giving tailored nutrition guidance is the whole point of this
/// agent; every other category blocks.
const ALLOWED_VERDICTS: &[&str] = &["safe", "unsafe s6", "unsafe s7"];

/// Outcome of the safety gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyVerdict {
    /// Input may proceed into the workflow
    Proceed,
    /// Input is blocked; carries the raw classifier verdict
    Block(String),
}

impl SafetyVerdict {
    /// Map a raw classifier verdict token onto the gate outcome.
    ///
    /// A Llama-Guard style classifier answers `safe`, or `unsafe` followed
    /// by the violated category code on the next line. Newlines are
    /// normalized to spaces before the allow-list check.
    pub fn from_token(raw: &str) -> Self {
        let token = raw.trim().replace('\n', " ").to_lowercase();

        if ALLOWED_VERDICTS.contains(&token.as_str()) {
            SafetyVerdict::Proceed
        } else {
            SafetyVerdict::Block(raw.trim().to_string())
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, SafetyVerdict::Block(_))
    }
}

/// Trait for content-safety classifiers
#[async_trait]
pub trait SafetyClassifier: Send + Sync + Debug {
    /// Classify a text, returning the raw verdict token
    async fn classify(&self, text: &str) -> Result<String, AgentError>;

    /// Get the classifier name
    fn classifier_name(&self) -> &'static str;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_verdict_proceeds() {
        assert_eq!(SafetyVerdict::from_token("safe"), SafetyVerdict::Proceed);
        assert_eq!(SafetyVerdict::from_token("  Safe \n"), SafetyVerdict::Proceed);
    }

    #[test]
    fn test_allowed_categories_proceed() {
        // specialized-advice and privacy categories pass for a medical agent
        assert_eq!(SafetyVerdict::from_token("unsafe\nS6"), SafetyVerdict::Proceed);
        assert_eq!(SafetyVerdict::from_token("unsafe S7"), SafetyVerdict::Proceed);
    }

    #[test]
    fn test_unsafe_verdict_blocks() {
        let verdict = SafetyVerdict::from_token("unsafe\nS1");
        assert!(verdict.is_blocked());
        assert_eq!(verdict, SafetyVerdict::Block("unsafe\nS1".to_string()));
    }

    #[test]
    fn test_unknown_verdict_blocks() {
        // anything off the allow-list blocks, including garbage output
        assert!(SafetyVerdict::from_token("maybe?").is_blocked());
        assert!(SafetyVerdict::from_token("").is_blocked());
    }
}
