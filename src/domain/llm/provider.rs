use std::fmt::Debug;

use async_trait::async_trait;

use super::{LlmRequest, LlmResponse};
use crate::domain::AgentError;

/// Trait for LLM providers (OpenAI-compatible backends, etc.)
///
/// The workflow consumes this capability for both free-text generation and
/// rubric scoring; scoring is an ordinary chat call whose output the caller
/// parses as a numeric score.
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// Send a chat completion request
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, AgentError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
