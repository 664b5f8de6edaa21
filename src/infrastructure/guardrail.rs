//! Llama-Guard content-safety classifier over Groq's OpenAI-compatible API

use async_trait::async_trait;
use serde::Deserialize;

use super::http::HttpClientTrait;
use crate::domain::{AgentError, SafetyClassifier};

const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai";
const DEFAULT_GUARD_MODEL: &str = "meta-llama/llama-guard-4-12b";

/// Safety classifier backed by a Llama-Guard model
#[derive(Debug)]
pub struct LlamaGuardClassifier<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    model: String,
}

impl<C: HttpClientTrait> LlamaGuardClassifier<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_GROQ_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            auth_header: format!("Bearer {}", api_key.into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: DEFAULT_GUARD_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[async_trait]
impl<C: HttpClientTrait> SafetyClassifier for LlamaGuardClassifier<C> {
    async fn classify(&self, text: &str) -> Result<String, AgentError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": text}],
        });
        let headers = vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ];

        let response = self
            .client
            .post_json(&self.chat_completions_url(), headers, &body)
            .await
            .map_err(|e| AgentError::guardrail(format!("Classification request failed: {}", e)))?;

        let response: GuardResponse = serde_json::from_value(response).map_err(|e| {
            AgentError::guardrail(format!("Failed to parse classifier response: {}", e))
        })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AgentError::guardrail("No verdict in classifier response"))
    }

    fn classifier_name(&self) -> &'static str {
        "llama-guard"
    }
}

#[derive(Debug, Deserialize)]
struct GuardResponse {
    choices: Vec<GuardChoice>,
}

#[derive(Debug, Deserialize)]
struct GuardChoice {
    message: GuardMessage,
}

#[derive(Debug, Deserialize)]
struct GuardMessage {
    content: Option<String>,
}
