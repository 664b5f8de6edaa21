//! OpenAI embeddings provider

use async_trait::async_trait;
use serde::Deserialize;

use super::super::http::HttpClientTrait;
use crate::domain::{AgentError, EmbeddingProvider};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// OpenAI embeddings API provider
#[derive(Debug)]
pub struct OpenAiEmbeddings<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    model: String,
}

impl<C: HttpClientTrait> OpenAiEmbeddings<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
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
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OpenAiEmbeddings<C> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AgentError> {
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
        });
        let headers = vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ];

        let response = self
            .client
            .post_json(&self.embeddings_url(), headers, &body)
            .await
            .map_err(|e| AgentError::retrieval(format!("Embedding request failed: {}", e)))?;

        let response: EmbeddingsResponse = serde_json::from_value(response).map_err(|e| {
            AgentError::retrieval(format!("Failed to parse embeddings response: {}", e))
        })?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| AgentError::retrieval("No embedding in response"))
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}
