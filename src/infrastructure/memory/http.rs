//! Hosted memory-service store (mem0-compatible API)

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use super::super::http::HttpClientTrait;
use crate::domain::{AgentError, ConversationTurn, MemoryStore, PriorInteraction};

const DEFAULT_MEM0_BASE_URL: &str = "https://api.mem0.ai";

/// Memory store backed by a hosted mem0-compatible service
#[derive(Debug)]
pub struct HttpMemoryStore<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
}

impl<C: HttpClientTrait> HttpMemoryStore<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_MEM0_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            auth_header: format!("Token {}", api_key.into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }
}

#[async_trait]
impl<C: HttpClientTrait> MemoryStore for HttpMemoryStore<C> {
    async fn search(
        &self,
        user_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PriorInteraction>, AgentError> {
        let url = format!("{}/v1/memories/search/", self.base_url);
        let body = serde_json::json!({
            "query": query,
            "user_id": user_id,
            "limit": limit,
        });

        let response = self
            .client
            .post_json(&url, self.headers(), &body)
            .await
            .map_err(|e| AgentError::memory(format!("Memory search failed: {}", e)))?;

        let response: SearchResponse = serde_json::from_value(response)
            .map_err(|e| AgentError::memory(format!("Failed to parse search response: {}", e)))?;

        let results = match response {
            SearchResponse::Wrapped { results } => results,
            SearchResponse::Bare(results) => results,
        };

        Ok(results
            .into_iter()
            .map(|r| PriorInteraction {
                memory: r.memory,
                metadata: r.metadata.unwrap_or_default(),
            })
            .collect())
    }

    async fn add(
        &self,
        user_id: &str,
        turns: &[ConversationTurn],
        metadata: HashMap<String, serde_json::Value>,
    ) -> Result<(), AgentError> {
        let url = format!("{}/v1/memories/", self.base_url);
        let body = serde_json::json!({
            "messages": turns,
            "user_id": user_id,
            "metadata": metadata,
        });

        self.client
            .post_json(&url, self.headers(), &body)
            .await
            .map_err(|e| AgentError::memory(format!("Memory add failed: {}", e)))?;

        Ok(())
    }
}

// The hosted API wraps results in an object; older deployments return a bare
// array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Wrapped { results: Vec<SearchResult> },
    Bare(Vec<SearchResult>),
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    memory: String,
    metadata: Option<HashMap<String, serde_json::Value>>,
}
