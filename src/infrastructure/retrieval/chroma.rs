//! Chroma vector-store retriever

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::super::http::HttpClientTrait;
use crate::domain::{AgentError, EmbeddingProvider, Passage, Retriever};

/// Retriever over a Chroma collection.
///
/// Embeds the query through the injected provider, then runs a similarity
/// query against the collection's HTTP endpoint.
#[derive(Debug)]
pub struct ChromaRetriever<C: HttpClientTrait, E: EmbeddingProvider> {
    client: C,
    embeddings: Arc<E>,
    base_url: String,
    collection_id: String,
}

impl<C: HttpClientTrait, E: EmbeddingProvider> ChromaRetriever<C, E> {
    pub fn new(
        client: C,
        embeddings: Arc<E>,
        base_url: impl Into<String>,
        collection_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            embeddings,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            collection_id: collection_id.into(),
        }
    }

    fn query_url(&self) -> String {
        format!(
            "{}/api/v1/collections/{}/query",
            self.base_url, self.collection_id
        )
    }
}

#[async_trait]
impl<C: HttpClientTrait, E: EmbeddingProvider> Retriever for ChromaRetriever<C, E> {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Passage>, AgentError> {
        let embedding = self.embeddings.embed(query).await?;

        let body = serde_json::json!({
            "query_embeddings": [embedding],
            "n_results": top_k,
            "include": ["documents", "metadatas", "distances"],
        });

        let response = self
            .client
            .post_json(&self.query_url(), vec![("Content-Type", "application/json")], &body)
            .await
            .map_err(|e| AgentError::retrieval(format!("Chroma query failed: {}", e)))?;

        let response: ChromaQueryResponse = serde_json::from_value(response).map_err(|e| {
            AgentError::retrieval(format!("Failed to parse Chroma response: {}", e))
        })?;

        // Chroma nests results per query embedding; we always send one
        let documents = response.documents.into_iter().next().unwrap_or_default();
        let mut metadatas = response
            .metadatas
            .and_then(|m| m.into_iter().next())
            .unwrap_or_default()
            .into_iter();
        let mut distances = response
            .distances
            .and_then(|d| d.into_iter().next())
            .unwrap_or_default()
            .into_iter();

        let passages = documents
            .into_iter()
            .map(|content| {
                let mut passage = Passage::new(content);
                if let Some(Some(metadata)) = metadatas.next() {
                    if let Some(source) = metadata.get("source").and_then(|v| v.as_str()) {
                        passage = passage.with_source(source);
                    }
                    passage.metadata = metadata;
                }
                if let Some(distance) = distances.next() {
                    passage = passage.with_score(distance);
                }
                passage
            })
            .collect::<Vec<_>>();

        debug!(query, results = passages.len(), "chroma search complete");
        Ok(passages)
    }

    fn retriever_name(&self) -> &'static str {
        "chroma"
    }
}

#[derive(Debug, Deserialize)]
struct ChromaQueryResponse {
    documents: Vec<Vec<String>>,
    metadatas: Option<Vec<Vec<Option<HashMap<String, serde_json::Value>>>>>,
    distances: Option<Vec<Vec<f32>>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::mock::MockEmbeddingProvider;
    use crate::infrastructure::http::mock::MockHttpClient;

    const TEST_URL: &str = "http://localhost:8000/api/v1/collections/nutrition/query";

    fn retriever(
        client: MockHttpClient,
    ) -> ChromaRetriever<MockHttpClient, MockEmbeddingProvider> {
        ChromaRetriever::new(
            client,
            Arc::new(MockEmbeddingProvider::new(vec![0.1, 0.2])),
            "http://localhost:8000",
            "nutrition",
        )
    }

    #[tokio::test]
    async fn test_search_maps_documents_to_passages() {
        let mock_response = serde_json::json!({
            "documents": [["Anorexia involves restriction.", "Bulimia involves purging."]],
            "metadatas": [[{"source": "handbook.pdf", "page": 3}, null]],
            "distances": [[0.12, 0.34]]
        });
        let client = MockHttpClient::new().with_response(TEST_URL, mock_response);
        let retriever = retriever(client);

        let passages = retriever.search("eating disorders", 5).await.unwrap();

        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].content, "Anorexia involves restriction.");
        assert_eq!(passages[0].source.as_deref(), Some("handbook.pdf"));
        assert_eq!(passages[0].score, Some(0.12));
        assert!(passages[1].source.is_none());
    }

    #[tokio::test]
    async fn test_request_carries_embedding_and_top_k() {
        let mock_response = serde_json::json!({"documents": [[]]});
        let client = MockHttpClient::new().with_response(TEST_URL, mock_response);
        let retriever = retriever(client);

        let passages = retriever.search("anything", 5).await.unwrap();
        assert!(passages.is_empty());

        let requests = retriever.client.requests();
        assert_eq!(requests[0].1["n_results"], 5);
        assert_eq!(requests[0].1["query_embeddings"][0][0], 0.1);
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let client = MockHttpClient::new();
        let retriever = ChromaRetriever::new(
            client,
            Arc::new(MockEmbeddingProvider::new(vec![]).with_error("quota exceeded")),
            "http://localhost:8000",
            "nutrition",
        );

        let result = retriever.search("x", 5).await;

        assert!(matches!(result, Err(AgentError::Retrieval { .. })));
    }

    #[tokio::test]
    async fn test_store_failure_is_retrieval_error() {
        let client = MockHttpClient::new().with_error(TEST_URL, "collection not found");
        let retriever = retriever(client);

        let result = retriever.search("x", 5).await;

        assert!(matches!(result, Err(AgentError::Retrieval { .. })));
    }
}
