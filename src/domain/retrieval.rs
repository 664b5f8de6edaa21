//! Retrieval capability: passage entity and retriever trait

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::AgentError;

/// A passage retrieved from the vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    /// Raw passage text
    pub content: String,
    /// Source metadata (document, page, section, ...)
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Source reference, if the store tracks one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Similarity score reported by the store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Passage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
            source: None,
            score: None,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }
}

/// Join passage contents into a single context block for prompting
pub fn join_contents(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| p.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Trait for similarity-search retrieval over a document store
///
/// An empty result set is a valid success; downstream generation must cope
/// with zero context.
#[async_trait]
pub trait Retriever: Send + Sync + Debug {
    /// Retrieve the top-k passages most similar to the query
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Passage>, AgentError>;

    /// Get the retriever backend name
    fn retriever_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Mock retriever returning fixed passages and recording queries
    #[derive(Debug)]
    pub struct MockRetriever {
        results: Vec<Passage>,
        error: Option<String>,
        queries: Mutex<Vec<String>>,
        search_count: AtomicUsize,
    }

    impl MockRetriever {
        pub fn new() -> Self {
            Self {
                results: Vec::new(),
                error: None,
                queries: Mutex::new(Vec::new()),
                search_count: AtomicUsize::new(0),
            }
        }

        /// Fixed passages returned for every search
        pub fn with_results(mut self, results: Vec<Passage>) -> Self {
            self.results = results;
            self
        }

        /// Fail every search with a retrieval error
        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn search_count(&self) -> usize {
            self.search_count.load(Ordering::SeqCst)
        }

        /// Queries seen so far, in order
        pub fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    impl Default for MockRetriever {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl Retriever for MockRetriever {
        async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Passage>, AgentError> {
            self.search_count.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.to_string());

            if let Some(ref error) = self.error {
                return Err(AgentError::retrieval(error.clone()));
            }

            Ok(self.results.iter().take(top_k).cloned().collect())
        }

        fn retriever_name(&self) -> &'static str {
            "mock"
        }
    }
}
