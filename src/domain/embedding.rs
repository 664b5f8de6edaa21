//! Embedding capability trait

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::AgentError;

/// Trait for text embedding providers
///
/// Consumed by vector-store retrievers that need a query embedding; how the
/// vectors are produced is opaque to the agent.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Embed a single text into a dense vector
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AgentError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
