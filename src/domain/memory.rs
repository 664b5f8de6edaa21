//! Long-term per-user memory capability
//!
//! The agent layer recalls prior interactions relevant to the current query
//! and persists each completed turn. The store is an external collaborator;
//! the workflow core never touches it.

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::AgentError;

/// One side of a stored conversation turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: String,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// A prior interaction recalled from the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorInteraction {
    /// Stored memory text
    pub memory: String,
    /// Metadata recorded with the interaction
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl PriorInteraction {
    pub fn new(memory: impl Into<String>) -> Self {
        Self {
            memory: memory.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Trait for long-term per-user memory stores
#[async_trait]
pub trait MemoryStore: Send + Sync + Debug {
    /// Search prior interactions relevant to a query
    async fn search(
        &self,
        user_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PriorInteraction>, AgentError>;

    /// Persist a conversation turn with metadata
    async fn add(
        &self,
        user_id: &str,
        turns: &[ConversationTurn],
        metadata: HashMap<String, serde_json::Value>,
    ) -> Result<(), AgentError>;
}
