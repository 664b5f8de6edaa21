//! In-process memory store for local runs and tests

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{AgentError, ConversationTurn, MemoryStore, PriorInteraction};

#[derive(Debug)]
struct StoredEntry {
    memory: String,
    metadata: HashMap<String, serde_json::Value>,
}

/// Keyword-overlap memory store held entirely in process.
///
/// Recall matches on shared lowercase words between query and stored text,
/// which is enough for single-process runs; hosted deployments use the
/// semantic search of [`super::HttpMemoryStore`].
#[derive(Debug, Default)]
pub struct InMemoryMemoryStore {
    entries: RwLock<HashMap<String, Vec<StoredEntry>>>,
}

impl InMemoryMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect()
}

#[async_trait]
impl MemoryStore for InMemoryMemoryStore {
    async fn search(
        &self,
        user_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PriorInteraction>, AgentError> {
        let query_words = words(query);
        let entries = self.entries.read().await;

        let matches = entries
            .get(user_id)
            .map(|stored| {
                stored
                    .iter()
                    .filter(|entry| {
                        let memory_words = words(&entry.memory);
                        query_words.iter().any(|w| memory_words.contains(w))
                    })
                    .take(limit)
                    .map(|entry| PriorInteraction {
                        memory: entry.memory.clone(),
                        metadata: entry.metadata.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(matches)
    }

    async fn add(
        &self,
        user_id: &str,
        turns: &[ConversationTurn],
        metadata: HashMap<String, serde_json::Value>,
    ) -> Result<(), AgentError> {
        let memory = turns
            .iter()
            .map(|t| format!("{}: {}", t.role, t.content))
            .collect::<Vec<_>>()
            .join("\n");

        self.entries
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push(StoredEntry { memory, metadata });

        Ok(())
    }
}
