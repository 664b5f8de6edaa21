//! Domain layer: capability traits, entities and the error taxonomy
//!
//! Everything here is I/O-free; concrete providers live under
//! `crate::infrastructure`.

pub mod embedding;
pub mod error;
pub mod guardrail;
pub mod llm;
pub mod memory;
pub mod prompt;
pub mod retrieval;

pub use embedding::EmbeddingProvider;
pub use error::AgentError;
pub use guardrail::{SafetyClassifier, SafetyVerdict};
pub use llm::{LlmProvider, LlmRequest, LlmResponse, Message, MessageRole, Usage};
pub use memory::{ConversationTurn, MemoryStore, PriorInteraction};
pub use prompt::{PromptTemplate, TemplateError};
pub use retrieval::{Passage, Retriever};
