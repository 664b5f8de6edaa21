//! Concrete adapters for the domain capability traits

pub mod guardrail;
pub mod http;
pub mod llm;
pub mod logging;
pub mod memory;
pub mod retrieval;

pub use guardrail::LlamaGuardClassifier;
pub use http::{HttpClient, HttpClientTrait};
pub use llm::{OpenAiEmbeddings, OpenAiProvider};
pub use logging::init_logging;
pub use memory::{HttpMemoryStore, InMemoryMemoryStore};
pub use retrieval::ChromaRetriever;
