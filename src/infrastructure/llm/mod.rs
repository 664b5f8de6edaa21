pub mod embeddings;
pub mod openai;

pub use embeddings::OpenAiEmbeddings;
pub use openai::OpenAiProvider;
