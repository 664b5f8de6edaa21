//! LLM generation capability: message types, request/response, provider trait

mod message;
mod provider;
mod request;
mod response;

pub use message::{Message, MessageRole};
pub use provider::LlmProvider;
pub use request::{LlmRequest, LlmRequestBuilder};
pub use response::{LlmResponse, Usage};

#[cfg(test)]
pub use provider::mock::MockLlmProvider;
