pub mod http;
pub mod in_memory;

pub use http::HttpMemoryStore;
pub use in_memory::InMemoryMemoryStore;
