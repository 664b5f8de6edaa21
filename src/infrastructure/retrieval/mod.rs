pub mod chroma;

pub use chroma::ChromaRetriever;
