//! HTTP clients for the external collaborators of the search pipeline.
//!
//! - [`HttpTransliterator`]: transliteration service
//! - [`OpenAiEmbedder`]: OpenAI-compatible embeddings API
//! - [`TypesenseBackend`]: Typesense `multi_search`

pub mod embeddings;
pub mod http;
pub mod transliterator;
pub mod typesense;

pub use embeddings::OpenAiEmbedder;
pub use transliterator::HttpTransliterator;
pub use typesense::TypesenseBackend;
