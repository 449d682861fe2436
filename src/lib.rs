//! whereismycity: a location search API.
//!
//! The ranking pipeline lives in the `city-search` crate. This crate
//! supplies its collaborators (HTTP clients for the transliterator, the
//! embeddings API, and Typesense, plus a SQLite location store), the
//! service configuration, and the axum HTTP surface.

pub mod clients;
pub mod config;
pub mod error;
pub mod server;
pub mod service;
pub mod store;

pub use config::AppConfig;
pub use error::{Result, ServiceError};
pub use server::SearchServer;
pub use service::build_search;
pub use store::SqliteLocationStore;
