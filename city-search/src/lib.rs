//! # city-search
//!
//! Hybrid location search for whereismycity.
//!
//! Given a free-text query, this crate produces a ranked list of locations
//! by combining semantic (vector) similarity and lexical (text) matching
//! across the original query and a transliterated variant. It does not
//! index documents or compute embeddings: the transliterator, embedder,
//! search engine, and location store are external collaborators injected
//! through the traits in [`backend`].
//!
//! ## Pipeline
//!
//! 1. Normalise the query ([`normalize()`])
//! 2. Transliterate and embed it concurrently
//! 3. Fan out two sub-queries (normalised + transliterated text, one shared
//!    embedding) and merge hits by location id
//! 4. Fuse vector distance and text-match score into one score
//! 5. Fetch canonical records, sort by fusion score, truncate
//!
//! The whole pipeline runs under one deadline. Partial sub-query failures
//! are tolerated as long as one sub-query succeeds.
//!
//! ## Logging
//!
//! Raw queries are logged only at trace level.

pub mod backend;
pub mod config;
pub mod error;
pub mod normalize;
pub mod orchestrator;
pub mod types;

pub use backend::{Embedder, LocationStore, SearchBackend, Transliterator};
pub use config::{FusionWeights, SearchConfig};
pub use error::{Result, SearchError};
pub use normalize::normalize;
pub use orchestrator::search::LocationSearch;
pub use types::{
    Embedding, FusedCandidate, Location, LocationFilter, RankedResult, SearchHit, SubQuery,
    SubQueryFailure, SubQueryOutcome,
};
