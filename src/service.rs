//! Wires configuration, collaborator clients, and the location store into
//! a ready-to-serve [`LocationSearch`].

use std::sync::Arc;

use city_search::LocationSearch;

use crate::clients::{HttpTransliterator, OpenAiEmbedder, TypesenseBackend};
use crate::config::AppConfig;
use crate::error::Result;
use crate::store::SqliteLocationStore;

/// Build the search service described by `config`.
///
/// # Errors
///
/// Returns an error if a client cannot be built, the database cannot be
/// opened, or the search section is invalid.
pub fn build_search(config: &AppConfig) -> Result<LocationSearch> {
    let transliterator = HttpTransliterator::new(&config.transliterator)?;
    let embedder = OpenAiEmbedder::new(&config.embeddings)?;
    let backend = TypesenseBackend::new(&config.typesense)?;
    let store = SqliteLocationStore::open(&config.database.path)?;
    tracing::debug!(
        db = %config.database.path.display(),
        locations = store.count()?,
        "location store opened"
    );

    let search = LocationSearch::new(
        config.search.clone(),
        Arc::new(transliterator),
        Arc::new(embedder),
        Arc::new(backend),
        Arc::new(store),
    )?;
    Ok(search)
}
