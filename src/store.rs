//! SQLite-backed location store.
//!
//! Holds the canonical `locations` table the search pipeline reads
//! records from after ranking. Queries run on the blocking thread pool.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};

use city_search::{Location, LocationFilter, LocationStore, SearchError};

use crate::error::ServiceError;

/// DDL for the location database. Idempotent.
const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS locations (
    id      INTEGER PRIMARY KEY,
    city    TEXT NOT NULL,
    state   TEXT NOT NULL DEFAULT '',
    country TEXT NOT NULL DEFAULT '',
    code    TEXT NOT NULL DEFAULT '',  -- ISO country code
    lat     REAL NOT NULL,
    lng     REAL NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_locations_country ON locations(country);
"#;

const SELECT_COLUMNS: &str = "SELECT id, city, state, country, code, lat, lng FROM locations";

/// SQLite implementation of [`LocationStore`].
///
/// Cheap to clone; the connection is shared behind a mutex.
#[derive(Clone)]
pub struct SqliteLocationStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteLocationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteLocationStore").finish_non_exhaustive()
    }
}

impl SqliteLocationStore {
    /// Open (or create) the database at `path` and apply the schema.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the database cannot be opened.
    pub fn open(path: &Path) -> Result<Self, ServiceError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(store_error)?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, ServiceError> {
        let conn = Connection::open_in_memory().map_err(store_error)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, ServiceError> {
        conn.execute_batch(SCHEMA_SQL).map_err(store_error)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert or replace a batch of locations in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] on any SQLite failure.
    pub fn insert(&self, locations: &[Location]) -> Result<usize, ServiceError> {
        let mut conn = self.lock().map_err(|e| ServiceError::Store(e.to_string()))?;
        let tx = conn.transaction().map_err(store_error)?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO locations (id, city, state, country, code, lat, lng) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .map_err(store_error)?;
            for l in locations {
                stmt.execute(params![l.id, l.city, l.state, l.country, l.code, l.lat, l.lng])
                    .map_err(store_error)?;
            }
        }
        tx.commit().map_err(store_error)?;
        Ok(locations.len())
    }

    /// Number of stored locations.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] on any SQLite failure.
    pub fn count(&self) -> Result<usize, ServiceError> {
        let conn = self.lock().map_err(|e| ServiceError::Store(e.to_string()))?;
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM locations", [], |row| row.get(0))
            .map_err(store_error)?;
        Ok(usize::try_from(n).unwrap_or(0))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SearchError> {
        self.conn
            .lock()
            .map_err(|e| SearchError::LocationStoreUnavailable(format!("lock poisoned: {e}")))
    }
}

fn store_error(e: rusqlite::Error) -> ServiceError {
    ServiceError::Store(e.to_string())
}

/// Build the lookup query and its bound parameters.
fn build_query(ids: &[i64], filter: &LocationFilter, limit: usize) -> (String, Vec<Value>) {
    let placeholders = vec!["?"; ids.len()].join(", ");
    let mut sql = format!("{SELECT_COLUMNS} WHERE id IN ({placeholders})");
    let mut values: Vec<Value> = ids.iter().map(|&id| Value::Integer(id)).collect();

    if let Some(country) = &filter.country {
        sql.push_str(" AND country = ?");
        values.push(Value::Text(country.clone()));
    }

    sql.push_str(" LIMIT ?");
    values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
    (sql, values)
}

fn row_to_location(row: &rusqlite::Row<'_>) -> rusqlite::Result<Location> {
    Ok(Location {
        id: row.get(0)?,
        city: row.get(1)?,
        state: row.get(2)?,
        country: row.get(3)?,
        code: row.get(4)?,
        lat: row.get(5)?,
        lng: row.get(6)?,
    })
}

fn query_locations(
    conn: &Connection,
    ids: &[i64],
    filter: &LocationFilter,
    limit: usize,
) -> rusqlite::Result<Vec<Location>> {
    let (sql, values) = build_query(ids, filter, limit);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), row_to_location)?;
    rows.collect()
}

#[async_trait]
impl LocationStore for SqliteLocationStore {
    async fn find_by_ids(
        &self,
        ids: &[i64],
        filter: &LocationFilter,
        limit: usize,
    ) -> Result<Vec<Location>, SearchError> {
        if ids.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let store = self.clone();
        let ids = ids.to_vec();
        let filter = filter.clone();
        let locations = tokio::task::spawn_blocking(move || {
            let conn = store.lock()?;
            query_locations(&conn, &ids, &filter, limit)
                .map_err(|e| SearchError::LocationStoreUnavailable(e.to_string()))
        })
        .await
        .map_err(|e| SearchError::LocationStoreUnavailable(format!("lookup task failed: {e}")))??;

        tracing::debug!(found = locations.len(), "locations fetched");
        Ok(locations)
    }
}
