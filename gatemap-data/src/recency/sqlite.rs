//! SQLite-backed [`RecencyStore`].

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use gatemap_core::recency::push_unique;
use gatemap_core::{PlaceCandidate, RECENT_PLACES_KEY, RecencyError, RecencyStore};
use log::{debug, warn};
use rusqlite::{Connection, Error as SqliteError, OptionalExtension, params};
use thiserror::Error;

const CREATE_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS key_value (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
)";

/// Errors raised when opening a recency database.
#[derive(Debug, Error)]
pub enum RecencyStoreOpenError {
    /// Failed to create the parent directory for the database file.
    #[error("failed to create parent directory for {path}")]
    CreateParent {
        /// Database path whose parent could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the `SQLite` database failed.
    #[error("failed to open SQLite database at {path}")]
    OpenDatabase {
        /// Location of the database.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating the `key_value` table failed.
    #[error("failed to create key_value table")]
    InitialiseSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

/// Recent-places history persisted in `SQLite`.
///
/// Every mutation reads the stored list, applies the change and writes the
/// list back before returning. An absent key reads as an empty history.
///
/// # Examples
///
/// ```
/// use gatemap_core::{PlaceCandidate, RecencyStore};
/// use gatemap_data::SqliteRecencyStore;
///
/// let store = SqliteRecencyStore::open_in_memory().expect("open");
/// store.insert(&PlaceCandidate::new("p1", "Cafe")).expect("insert");
/// store.insert(&PlaceCandidate::new("p1", "Cafe")).expect("insert");
/// assert_eq!(store.list().expect("list").len(), 1);
/// ```
pub struct SqliteRecencyStore {
    connection: Connection,
    location: Option<Utf8PathBuf>,
    capacity: Option<usize>,
}

impl fmt::Debug for SqliteRecencyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteRecencyStore")
            .field("location", &self.location)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl SqliteRecencyStore {
    /// Open or create the database at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`RecencyStoreOpenError`] when the directory, the database or
    /// the schema cannot be created.
    pub fn open(path: &Utf8Path) -> Result<Self, RecencyStoreOpenError> {
        gatemap_fs::ensure_parent_dir(path).map_err(|source| {
            RecencyStoreOpenError::CreateParent {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let connection =
            Connection::open(path).map_err(|source| RecencyStoreOpenError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_connection(connection, Some(path.to_path_buf()))
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`RecencyStoreOpenError`] when `SQLite` cannot allocate the
    /// database.
    pub fn open_in_memory() -> Result<Self, RecencyStoreOpenError> {
        let connection =
            Connection::open_in_memory().map_err(|source| RecencyStoreOpenError::OpenDatabase {
                path: Utf8PathBuf::from(":memory:"),
                source,
            })?;
        Self::from_connection(connection, None)
    }

    fn from_connection(
        connection: Connection,
        location: Option<Utf8PathBuf>,
    ) -> Result<Self, RecencyStoreOpenError> {
        connection
            .execute(CREATE_SCHEMA, [])
            .map_err(|source| RecencyStoreOpenError::InitialiseSchema { source })?;
        debug!("opened recency store at {location:?}");
        Ok(Self {
            connection,
            location,
            capacity: None,
        })
    }

    /// Keep at most `capacity` entries, evicting the oldest first.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Database file backing the store; `None` for in-memory stores.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        self.location.as_deref()
    }

    fn load(&self) -> Result<Vec<PlaceCandidate>, RecencyError> {
        let stored: Option<String> = self
            .connection
            .query_row(
                "SELECT value FROM key_value WHERE key = ?1",
                params![RECENT_PLACES_KEY],
                |row| row.get(0),
            )
            .optional()
            .map_err(|source| storage_error("read", source))?;

        let Some(json) = stored else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&json).map_err(|source| {
            warn!("recent places blob under {RECENT_PLACES_KEY} failed to decode");
            RecencyError::Corrupt {
                key: RECENT_PLACES_KEY,
                source,
            }
        })
    }

    fn store(
        &self,
        entries: &[PlaceCandidate],
        operation: &'static str,
    ) -> Result<(), RecencyError> {
        let json =
            serde_json::to_string(entries).map_err(|source| storage_error(operation, source))?;
        self.connection
            .execute(
                "INSERT OR REPLACE INTO key_value (key, value) VALUES (?1, ?2)",
                params![RECENT_PLACES_KEY, json],
            )
            .map_err(|source| storage_error(operation, source))?;
        Ok(())
    }
}

fn storage_error<E>(operation: &'static str, source: E) -> RecencyError
where
    E: std::error::Error + Send + Sync + 'static,
{
    RecencyError::Storage {
        operation,
        source: Box::new(source),
    }
}

impl RecencyStore for SqliteRecencyStore {
    fn insert(&self, candidate: &PlaceCandidate) -> Result<bool, RecencyError> {
        let mut entries = self.load()?;
        if !push_unique(&mut entries, candidate, self.capacity) {
            debug!("place {} already in recent places", candidate.place_id());
            return Ok(false);
        }
        self.store(&entries, "insert")?;
        Ok(true)
    }

    fn list(&self) -> Result<Vec<PlaceCandidate>, RecencyError> {
        self.load()
    }

    fn clear(&self) -> Result<(), RecencyError> {
        self.store(&[], "clear")
    }
}
