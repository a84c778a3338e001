//! Storage layer for errortodos.
//!
//! This module provides `SQLite`-backed persistent storage for the tracker's
//! documents. Each [`StorageKey`] maps to exactly one JSON document; writes
//! replace the whole document in a single statement, so a reader never
//! observes a half-applied change.

pub mod migrations;
pub mod schema;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// How long a writer waits for another process to release the database.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// The documents persisted by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// The signed-in account, without credentials.
    CurrentUser,
    /// Every registered account, with credentials.
    Users,
    /// Every error record, for all owners.
    ErrorTodos,
}

impl StorageKey {
    /// The key as stored in the entries table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CurrentUser => "currentUser",
            Self::Users => "users",
            Self::ErrorTodos => "errorTodos",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value document store.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the document stored under `key`.
    ///
    /// Returns `None` when nothing has been written under the key yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored JSON does not
    /// decode as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };
        let value = serde_json::from_str(&raw).map_err(|source| Error::CorruptEntry {
            key: key.as_str(),
            source,
        })?;
        Ok(Some(value))
    }

    /// Read a collection document, treating an absent key as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored JSON is not a
    /// sequence of `T`.
    pub fn get_collection<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Vec<T>> {
        Ok(self.get(key)?.unwrap_or_default())
    }

    /// Replace the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the write fails.
    pub fn put<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.conn.execute(
            r"
            INSERT INTO entries (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key.as_str(), raw, Utc::now().to_rfc3339()],
        )?;
        debug!("Wrote {} ({} bytes)", key, raw.len());
        Ok(())
    }

    /// Read a collection, change it with `f`, and write it back.
    ///
    /// The read and the write happen inside one `IMMEDIATE` transaction, so
    /// concurrent writers on the same database file are serialized and no
    /// change is lost. If `f` returns an error, nothing is written.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or a storage error if the transaction,
    /// read, or write fails.
    pub fn update_collection<T, R, F>(&self, key: StorageKey, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> Result<R>,
    {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;

        let mut items: Vec<T> = self.get_collection(key)?;
        let result = f(&mut items)?;
        self.put(key, &items)?;

        tx.commit()?;
        Ok(result)
    }

    /// Remove the document stored under `key`.
    ///
    /// Returns `true` if a document was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove(&self, key: StorageKey) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM entries WHERE key = ?1", [key.as_str()])?;
        debug!("Removed {} ({} rows)", key, affected);
        Ok(affected > 0)
    }

    fn get_raw(&self, key: StorageKey) -> Result<Option<String>> {
        let raw = self
            .conn
            .query_row(
                "SELECT value FROM entries WHERE key = ?1",
                [key.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        debug!("Read {} (present: {})", key, raw.is_some());
        Ok(raw)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let entries: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            entries,
            db_size_bytes,
        })
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of documents stored.
    pub entries: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
