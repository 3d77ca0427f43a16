//! Persistence provider contracts and implementations.
//!
//! # Responsibility
//! - Define the key-value boundary the note store persists through.
//! - Keep SQLite details out of store/service orchestration.
//!
//! # Invariants
//! - A provider stores opaque strings; it never interprets payloads.
//! - `set` is last-write-wins for the key.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryProvider;
pub use sqlite::SqliteProvider;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure raised by a persistence provider.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    /// Backend refused or could not serve the request.
    Unavailable(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable key-value storage used to survive restarts.
pub trait PersistenceProvider {
    /// Returns the stored value, or `None` when the key was never written.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}
