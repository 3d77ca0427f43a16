//! SQLite-backed key-value provider.
//!
//! # Invariants
//! - Requires a migrated connection that exposes `kv_entries(key, value)`.
//! - `set` is an upsert and refreshes `updated_at`.

use super::{PersistenceProvider, StorageError, StorageResult};
use crate::db::{open_db, open_db_in_memory};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

pub struct SqliteProvider {
    conn: Connection,
}

impl SqliteProvider {
    /// Wraps a migrated connection after verifying the entry table exists.
    pub fn try_new(conn: Connection) -> StorageResult<Self> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = 'kv_entries'
            );",
            [],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(StorageError::Unavailable(
                "missing required table `kv_entries`".to_string(),
            ));
        }
        Ok(Self { conn })
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::try_new(open_db(path)?)
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }
}

impl PersistenceProvider for SqliteProvider {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteProvider;
    use crate::storage::PersistenceProvider;

    #[test]
    fn get_returns_none_for_unknown_key() {
        let provider = SqliteProvider::open_in_memory().unwrap();
        assert_eq!(provider.get("missing").unwrap(), None);
    }

    #[test]
    fn set_overwrites_previous_value() {
        let provider = SqliteProvider::open_in_memory().unwrap();
        provider.set("k", "one").unwrap();
        provider.set("k", "two").unwrap();
        assert_eq!(provider.get("k").unwrap().as_deref(), Some("two"));
    }
}
