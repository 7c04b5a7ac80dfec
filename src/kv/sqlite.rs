//! SQLite-backed key-value store.
//!
//! Durable persistence for the row cache: a single `cache` table keyed
//! by blob. Writes are single-statement upserts, so a concurrent reader
//! sees the old value or the new one, never a torn write.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use crate::kv::KvStore;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS cache (
    key   BLOB PRIMARY KEY,
    value BLOB NOT NULL
)";

/// Durable store backed by a SQLite database file.
#[derive(Debug)]
pub struct SqliteKvStore {
    conn: Mutex<Connection>,
}

impl SqliteKvStore {
    /// Opens (or creates) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Opens a transient in-memory database.
    pub fn in_memory() -> anyhow::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl KvStore for SqliteKvStore {
    fn get(&self, key: &[u8]) -> anyhow::Result<Option<Vec<u8>>> {
        let conn = self.conn.lock();
        let value = conn
            .query_row("SELECT value FROM cache WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> anyhow::Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO cache (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key() {
        let store = SqliteKvStore::in_memory().unwrap();
        assert_eq!(store.get(b"absent").unwrap(), None);
    }

    #[test]
    fn test_put_and_get() {
        let store = SqliteKvStore::in_memory().unwrap();
        store.put(b"s3://bucket/log.json", b"value").unwrap();

        assert_eq!(
            store.get(b"s3://bucket/log.json").unwrap(),
            Some(b"value".to_vec())
        );
    }

    #[test]
    fn test_put_overwrites() {
        let store = SqliteKvStore::in_memory().unwrap();
        store.put(b"key", b"old").unwrap();
        store.put(b"key", b"new").unwrap();

        assert_eq!(store.get(b"key").unwrap(), Some(b"new".to_vec()));
    }

    #[test]
    fn test_keys_with_unusual_characters() {
        let store = SqliteKvStore::in_memory().unwrap();
        let key = "s3://bucket/path with spaces/ünïcode.json".as_bytes();
        store.put(key, b"value").unwrap();

        assert_eq!(store.get(key).unwrap(), Some(b"value".to_vec()));
    }
}
