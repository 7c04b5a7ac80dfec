//! In-memory key-value store.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::kv::KvStore;

/// HashMap-backed store for tests and short-lived runs.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryKvStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &[u8]) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> anyhow::Result<()> {
        self.entries.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key() {
        let store = MemoryKvStore::new();
        assert_eq!(store.get(b"absent").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_put_and_get() {
        let store = MemoryKvStore::new();
        store.put(b"key", b"value").unwrap();

        assert_eq!(store.get(b"key").unwrap(), Some(b"value".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_put_overwrites() {
        let store = MemoryKvStore::new();
        store.put(b"key", b"old").unwrap();
        store.put(b"key", b"new").unwrap();

        assert_eq!(store.get(b"key").unwrap(), Some(b"new".to_vec()));
        assert_eq!(store.len(), 1);
    }
}
