//! In-memory storage, primarily for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{KvStorage, StorageError};

/// A [`KvStorage`] backed by a `HashMap`.
///
/// Contents do not survive the process. A `fail_writes` switch lets tests
/// exercise the best-effort persistence contract.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    fail_writes: Mutex<bool>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `set`/`remove` calls fail, simulating a broken medium.
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = fail;
    }

    fn writes_failing(&self) -> bool {
        *self
            .fail_writes
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl KvStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        if self.writes_failing() {
            return Err(StorageError::Backend("writes disabled".to_owned()));
        }
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.writes_failing() {
            return Err(StorageError::Backend("writes disabled".to_owned()));
        }
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}
