//! In-process provider.
//!
//! Clones share one map, so a second store built from a clone sees what the
//! first one wrote (same as two tabs over one browser store).

use super::{PersistenceProvider, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider pre-seeded with one raw entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let provider = Self::new();
        if let Ok(mut entries) = provider.entries.lock() {
            entries.insert(key.into(), value.into());
        }
        provider
    }
}

impl PersistenceProvider for MemoryProvider {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory provider lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory provider lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
