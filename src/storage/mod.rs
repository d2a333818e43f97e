//! Durable key-value storage for the in-progress funnel snapshot.

pub mod json_backend;
pub mod persistence;

use std::collections::HashMap;
use std::sync::Mutex;

use crate::errors::{FunnelError, Result};

/// Minimal string store keyed by name, mirroring a browser's local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local store used when auto-save is disabled and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| FunnelError::Storage("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

pub use json_backend::JsonFileStore;
pub use persistence::{clear_snapshot, load_snapshot, save_snapshot};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("lead").unwrap(), None);
        store.set("lead", "{}").unwrap();
        assert_eq!(store.get("lead").unwrap().as_deref(), Some("{}"));
        store.remove("lead").unwrap();
        assert_eq!(store.get("lead").unwrap(), None);
    }
}
