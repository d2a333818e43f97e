//! Best-effort snapshot helpers.
//!
//! Writes never fail the caller and unreadable snapshots behave as if absent;
//! the in-memory record stays authoritative either way.

use serde::{de::DeserializeOwned, Serialize};

use super::KeyValueStore;

/// Serializes `value` under `key`. Returns whether the write landed.
pub fn save_snapshot<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> bool {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(err) => {
            tracing::warn!(key, error = %err, "failed to serialize snapshot");
            return false;
        }
    };
    match store.set(key, &json) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(key, error = %err, "failed to persist snapshot");
            false
        }
    }
}

/// Reads the snapshot under `key`; absent, unreadable or corrupt data yields `None`.
pub fn load_snapshot<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(key, error = %err, "failed to read snapshot");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, error = %err, "ignoring corrupt snapshot");
            None
        }
    }
}

pub fn clear_snapshot(store: &dyn KeyValueStore, key: &str) {
    if let Err(err) = store.remove(key) {
        tracing::warn!(key, error = %err, "failed to clear snapshot");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FunnelData, Service};
    use crate::storage::MemoryStore;

    #[test]
    fn snapshot_round_trips() {
        let store = MemoryStore::new();
        let data = FunnelData {
            service: Some(Service::Ppf),
            make: Some("Porsche".into()),
            ..FunnelData::default()
        };
        assert!(save_snapshot(&store, "lead", &data));
        assert_eq!(load_snapshot::<FunnelData>(&store, "lead"), Some(data));
    }

    #[test]
    fn corrupt_snapshot_is_treated_as_absent() {
        let store = MemoryStore::new();
        store.set("lead", "{not json").unwrap();
        assert_eq!(load_snapshot::<FunnelData>(&store, "lead"), None);
    }
}
