#[cfg(test)]
#[path = "persisted_test.rs"]
mod tests;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::models::StorageRef;

/// A single namespaced value in the profile's storage.
///
/// Reads and writes never fail from the caller's point of view: anything
/// missing, unreadable or unparsable loads as the caller's default, and write
/// failures are logged and dropped.
pub struct PersistedStore {
    storage: StorageRef,
    key: String,
}

impl PersistedStore {
    pub fn new(storage: StorageRef, key: &str) -> PersistedStore {
        return PersistedStore {
            storage,
            key: key.to_string(),
        };
    }

    pub fn key(&self) -> &str {
        return &self.key;
    }

    pub fn load_raw(&self) -> Option<String> {
        match self.storage.get(&self.key) {
            Ok(value) => return value,
            Err(err) => {
                tracing::warn!(key = self.key, error = ?err, "Failed to read from storage");
                return None;
            }
        }
    }

    pub fn load<T: DeserializeOwned>(&self, default: T) -> T {
        let payload = match self.load_raw() {
            Some(payload) => payload,
            None => return default,
        };

        match serde_json::from_str::<T>(&payload) {
            Ok(value) => return value,
            Err(err) => {
                tracing::warn!(key = self.key, error = ?err, "Discarding unparsable stored value");
                return default;
            }
        }
    }

    pub fn save_raw(&self, payload: &str) {
        if let Err(err) = self.storage.set(&self.key, payload) {
            tracing::warn!(key = self.key, error = ?err, "Failed to write to storage");
        }
    }

    pub fn save<T: Serialize>(&self, value: &T) {
        match serde_json::to_string(value) {
            Ok(payload) => self.save_raw(&payload),
            Err(err) => {
                tracing::warn!(key = self.key, error = ?err, "Failed to serialize value for storage");
            }
        }
    }

    pub fn clear(&self) {
        if let Err(err) = self.storage.remove(&self.key) {
            tracing::warn!(key = self.key, error = ?err, "Failed to remove from storage");
        }
    }
}
