#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;

use anyhow::Result;
use dashmap::DashMap;

use crate::domain::models::KeyValueStore;
use crate::domain::models::StorageName;

/// Storage that lives for the process only. Used for dry runs and tests.
#[derive(Default)]
pub struct MemoryStorage {
    entries: DashMap<String, String>,
}

impl KeyValueStore for MemoryStorage {
    fn name(&self) -> StorageName {
        return StorageName::Memory;
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        return Ok(self.entries.get(key).map(|entry| return entry.to_string()));
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        return Ok(());
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        return Ok(());
    }
}
