use std::sync::Arc;

use anyhow::Result;
use strum::EnumVariantNames;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumVariantNames, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum StorageName {
    File,
    Memory,
}

impl StorageName {
    pub fn parse(text: String) -> Option<StorageName> {
        return text.parse::<StorageName>().ok();
    }
}

/// Durable string-keyed storage shared by every store in a profile. Each store
/// only ever writes under its own keys.
pub trait KeyValueStore {
    fn name(&self) -> StorageName;

    /// Returns `None` when nothing has been written under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrites whatever was previously stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

pub type StorageRef = Arc<dyn KeyValueStore + Send + Sync>;
