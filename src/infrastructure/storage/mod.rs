pub mod file;
pub mod memory;

use std::path;
use std::sync::Arc;

use anyhow::Result;

use crate::domain::models::StorageName;
use crate::domain::models::StorageRef;

pub struct StorageManager {}

impl StorageManager {
    pub fn get(name: StorageName, dir: path::PathBuf) -> Result<StorageRef> {
        let storage: StorageRef = match name {
            StorageName::File => Arc::new(file::FileStorage::new(dir.clone())),
            StorageName::Memory => Arc::new(memory::MemoryStorage::default()),
        };

        tracing::debug!(storage = storage.name().to_string(), dir = ?dir, "Opened storage");
        return Ok(storage);
    }
}
