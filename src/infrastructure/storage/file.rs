#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

use std::fs;
use std::io::ErrorKind;
use std::path;

use anyhow::Result;

use crate::domain::models::KeyValueStore;
use crate::domain::models::StorageName;

/// Keeps every key as its own `<key>.json` file inside a profile directory.
pub struct FileStorage {
    pub dir: path::PathBuf,
}

impl FileStorage {
    pub fn new(dir: path::PathBuf) -> FileStorage {
        return FileStorage { dir };
    }

    fn get_file_path(&self, key: &str) -> path::PathBuf {
        let file_name = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    return c;
                }
                return '_';
            })
            .collect::<String>();

        return self.dir.join(format!("{file_name}.json"));
    }
}

impl KeyValueStore for FileStorage {
    fn name(&self) -> StorageName {
        return StorageName::File;
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let file_path = self.get_file_path(key);
        if !file_path.exists() {
            return Ok(None);
        }

        let payload = fs::read_to_string(file_path)?;
        return Ok(Some(payload));
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }

        fs::write(self.get_file_path(key), value)?;
        tracing::debug!(key = key, bytes = value.len(), "Wrote storage key");

        return Ok(());
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.get_file_path(key)) {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        }
    }
}
