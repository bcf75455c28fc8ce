use std::env;
use std::fs;
use std::path;

use anyhow::Result;
use uuid::Uuid;

use super::FileStorage;
use crate::domain::models::KeyValueStore;
use crate::domain::models::StorageName;

fn temp_dir() -> path::PathBuf {
    return env::temp_dir().join(format!("ktg-hub-test-{}", Uuid::new_v4()));
}

#[test]
fn it_is_named_file() {
    assert_eq!(FileStorage::new(temp_dir()).name(), StorageName::File);
}

#[test]
fn it_returns_none_without_a_directory() -> Result<()> {
    let storage = FileStorage::new(temp_dir());
    assert_eq!(storage.get("ktg-one-conversations")?, None);
    return Ok(());
}

#[test]
fn it_writes_one_file_per_key() -> Result<()> {
    let dir = temp_dir();
    let storage = FileStorage::new(dir.clone());
    storage.set("ktg-one-conversations", "[]")?;
    storage.set("ktg-ai-hub", "{}")?;

    assert!(dir.join("ktg-one-conversations.json").exists());
    assert!(dir.join("ktg-ai-hub.json").exists());
    assert_eq!(storage.get("ktg-one-conversations")?, Some("[]".to_string()));

    fs::remove_dir_all(dir)?;
    return Ok(());
}

#[test]
fn it_sanitizes_keys() -> Result<()> {
    let dir = temp_dir();
    let storage = FileStorage::new(dir.clone());
    storage.set("../escape/attempt", "x")?;

    assert!(dir.join(".._escape_attempt.json").exists());
    assert_eq!(storage.get("../escape/attempt")?, Some("x".to_string()));

    fs::remove_dir_all(dir)?;
    return Ok(());
}

#[test]
fn it_survives_a_new_instance() -> Result<()> {
    let dir = temp_dir();
    FileStorage::new(dir.clone()).set("key", "persisted")?;

    let reopened = FileStorage::new(dir.clone());
    assert_eq!(reopened.get("key")?, Some("persisted".to_string()));

    reopened.remove("key")?;
    assert_eq!(reopened.get("key")?, None);
    reopened.remove("key")?;

    fs::remove_dir_all(dir)?;
    return Ok(());
}
