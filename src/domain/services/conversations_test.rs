use std::sync::Arc;

use anyhow::Result;
use test_utils::legacy_conversations_fixture;

use super::ConversationStore;
use super::ACTIVE_KEY;
use super::CONVERSATIONS_KEY;
use crate::domain::models::ConversationUpdate;
use crate::domain::models::KeyValueStore;
use crate::domain::models::Message;
use crate::domain::models::Role;
use crate::domain::models::StorageRef;
use crate::domain::models::DEFAULT_TITLE;
use crate::infrastructure::storage::memory::MemoryStorage;

fn memory() -> StorageRef {
    return Arc::new(MemoryStorage::default());
}

#[test]
fn it_starts_empty() {
    let store = ConversationStore::new(memory());
    assert!(store.list().is_empty());
    assert!(store.active().is_none());
    assert!(store.active_id().is_none());
}

#[test]
fn it_creates_and_updates_a_conversation() {
    let mut store = ConversationStore::new(memory());
    let created = store.create("model-A");

    assert_eq!(created.title, DEFAULT_TITLE);
    assert!(created.messages.is_empty());
    assert_eq!(created.model, "model-A");
    assert!(created.created_at > 0);

    store.update(
        &created.id,
        ConversationUpdate::default()
            .title("Hello world")
            .messages(vec![Message::user("Hello world")]),
    );

    assert_eq!(store.list()[0].title, "Hello world");
    assert_eq!(store.list()[0].messages[0].role, Role::User);
    assert_eq!(store.list()[0].messages[0].content, "Hello world");
}

#[test]
fn it_prepends_new_conversations() {
    let mut store = ConversationStore::new(memory());
    store.create("m1");
    let second = store.create("m2");

    assert_eq!(store.list().len(), 2);
    assert_eq!(store.list()[0].model, "m2");
    assert_eq!(store.list()[1].model, "m1");
    assert_eq!(store.list()[0].id, second.id);
}

#[test]
fn it_activates_created_conversations() {
    let mut store = ConversationStore::new(memory());
    let first = store.create("m1");
    assert_eq!(store.active_id(), Some(first.id.as_str()));

    let second = store.create("m2");
    assert_eq!(store.active().unwrap().id, second.id);
}

#[test]
fn it_generates_unique_ids() {
    let mut store = ConversationStore::new(memory());
    let ids = (0..20)
        .map(|_| return store.create("m").id)
        .collect::<std::collections::HashSet<String>>();

    assert_eq!(ids.len(), 20);
}

#[test]
fn it_ignores_updates_to_unknown_ids() {
    let mut store = ConversationStore::new(memory());
    let created = store.create("m1");
    store.update("missing", ConversationUpdate::default().title("Nope"));

    assert_eq!(store.list().len(), 1);
    assert_eq!(store.list()[0], created);
}

#[test]
fn it_moves_active_to_head_when_deleting_active() {
    let mut store = ConversationStore::new(memory());
    let first = store.create("m1");
    let second = store.create("m2");
    let third = store.create("m3");

    store.delete(&third.id);
    assert_eq!(store.active_id(), Some(second.id.as_str()));

    store.set_active(&first.id);
    store.delete(&first.id);
    assert_eq!(store.active_id(), Some(second.id.as_str()));

    store.delete(&second.id);
    assert!(store.list().is_empty());
    assert!(store.active_id().is_none());
    assert!(store.active().is_none());
}

#[test]
fn it_keeps_active_when_deleting_another() {
    let mut store = ConversationStore::new(memory());
    let first = store.create("m1");
    let second = store.create("m2");

    store.delete(&first.id);
    assert_eq!(store.active_id(), Some(second.id.as_str()));
    assert_eq!(store.list().len(), 1);

    store.delete("missing");
    assert_eq!(store.active_id(), Some(second.id.as_str()));
    assert_eq!(store.list().len(), 1);
}

#[test]
fn it_sets_active_before_the_conversation_exists() {
    let mut store = ConversationStore::new(memory());
    store.create("m1");
    store.set_active("not-yet-created");

    assert_eq!(store.active_id(), Some("not-yet-created"));
    assert!(store.active().is_none());
    assert_eq!(store.list().len(), 1);
}

#[test]
fn it_reflects_create_update_delete_sequences() {
    let mut store = ConversationStore::new(memory());
    let a = store.create("a");
    let b = store.create("b");
    let c = store.create("c");

    store.update(&a.id, ConversationUpdate::default().title("A1"));
    store.update(&c.id, ConversationUpdate::default().title("C1"));
    store.delete(&b.id);
    store.update(&a.id, ConversationUpdate::default().title("A2"));
    let d = store.create("d");

    let titles = store
        .list()
        .iter()
        .map(|conversation| return (conversation.id.to_string(), conversation.title.to_string()))
        .collect::<Vec<(String, String)>>();

    assert_eq!(
        titles,
        vec![
            (d.id, DEFAULT_TITLE.to_string()),
            (c.id, "C1".to_string()),
            (a.id, "A2".to_string()),
        ]
    );
}

#[test]
fn it_reloads_from_storage() {
    let storage = memory();
    let mut store = ConversationStore::new(storage.clone());
    let first = store.create("m1");
    let second = store.create("m2");
    store.set_active(&first.id);
    store.update(
        &second.id,
        ConversationUpdate::default().messages(vec![Message::user("Hi"), Message::assistant("Hello")]),
    );

    let reloaded = ConversationStore::new(storage);
    assert_eq!(reloaded.list(), store.list());
    assert_eq!(reloaded.active_id(), Some(first.id.as_str()));
}

#[test]
fn it_falls_back_to_head_for_stale_active_id() -> Result<()> {
    let storage = memory();
    let mut store = ConversationStore::new(storage.clone());
    let first = store.create("m1");
    storage.set(ACTIVE_KEY, "gone")?;

    let reloaded = ConversationStore::new(storage);
    assert_eq!(reloaded.active_id(), Some(first.id.as_str()));
    return Ok(());
}

#[test]
fn it_clears_persisted_active_id_when_empty() -> Result<()> {
    let storage = memory();
    let mut store = ConversationStore::new(storage.clone());
    let created = store.create("m1");
    assert_eq!(storage.get(ACTIVE_KEY)?, Some(created.id.to_string()));

    store.delete(&created.id);
    assert_eq!(storage.get(ACTIVE_KEY)?, None);
    assert_eq!(storage.get(CONVERSATIONS_KEY)?, Some("[]".to_string()));
    return Ok(());
}

#[test]
fn it_loads_empty_from_corrupt_storage() -> Result<()> {
    let storage = memory();
    storage.set(CONVERSATIONS_KEY, "definitely not json")?;
    assert!(ConversationStore::new(storage.clone()).list().is_empty());

    storage.set(CONVERSATIONS_KEY, r#"{"id":"not-a-list"}"#)?;
    assert!(ConversationStore::new(storage).list().is_empty());
    return Ok(());
}

#[test]
fn it_normalizes_legacy_conversations() -> Result<()> {
    let storage = memory();
    storage.set(CONVERSATIONS_KEY, legacy_conversations_fixture())?;

    let store = ConversationStore::new(storage);
    let list = store.list();

    assert_eq!(list.len(), 2);
    assert_eq!(list[0].id, "c-2");
    assert_eq!(list[0].title, "Explain RAG");
    assert_eq!(list[0].messages[0].content, "Explain RAG");
    assert_eq!(list[0].messages[1].role, Role::Assistant);
    assert_eq!(list[1].id, "c-1");
    assert_eq!(list[1].title, DEFAULT_TITLE);
    assert!(list[1].messages.is_empty());
    assert_eq!(store.active_id(), Some("c-2"));

    return Ok(());
}
