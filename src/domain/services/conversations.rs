#[cfg(test)]
#[path = "conversations_test.rs"]
mod tests;

use std::collections::HashSet;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use super::PersistedStore;
use crate::domain::models::Conversation;
use crate::domain::models::ConversationUpdate;
use crate::domain::models::StorageRef;

pub const CONVERSATIONS_KEY: &str = "ktg-one-conversations";
pub const ACTIVE_KEY: &str = "ktg-one-active-id";

/// Owns the list of chat conversations, most recently created first, and the
/// id of the one currently being viewed.
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    active_id: Option<String>,
    list_store: PersistedStore,
    active_store: PersistedStore,
}

impl ConversationStore {
    pub fn new(storage: StorageRef) -> ConversationStore {
        let list_store = PersistedStore::new(storage.clone(), CONVERSATIONS_KEY);
        let active_store = PersistedStore::new(storage, ACTIVE_KEY);

        let conversations = ConversationStore::load_conversations(&list_store);
        let stored_active_id = active_store.load_raw();
        let active_id = conversations
            .iter()
            .find(|conversation| return Some(&conversation.id) == stored_active_id.as_ref())
            .or_else(|| return conversations.first())
            .map(|conversation| return conversation.id.to_string());

        tracing::debug!(
            conversations = conversations.len(),
            active_id = ?active_id,
            "Loaded conversations"
        );

        return ConversationStore {
            conversations,
            active_id,
            list_store,
            active_store,
        };
    }

    fn load_conversations(list_store: &PersistedStore) -> Vec<Conversation> {
        let entries = match list_store.load(Value::Null) {
            Value::Array(entries) => entries,
            _ => return vec![],
        };

        let mut seen = HashSet::new();
        return entries
            .into_iter()
            .filter_map(Conversation::from_stored)
            .filter(|conversation| return seen.insert(conversation.id.to_string()))
            .collect();
    }

    pub fn create_id() -> String {
        return Uuid::new_v4().to_string();
    }

    fn persist(&self) {
        self.list_store.save(&self.conversations);
    }

    fn persist_active(&self) {
        match &self.active_id {
            Some(id) => self.active_store.save_raw(id),
            None => self.active_store.clear(),
        }
    }

    pub fn list(&self) -> &[Conversation] {
        return &self.conversations;
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        return self
            .conversations
            .iter()
            .find(|conversation| return conversation.id == id);
    }

    pub fn active_id(&self) -> Option<&str> {
        return self.active_id.as_deref();
    }

    pub fn active(&self) -> Option<&Conversation> {
        let active_id = self.active_id.as_deref()?;
        return self.get(active_id);
    }

    pub fn create(&mut self, model: &str) -> Conversation {
        let conversation = Conversation::new(
            &ConversationStore::create_id(),
            model,
            Utc::now().timestamp_millis(),
        );

        self.conversations.insert(0, conversation.clone());
        self.persist();
        self.set_active(&conversation.id);

        tracing::debug!(id = conversation.id, model = model, "Created conversation");
        return conversation;
    }

    pub fn update(&mut self, id: &str, update: ConversationUpdate) {
        let conversation = match self
            .conversations
            .iter_mut()
            .find(|conversation| return conversation.id == id)
        {
            Some(conversation) => conversation,
            None => {
                tracing::debug!(id = id, "Ignoring update for unknown conversation");
                return;
            }
        };

        update.apply(conversation);
        self.persist();
    }

    pub fn delete(&mut self, id: &str) {
        let before = self.conversations.len();
        self.conversations
            .retain(|conversation| return conversation.id != id);
        if self.conversations.len() != before {
            self.persist();
        }

        if self.active_id.as_deref() == Some(id) {
            self.active_id = self
                .conversations
                .first()
                .map(|conversation| return conversation.id.to_string());
            self.persist_active();
        }

        tracing::debug!(id = id, active_id = ?self.active_id, "Deleted conversation");
    }

    /// Points the store at `id` without touching the collection. The id does
    /// not have to exist yet.
    pub fn set_active(&mut self, id: &str) {
        self.active_id = Some(id.to_string());
        self.persist_active();
    }
}
