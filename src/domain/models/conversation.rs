#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;
use serde_json::Value;

use super::deserialize_messages;
use super::Message;
use super::Role;

pub const DEFAULT_TITLE: &str = "New conversation";
const TITLE_MAX_CHARS: usize = 40;

fn default_title() -> String {
    return DEFAULT_TITLE.to_string();
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_messages")]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub created_at: i64,
}

impl Conversation {
    pub fn new(id: &str, model: &str, created_at: i64) -> Conversation {
        return Conversation {
            id: id.to_string(),
            title: default_title(),
            messages: vec![],
            model: model.to_string(),
            created_at,
        };
    }

    /// Parses a single stored entry, repairing the fields older versions left
    /// malformed. Returns `None` when the entry is beyond repair.
    pub fn from_stored(mut value: Value) -> Option<Conversation> {
        let obj = value.as_object_mut()?;
        if !obj.get("messages").map(Value::is_array).unwrap_or(false) {
            obj.insert("messages".to_string(), Value::Array(vec![]));
        }

        let mut conversation: Conversation = match serde_json::from_value(value) {
            Ok(conversation) => conversation,
            Err(err) => {
                tracing::warn!(error = ?err, "Skipping unreadable conversation");
                return None;
            }
        };

        if conversation.title.trim().is_empty() {
            conversation.title = default_title();
        }

        return Some(conversation);
    }

    /// Title derived from the first user message, if there is one.
    pub fn title_from_messages(messages: &[Message]) -> Option<String> {
        let first = messages.iter().find(|msg| return msg.role == Role::User)?;
        return Some(first.content.chars().take(TITLE_MAX_CHARS).collect());
    }
}

/// Partial set of fields merged into an existing conversation by
/// `ConversationStore::update`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConversationUpdate {
    pub title: Option<String>,
    pub messages: Option<Vec<Message>>,
    pub model: Option<String>,
}

impl ConversationUpdate {
    pub fn title(mut self, title: &str) -> ConversationUpdate {
        self.title = Some(title.to_string());
        return self;
    }

    pub fn messages(mut self, messages: Vec<Message>) -> ConversationUpdate {
        self.messages = Some(messages);
        return self;
    }

    pub fn model(mut self, model: &str) -> ConversationUpdate {
        self.model = Some(model.to_string());
        return self;
    }

    pub fn apply(self, conversation: &mut Conversation) {
        if let Some(title) = self.title {
            conversation.title = title;
        }
        if let Some(messages) = self.messages {
            conversation.messages = messages;
        }
        if let Some(model) = self.model {
            conversation.model = model;
        }
    }
}
