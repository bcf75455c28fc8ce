#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use serde::Deserializer;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use serde_json::Value;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct MessagePart {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Accepts both the plain `content` shape and the older `parts` shape written
/// by previous versions of the hub.
#[derive(Deserialize)]
struct StoredMessage {
    role: Role,
    content: Option<String>,
    #[serde(default)]
    parts: Vec<MessagePart>,
    timestamp: Option<i64>,
}

impl From<StoredMessage> for Message {
    fn from(stored: StoredMessage) -> Message {
        let content = match stored.content {
            Some(content) => content,
            None => stored
                .parts
                .iter()
                .filter(|part| return part.kind == "text")
                .map(|part| return part.text.as_str())
                .collect::<Vec<&str>>()
                .join(""),
        };

        return Message {
            role: stored.role,
            content,
            timestamp: stored.timestamp,
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredMessage")]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Message {
        return Message {
            role,
            content: content.to_string(),
            timestamp: None,
        };
    }

    pub fn user(content: &str) -> Message {
        return Message::new(Role::User, content);
    }

    pub fn assistant(content: &str) -> Message {
        return Message::new(Role::Assistant, content);
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Message {
        self.timestamp = Some(timestamp);
        return self;
    }

    /// First line of the message, cut to `max_chars` with an ellipsis.
    pub fn preview(&self, max_chars: usize) -> String {
        let line = self.content.split('\n').next().unwrap_or_default();
        if line.chars().count() <= max_chars {
            return line.to_string();
        }

        let cut = line
            .chars()
            .take(max_chars.saturating_sub(3))
            .collect::<String>();
        return format!("{cut}...");
    }
}

/// Reads a stored message list one entry at a time. Entries that cannot be
/// read are dropped and anything other than a list reads as empty.
pub fn deserialize_messages<'de, D>(deserializer: D) -> Result<Vec<Message>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = match <Value as serde::Deserialize>::deserialize(deserializer)? {
        Value::Array(values) => values,
        other => {
            tracing::warn!(value = ?other, "Stored messages are not a list");
            return Ok(vec![]);
        }
    };

    return Ok(values
        .into_iter()
        .filter_map(|value| {
            return match serde_json::from_value::<Message>(value) {
                Ok(message) => Some(message),
                Err(err) => {
                    tracing::warn!(error = ?err, "Skipping unreadable message");
                    return None;
                }
            };
        })
        .collect());
}
