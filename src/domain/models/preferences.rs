#[cfg(test)]
#[path = "preferences_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::deserialize_messages;
use super::Message;

pub const DEFAULT_SELECTED_MODEL: &str = "anthropic/claude-sonnet-4";
pub const PERSISTED_MESSAGE_LIMIT: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Feature {
    Streaming,
    MultiModel,
    AgentMode,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Features {
    pub streaming: bool,
    pub multi_model: bool,
    pub agent_mode: bool,
}

impl Default for Features {
    fn default() -> Features {
        return Features {
            streaming: true,
            multi_model: true,
            agent_mode: false,
        };
    }
}

impl Features {
    pub fn get(&self, feature: Feature) -> bool {
        match feature {
            Feature::Streaming => return self.streaming,
            Feature::MultiModel => return self.multi_model,
            Feature::AgentMode => return self.agent_mode,
        }
    }

    pub fn toggle(&mut self, feature: Feature) {
        match feature {
            Feature::Streaming => self.streaming = !self.streaming,
            Feature::MultiModel => self.multi_model = !self.multi_model,
            Feature::AgentMode => self.agent_mode = !self.agent_mode,
        }
    }
}

/// Everything the AI hub keeps in memory. Only the fields copied by
/// `PersistedHubState::from` survive a reload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HubState {
    pub has_seen_intro: bool,
    pub is_open: bool,
    pub selected_model: String,
    pub available_models: Vec<String>,
    pub messages: Vec<Message>,
    pub hub_revealed: bool,
    pub features: Features,
}

impl Default for HubState {
    fn default() -> HubState {
        return HubState {
            has_seen_intro: false,
            is_open: false,
            selected_model: DEFAULT_SELECTED_MODEL.to_string(),
            available_models: vec![],
            messages: vec![],
            hub_revealed: false,
            features: Features::default(),
        };
    }
}

impl HubState {
    /// Restores a persisted snapshot on top of the in-memory defaults.
    pub fn merge(persisted: PersistedHubState) -> HubState {
        return HubState {
            has_seen_intro: persisted.has_seen_intro,
            selected_model: persisted.selected_model,
            messages: persisted.messages,
            ..HubState::default()
        };
    }
}

/// The allow-list of hub fields written to storage. Any new field on
/// `HubState` stays in memory only until it is added here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedHubState {
    pub has_seen_intro: bool,
    pub selected_model: String,
    #[serde(deserialize_with = "deserialize_messages")]
    pub messages: Vec<Message>,
}

impl Default for PersistedHubState {
    fn default() -> PersistedHubState {
        return PersistedHubState::from(&HubState::default());
    }
}

impl From<&HubState> for PersistedHubState {
    fn from(state: &HubState) -> PersistedHubState {
        let skip = state.messages.len().saturating_sub(PERSISTED_MESSAGE_LIMIT);

        return PersistedHubState {
            has_seen_intro: state.has_seen_intro,
            selected_model: state.selected_model.to_string(),
            messages: state.messages[skip..].to_vec(),
        };
    }
}

/// Wrapper matching the `{ "state": ..., "version": 0 }` layout the hub has
/// always written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub state: T,
    #[serde(default)]
    pub version: u32,
}

impl<T> Envelope<T> {
    pub fn new(state: T) -> Envelope<T> {
        return Envelope { state, version: 0 };
    }
}
