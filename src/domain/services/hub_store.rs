#[cfg(test)]
#[path = "hub_store_test.rs"]
mod tests;

use chrono::Utc;

use super::PersistedStore;
use crate::domain::models::Envelope;
use crate::domain::models::Feature;
use crate::domain::models::Features;
use crate::domain::models::HubState;
use crate::domain::models::Message;
use crate::domain::models::PersistedHubState;
use crate::domain::models::StorageRef;

pub const HUB_KEY: &str = "ktg-ai-hub";

/// Preferences and one-time flags for the AI hub. Every change is written
/// through straight away, filtered by `PersistedHubState`.
pub struct HubStore {
    state: HubState,
    store: PersistedStore,
}

impl HubStore {
    pub fn new(storage: StorageRef) -> HubStore {
        let store = PersistedStore::new(storage, HUB_KEY);
        let envelope = store.load(Envelope::new(PersistedHubState::default()));
        let state = HubState::merge(envelope.state);

        tracing::debug!(
            has_seen_intro = state.has_seen_intro,
            selected_model = state.selected_model,
            messages = state.messages.len(),
            "Loaded hub state"
        );

        return HubStore { state, store };
    }

    fn set<F: FnOnce(&mut HubState)>(&mut self, update: F) {
        update(&mut self.state);
        self.store
            .save(&Envelope::new(PersistedHubState::from(&self.state)));
    }

    pub fn state(&self) -> &HubState {
        return &self.state;
    }

    pub fn has_seen_intro(&self) -> bool {
        return self.state.has_seen_intro;
    }

    pub fn set_has_seen_intro(&mut self, value: bool) {
        self.set(|state| state.has_seen_intro = value);
    }

    pub fn is_modal_open(&self) -> bool {
        return self.state.is_open;
    }

    pub fn set_is_open(&mut self, value: bool) {
        self.set(|state| state.is_open = value);
    }

    pub fn selected_model(&self) -> &str {
        return &self.state.selected_model;
    }

    pub fn set_selected_model(&mut self, model: &str) {
        self.set(|state| state.selected_model = model.to_string());
    }

    pub fn available_models(&self) -> &[String] {
        return &self.state.available_models;
    }

    pub fn set_available_models(&mut self, models: Vec<String>) {
        self.set(|state| state.available_models = models);
    }

    pub fn messages(&self) -> &[Message] {
        return &self.state.messages;
    }

    pub fn add_message(&mut self, message: Message) {
        let message = message.with_timestamp(Utc::now().timestamp_millis());
        self.set(|state| state.messages.push(message));
    }

    pub fn clear_messages(&mut self) {
        self.set(|state| state.messages.clear());
    }

    pub fn hub_revealed(&self) -> bool {
        return self.state.hub_revealed;
    }

    pub fn set_hub_revealed(&mut self, value: bool) {
        self.set(|state| state.hub_revealed = value);
    }

    pub fn features(&self) -> &Features {
        return &self.state.features;
    }

    pub fn toggle_feature(&mut self, feature: Feature) {
        self.set(|state| state.features.toggle(feature));
    }
}
