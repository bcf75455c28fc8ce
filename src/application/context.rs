use std::path;

use anyhow::bail;
use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::StorageName;
use crate::domain::models::StorageRef;
use crate::domain::models::TriggerPosition;
use crate::domain::services::ChatService;
use crate::domain::services::ConversationStore;
use crate::domain::services::HubStore;
use crate::domain::services::DEFAULT_SYSTEM_PROMPT;
use crate::infrastructure::gateways::GatewayManager;
use crate::infrastructure::storage::StorageManager;

/// Everything a command needs, built once from the loaded configuration.
pub struct AppContext {
    pub storage: StorageRef,
    pub storage_dir: path::PathBuf,
}

impl AppContext {
    pub fn from_config() -> Result<AppContext> {
        let storage_name = Config::get(ConfigKey::Storage);
        let name = match StorageName::parse(storage_name.to_string()) {
            Some(name) => name,
            None => bail!(format!("No storage implemented for {storage_name}")),
        };

        let storage_dir = path::PathBuf::from(Config::get(ConfigKey::StorageDir));
        let storage = StorageManager::get(name, storage_dir.clone())?;

        return Ok(AppContext {
            storage,
            storage_dir,
        });
    }

    pub fn conversations(&self) -> ConversationStore {
        return ConversationStore::new(self.storage.clone());
    }

    pub fn hub(&self) -> HubStore {
        return HubStore::new(self.storage.clone());
    }

    pub fn trigger_position(&self) -> Result<TriggerPosition> {
        return Config::get(ConfigKey::TriggerPosition).parse::<TriggerPosition>();
    }

    pub fn chat_service(&self) -> Result<ChatService> {
        let mut system_prompt = Config::get(ConfigKey::SystemPrompt);
        if system_prompt.is_empty() {
            system_prompt = DEFAULT_SYSTEM_PROMPT.to_string();
        }

        return Ok(ChatService::new(
            GatewayManager::get()?,
            &system_prompt,
            Config::duration(ConfigKey::GatewayStallTimeout)?,
        ));
    }
}
