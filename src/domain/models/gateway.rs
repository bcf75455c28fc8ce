#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use super::Message;

/// Models the hub lets a conversation talk to, as `provider/model` ids
/// understood by the gateway.
pub const MODELS: [(&str, &str); 6] = [
    ("anthropic/claude-sonnet-4-6", "Claude Sonnet 4.6"),
    ("anthropic/claude-opus-4-6", "Claude Opus 4.6"),
    ("anthropic/claude-sonnet-4", "Claude Sonnet 4"),
    ("openai/gpt-5", "GPT-5"),
    ("google/gemini-2.5-pro", "Gemini 2.5 Pro"),
    ("xai/grok-4", "Grok 4"),
];

pub fn validate_model(model: &str) -> Result<()> {
    if MODELS.iter().any(|(id, _)| return *id == model) {
        return Ok(());
    }

    let allowed = MODELS
        .iter()
        .map(|(id, _)| return *id)
        .collect::<Vec<&str>>()
        .join(", ");
    bail!(format!(
        "Model {model} is not available. Choose one of: {allowed}"
    ));
}

pub struct GatewayPrompt {
    pub model: String,
    pub system: String,
    pub messages: Vec<Message>,
}

impl GatewayPrompt {
    pub fn new(model: &str, system: &str, messages: Vec<Message>) -> GatewayPrompt {
        return GatewayPrompt {
            model: model.to_string(),
            system: system.to_string(),
            messages,
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayResponse {
    pub text: String,
    pub done: bool,
}

#[async_trait]
pub trait Gateway {
    /// Verifies the gateway is configured and reachable.
    async fn health_check(&self) -> Result<()>;

    /// Models advertised by the gateway, sorted.
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Requests a completion for the prompt. Each token is sent through the
    /// channel as it arrives, followed by a final response with `done` set.
    async fn get_completion<'a>(
        &self,
        prompt: GatewayPrompt,
        tx: &'a mpsc::UnboundedSender<GatewayResponse>,
    ) -> Result<()>;
}

pub type GatewayBox = Box<dyn Gateway + Send + Sync>;
