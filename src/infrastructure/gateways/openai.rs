#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tokio_util::io::StreamReader;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Gateway;
use crate::domain::models::GatewayPrompt;
use crate::domain::models::GatewayResponse;

const DONE_MARKER: &str = "[DONE]";

fn convert_err(err: reqwest::Error) -> std::io::Error {
    let err_msg = err.to_string();
    return std::io::Error::new(std::io::ErrorKind::Interrupted, err_msg);
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Model {
    id: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ModelListResponse {
    data: Vec<Model>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct MessageRequest {
    role: String,
    content: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<MessageRequest>,
    stream: bool,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionDeltaResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionChoiceResponse {
    delta: CompletionDeltaResponse,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoiceResponse>,
}

impl From<&GatewayPrompt> for CompletionRequest {
    fn from(prompt: &GatewayPrompt) -> CompletionRequest {
        let mut messages = vec![];
        if !prompt.system.is_empty() {
            messages.push(MessageRequest {
                role: "system".to_string(),
                content: prompt.system.to_string(),
            });
        }
        messages.extend(prompt.messages.iter().map(|message| {
            return MessageRequest {
                role: message.role.to_string(),
                content: message.content.to_string(),
            };
        }));

        return CompletionRequest {
            model: prompt.model.to_string(),
            messages,
            stream: true,
        };
    }
}

/// Pulls the token out of one server-sent event line. Returns `None` for
/// blank lines, comments, the terminator and anything that isn't a completion
/// chunk.
fn parse_event_line(line: &str) -> Option<String> {
    let mut cleaned_line = line.trim();
    if let Some(data) = cleaned_line.strip_prefix("data:") {
        cleaned_line = data.trim();
    }
    if cleaned_line.is_empty() || cleaned_line.starts_with(':') || cleaned_line == DONE_MARKER {
        return None;
    }

    let ores = match serde_json::from_str::<CompletionResponse>(cleaned_line) {
        Ok(ores) => ores,
        Err(err) => {
            tracing::warn!(error = ?err, line = cleaned_line, "Skipping unreadable completion line");
            return None;
        }
    };
    tracing::debug!(body = ?ores, "Completion response");

    return ores.choices.into_iter().next()?.delta.content;
}

/// Client for an OpenAI compatible model gateway.
pub struct OpenAiGateway {
    url: String,
    token: String,
    timeout: String,
}

impl Default for OpenAiGateway {
    fn default() -> OpenAiGateway {
        return OpenAiGateway {
            url: Config::get(ConfigKey::GatewayUrl),
            token: Config::get(ConfigKey::GatewayToken),
            timeout: Config::get(ConfigKey::GatewayHealthCheckTimeout),
        };
    }
}

#[async_trait]
impl Gateway for OpenAiGateway {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("Gateway URL is not defined");
        }
        if self.token.is_empty() {
            bail!("Gateway token is not defined");
        }

        let res = reqwest::Client::new()
            .get(format!("{url}/v1/models", url = self.url))
            .header("Authorization", format!("Bearer {}", self.token))
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        let status = match res {
            Ok(res) => res.status().as_u16(),
            Err(err) => {
                tracing::error!(error = ?err, "Gateway is not reachable");
                bail!("Gateway is not reachable");
            }
        };

        if status >= 400 {
            tracing::error!(status = status, "Gateway health check failed");
            bail!("Gateway health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn list_models(&self) -> Result<Vec<String>> {
        let res = reqwest::Client::new()
            .get(format!("{url}/v1/models", url = self.url))
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Failed to list gateway models");
            bail!("Failed to list gateway models");
        }

        let mut models: Vec<String> = res
            .json::<ModelListResponse>()
            .await?
            .data
            .iter()
            .map(|model| {
                return model.id.to_string();
            })
            .collect();

        models.sort();

        return Ok(models);
    }

    #[allow(clippy::implicit_return)]
    async fn get_completion<'a>(
        &self,
        prompt: GatewayPrompt,
        tx: &'a mpsc::UnboundedSender<GatewayResponse>,
    ) -> Result<()> {
        let req = CompletionRequest::from(&prompt);
        tracing::debug!(
            model = req.model,
            messages = req.messages.len(),
            "Requesting gateway completion"
        );

        let res = reqwest::Client::new()
            .post(format!("{url}/v1/chat/completions", url = self.url))
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                "Failed to make completion request to the gateway"
            );
            bail!(format!(
                "Failed to make completion request to the gateway: {}",
                res.status()
            ));
        }

        let stream = res.bytes_stream().map_err(convert_err);
        let mut lines_reader = StreamReader::new(stream).lines();

        while let Some(line) = lines_reader.next_line().await? {
            if let Some(text) = parse_event_line(&line) {
                tx.send(GatewayResponse { text, done: false })?;
            }
        }

        tx.send(GatewayResponse {
            text: "".to_string(),
            done: true,
        })?;

        return Ok(());
    }
}
