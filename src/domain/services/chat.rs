#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::Error;
use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time;

use super::ConversationStore;
use super::HubStore;
use crate::domain::models::validate_model;
use crate::domain::models::Conversation;
use crate::domain::models::ConversationUpdate;
use crate::domain::models::GatewayBox;
use crate::domain::models::GatewayPrompt;
use crate::domain::models::GatewayResponse;
use crate::domain::models::Message;
use crate::domain::models::DEFAULT_TITLE;

pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an advanced AI assistant integrated into .ktg's AI Tools Hub.
You specialize in:
- Prompt engineering techniques and optimization
- RAG (Retrieval-Augmented Generation) architectures
- AI system design and cognitive software engineering
- Cross-domain reasoning and creative problem solving

Be concise, technical, and insightful. Use markdown formatting when helpful.
When discussing code, provide working examples."#;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ChatFinish {
    Completed,
    /// No token arrived within the stall timeout.
    Stalled,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatOutcome {
    pub conversation_id: String,
    pub reply: String,
    pub finish: ChatFinish,
}

pub struct ChatService {
    gateway: GatewayBox,
    system_prompt: String,
    stall_timeout: Duration,
}

impl ChatService {
    pub fn new(gateway: GatewayBox, system_prompt: &str, stall_timeout: Duration) -> ChatService {
        return ChatService {
            gateway,
            system_prompt: system_prompt.to_string(),
            stall_timeout,
        };
    }

    /// Streams the gateway's reply to `text` into the active conversation,
    /// creating one first when none is active. Each token is handed to
    /// `on_token` as it arrives.
    ///
    /// `model` is only used for this request. A conversation keeps the model
    /// it was created with.
    ///
    /// Whatever was received is recorded even when the stream stalls or the
    /// gateway fails. A gateway failure is returned after recording.
    pub async fn send<F: FnMut(&str)>(
        &self,
        conversations: &mut ConversationStore,
        model: &str,
        text: &str,
        on_token: F,
    ) -> Result<ChatOutcome> {
        validate_model(model)?;

        let conversation = match conversations.active() {
            Some(conversation) => conversation.clone(),
            None => conversations.create(model),
        };

        let mut messages = conversation.messages.clone();
        messages.push(Message::user(text));

        let prompt = GatewayPrompt::new(model, &self.system_prompt, messages.clone());
        let (reply, finish, err) = self.stream(prompt, on_token).await;

        if !reply.is_empty() {
            messages.push(Message::assistant(&reply));
        }
        ChatService::record(conversations, &conversation, messages);

        tracing::debug!(
            id = conversation.id,
            model = model,
            finish = finish.to_string(),
            reply_len = reply.len(),
            "Recorded chat exchange"
        );

        if let Some(err) = err {
            return Err(err);
        }

        return Ok(ChatOutcome {
            conversation_id: conversation.id,
            reply,
            finish,
        });
    }

    /// Same exchange as `send`, against the hub's own message history and
    /// selected model.
    pub async fn send_hub<F: FnMut(&str)>(
        &self,
        hub: &mut HubStore,
        text: &str,
        on_token: F,
    ) -> Result<ChatFinish> {
        let model = hub.selected_model().to_string();
        validate_model(&model)?;

        let mut messages = hub.messages().to_vec();
        messages.push(Message::user(text));

        let prompt = GatewayPrompt::new(&model, &self.system_prompt, messages);
        let (reply, finish, err) = self.stream(prompt, on_token).await;

        hub.add_message(Message::user(text));
        if !reply.is_empty() {
            hub.add_message(Message::assistant(&reply));
        }

        tracing::debug!(
            model = model,
            finish = finish.to_string(),
            reply_len = reply.len(),
            "Recorded hub exchange"
        );

        if let Some(err) = err {
            return Err(err);
        }

        return Ok(finish);
    }

    async fn stream<F: FnMut(&str)>(
        &self,
        prompt: GatewayPrompt,
        mut on_token: F,
    ) -> (String, ChatFinish, Option<Error>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<GatewayResponse>();
        let completion = self.gateway.get_completion(prompt, &tx);
        tokio::pin!(completion);

        let mut reply = "".to_string();
        let mut push = |response: GatewayResponse, reply: &mut String| {
            if response.text.is_empty() {
                return;
            }
            on_token(&response.text);
            *reply += &response.text;
        };

        loop {
            tokio::select! {
                res = &mut completion => {
                    while let Ok(response) = rx.try_recv() {
                        push(response, &mut reply);
                    }

                    return match res {
                        Ok(()) => (reply, ChatFinish::Completed, None),
                        Err(err) => {
                            tracing::error!(error = ?err, "Gateway completion failed");
                            (reply, ChatFinish::Failed, Some(err))
                        }
                    };
                }
                received = time::timeout(self.stall_timeout, rx.recv()) => {
                    match received {
                        Ok(Some(response)) => {
                            let done = response.done;
                            push(response, &mut reply);
                            if done {
                                return (reply, ChatFinish::Completed, None);
                            }
                        }
                        Ok(None) => return (reply, ChatFinish::Completed, None),
                        Err(_) => {
                            tracing::warn!(
                                timeout_ms = self.stall_timeout.as_millis() as u64,
                                "Gateway stream stalled"
                            );
                            return (reply, ChatFinish::Stalled, None);
                        }
                    }
                }
            }
        }
    }

    fn record(
        conversations: &mut ConversationStore,
        conversation: &Conversation,
        messages: Vec<Message>,
    ) {
        let title = Conversation::title_from_messages(&messages)
            .unwrap_or_else(|| return DEFAULT_TITLE.to_string());

        conversations.update(
            &conversation.id,
            ConversationUpdate::default()
                .title(&title)
                .messages(messages),
        );
    }
}
