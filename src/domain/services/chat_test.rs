use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use super::ChatFinish;
use super::ChatService;
use super::DEFAULT_SYSTEM_PROMPT;
use crate::domain::models::Gateway;
use crate::domain::models::GatewayPrompt;
use crate::domain::models::GatewayResponse;
use crate::domain::models::Message;
use crate::domain::models::Role;
use crate::domain::models::StorageRef;
use crate::domain::models::DEFAULT_TITLE;
use crate::domain::services::ConversationStore;
use crate::domain::services::HubStore;
use crate::infrastructure::storage::memory::MemoryStorage;

const MODEL: &str = "openai/gpt-5";

enum Script {
    Reply(Vec<&'static str>),
    FailAfter(Vec<&'static str>),
    StallAfter(Vec<&'static str>),
}

struct StubGateway {
    script: Script,
    prompts: Arc<Mutex<Vec<GatewayPrompt>>>,
}

impl StubGateway {
    fn new(script: Script) -> (StubGateway, Arc<Mutex<Vec<GatewayPrompt>>>) {
        let prompts = Arc::new(Mutex::new(vec![]));
        return (
            StubGateway {
                script,
                prompts: prompts.clone(),
            },
            prompts,
        );
    }
}

fn send_tokens(tokens: &[&str], tx: &mpsc::UnboundedSender<GatewayResponse>) -> Result<()> {
    for token in tokens {
        tx.send(GatewayResponse {
            text: token.to_string(),
            done: false,
        })?;
    }
    return Ok(());
}

#[async_trait]
impl Gateway for StubGateway {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn list_models(&self) -> Result<Vec<String>> {
        return Ok(vec![]);
    }

    #[allow(clippy::implicit_return)]
    async fn get_completion<'a>(
        &self,
        prompt: GatewayPrompt,
        tx: &'a mpsc::UnboundedSender<GatewayResponse>,
    ) -> Result<()> {
        self.prompts.lock().unwrap().push(prompt);

        match &self.script {
            Script::Reply(tokens) => {
                send_tokens(tokens, tx)?;
                tx.send(GatewayResponse {
                    text: "".to_string(),
                    done: true,
                })?;
            }
            Script::FailAfter(tokens) => {
                send_tokens(tokens, tx)?;
                bail!("Gateway went away");
            }
            Script::StallAfter(tokens) => {
                send_tokens(tokens, tx)?;
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
        }

        return Ok(());
    }
}

fn memory() -> StorageRef {
    return Arc::new(MemoryStorage::default());
}

fn service(gateway: StubGateway) -> ChatService {
    return ChatService::new(
        Box::new(gateway),
        DEFAULT_SYSTEM_PROMPT,
        Duration::from_millis(50),
    );
}

#[tokio::test]
async fn it_creates_a_conversation_and_records_the_exchange() -> Result<()> {
    let (gateway, prompts) = StubGateway::new(Script::Reply(vec!["Hello ", "there"]));
    let mut conversations = ConversationStore::new(memory());

    let mut tokens = vec![];
    let outcome = service(gateway)
        .send(&mut conversations, MODEL, "Hi, who are you?", |token| {
            tokens.push(token.to_string())
        })
        .await?;

    assert_eq!(tokens, vec!["Hello ", "there"]);
    assert_eq!(outcome.reply, "Hello there");
    assert_eq!(outcome.finish, ChatFinish::Completed);
    assert_eq!(conversations.active_id(), Some(outcome.conversation_id.as_str()));

    let conversation = conversations.active().unwrap();
    assert_eq!(conversation.title, "Hi, who are you?");
    assert_eq!(conversation.model, MODEL);
    assert_eq!(
        conversation.messages,
        vec![Message::user("Hi, who are you?"), Message::assistant("Hello there")]
    );

    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].model, MODEL);
    assert_eq!(prompts[0].system, DEFAULT_SYSTEM_PROMPT);
    assert_eq!(prompts[0].messages, vec![Message::user("Hi, who are you?")]);

    return Ok(());
}

#[tokio::test]
async fn it_continues_the_active_conversation() -> Result<()> {
    let storage = memory();
    let mut conversations = ConversationStore::new(storage.clone());
    let first = conversations.create(MODEL);

    let (gateway, _) = StubGateway::new(Script::Reply(vec!["One"]));
    service(gateway)
        .send(&mut conversations, MODEL, "First question", |_| {})
        .await?;

    let (gateway, prompts) = StubGateway::new(Script::Reply(vec!["Two"]));
    let outcome = service(gateway)
        .send(&mut conversations, MODEL, "Second question", |_| {})
        .await?;

    assert_eq!(outcome.conversation_id, first.id);
    assert_eq!(conversations.list().len(), 1);

    let prompts = prompts.lock().unwrap();
    let sent = &prompts[0].messages;
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].role, Role::User);
    assert_eq!(sent[1].content, "One");

    let reloaded = ConversationStore::new(storage);
    let conversation = reloaded.get(&first.id).unwrap();
    assert_eq!(conversation.title, "First question");
    assert_eq!(conversation.messages.len(), 4);

    return Ok(());
}

#[tokio::test]
async fn it_keeps_the_model_a_conversation_was_created_with() -> Result<()> {
    let storage = memory();
    let mut conversations = ConversationStore::new(storage.clone());
    let created = conversations.create("anthropic/claude-sonnet-4");

    let (gateway, prompts) = StubGateway::new(Script::Reply(vec!["Hi"]));
    service(gateway)
        .send(&mut conversations, MODEL, "Hello", |_| {})
        .await?;

    assert_eq!(prompts.lock().unwrap()[0].model, MODEL);
    let reloaded = ConversationStore::new(storage);
    let conversation = reloaded.get(&created.id).unwrap();
    assert_eq!(conversation.model, "anthropic/claude-sonnet-4");
    assert_eq!(conversation.messages.len(), 2);

    return Ok(());
}

#[tokio::test]
async fn it_truncates_long_titles() -> Result<()> {
    let (gateway, _) = StubGateway::new(Script::Reply(vec!["Sure"]));
    let mut conversations = ConversationStore::new(memory());
    let text = "Explain retrieval augmented generation like I am five years old";

    service(gateway)
        .send(&mut conversations, MODEL, text, |_| {})
        .await?;

    let title = &conversations.active().unwrap().title;
    assert_eq!(title.chars().count(), 40);
    assert!(text.starts_with(title.as_str()));

    return Ok(());
}

#[tokio::test]
async fn it_rejects_unknown_models_without_recording() -> Result<()> {
    let (gateway, prompts) = StubGateway::new(Script::Reply(vec!["Nope"]));
    let mut conversations = ConversationStore::new(memory());

    let res = service(gateway)
        .send(&mut conversations, "acme/unknown", "Hello", |_| {})
        .await;

    assert!(res.is_err());
    assert!(conversations.list().is_empty());
    assert!(prompts.lock().unwrap().is_empty());

    return Ok(());
}

#[tokio::test]
async fn it_records_partial_replies_when_the_gateway_fails() -> Result<()> {
    let (gateway, _) = StubGateway::new(Script::FailAfter(vec!["Partial "]));
    let mut conversations = ConversationStore::new(memory());

    let res = service(gateway)
        .send(&mut conversations, MODEL, "Tell me a story", |_| {})
        .await;

    assert!(res.is_err());
    let conversation = conversations.active().unwrap();
    assert_eq!(
        conversation.messages,
        vec![Message::user("Tell me a story"), Message::assistant("Partial ")]
    );

    return Ok(());
}

#[tokio::test]
async fn it_records_the_user_message_alone_when_nothing_arrives() -> Result<()> {
    let (gateway, _) = StubGateway::new(Script::FailAfter(vec![]));
    let mut conversations = ConversationStore::new(memory());

    let res = service(gateway)
        .send(&mut conversations, MODEL, "Anyone there?", |_| {})
        .await;

    assert!(res.is_err());
    let conversation = conversations.active().unwrap();
    assert_eq!(conversation.messages, vec![Message::user("Anyone there?")]);
    assert_ne!(conversation.title, DEFAULT_TITLE);

    return Ok(());
}

#[tokio::test]
async fn it_gives_up_on_stalled_streams() -> Result<()> {
    let (gateway, _) = StubGateway::new(Script::StallAfter(vec!["Thinking"]));
    let mut conversations = ConversationStore::new(memory());

    let outcome = service(gateway)
        .send(&mut conversations, MODEL, "Hard question", |_| {})
        .await?;

    assert_eq!(outcome.finish, ChatFinish::Stalled);
    assert_eq!(outcome.reply, "Thinking");
    assert_eq!(conversations.active().unwrap().messages.len(), 2);

    return Ok(());
}

#[tokio::test]
async fn it_records_hub_exchanges_with_the_selected_model() -> Result<()> {
    let storage = memory();
    let mut hub = HubStore::new(storage.clone());
    hub.set_selected_model("google/gemini-2.5-pro");
    hub.add_message(Message::user("Earlier"));

    let (gateway, prompts) = StubGateway::new(Script::Reply(vec!["Hi!"]));
    let finish = service(gateway).send_hub(&mut hub, "Hello hub", |_| {}).await?;

    assert_eq!(finish, ChatFinish::Completed);
    let prompts = prompts.lock().unwrap();
    let sent = &prompts[0];
    assert_eq!(sent.model, "google/gemini-2.5-pro");
    assert_eq!(sent.messages.len(), 2);

    let reloaded = HubStore::new(storage);
    let contents = reloaded
        .messages()
        .iter()
        .map(|message| return message.content.as_str())
        .collect::<Vec<&str>>();
    assert_eq!(contents, vec!["Earlier", "Hello hub", "Hi!"]);
    assert!(reloaded.messages().iter().all(|message| return message.timestamp.is_some()));

    return Ok(());
}
