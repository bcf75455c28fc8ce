#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::io::Write;
use std::path;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgGroup;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use owo_colors::OwoColorize;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::AppContext;
use crate::configuration::log_dir;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::validate_model;
use crate::domain::models::Conversation;
use crate::domain::models::ConversationUpdate;
use crate::domain::models::Feature;
use crate::domain::models::HubState;
use crate::domain::models::Region;
use crate::domain::models::StorageName;
use crate::domain::models::TriggerPosition;
use crate::domain::models::MODELS;
use crate::domain::services::ChatFinish;
use crate::domain::services::ConversationStore;
use crate::domain::services::FirstSession;
use crate::domain::services::HubStore;
use crate::domain::services::Onboarding;
use crate::domain::services::Viewport;
use crate::infrastructure::gateways::GatewayManager;

const PREVIEW_CHARS: usize = 70;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

fn format_conversation(conversation: &Conversation, is_active: bool) -> String {
    let marker = if is_active { "*" } else { "-" };
    let mut res = format!(
        "{marker} (ID: {}) {}, Model: {}, Messages: {}",
        conversation.id,
        conversation.title,
        conversation.model,
        conversation.messages.len()
    );

    if let Some(last) = conversation.messages.last() {
        res = format!("{res}, {}", last.preview(PREVIEW_CHARS));
    }

    return res;
}

fn format_conversation_list(store: &ConversationStore) -> String {
    if store.list().is_empty() {
        return "There are no conversations yet. Start one with `ktg-hub chat`!".to_string();
    }

    return store
        .list()
        .iter()
        .map(|conversation| {
            return format_conversation(
                conversation,
                store.active_id() == Some(conversation.id.as_str()),
            );
        })
        .collect::<Vec<String>>()
        .join("\n");
}

fn format_transcript(conversation: &Conversation) -> String {
    let mut lines = vec![format!("# {}", conversation.title)];
    for message in &conversation.messages {
        lines.push(format!("\n{}:\n{}", message.role, message.content));
    }

    return lines.join("\n");
}

fn format_prefs(state: &HubState) -> String {
    let features = [Feature::Streaming, Feature::MultiModel, Feature::AgentMode]
        .iter()
        .map(|feature| {
            let flag = if state.features.get(*feature) { "on" } else { "off" };
            return format!("{feature}={flag}");
        })
        .collect::<Vec<String>>()
        .join(", ");

    return [
        format!("Selected model: {}", state.selected_model),
        format!("Seen intro: {}", state.has_seen_intro),
        format!("Hub messages: {}", state.messages.len()),
        format!("Features: {features}"),
    ]
    .join("\n");
}

fn format_models(selected: &str) -> String {
    return MODELS
        .iter()
        .map(|(id, name)| {
            let marker = if *id == selected { "*" } else { "-" };
            return format!("{marker} {id} ({name})");
        })
        .collect::<Vec<String>>()
        .join("\n");
}

/// Replays scroll positions through the hub section trigger and reports what
/// the first session gate did at each one.
fn simulate_intro(
    hub: &mut HubStore,
    position: TriggerPosition,
    target: Region,
    mut viewport: Viewport,
    positions: &[u32],
    dismiss: bool,
) -> Vec<String> {
    let mut onboarding = Onboarding::mount(hub, position);
    onboarding.attach(target);

    let mut lines = vec![format!(
        "Mounted with state {}, trigger at {position}",
        onboarding.gate().state()
    )];

    for scroll_position in positions {
        viewport.scroll_to(*scroll_position);
        let shown = onboarding.scroll(&viewport);

        let visibility = if viewport.is_visible(&target) {
            "visible"
        } else {
            "hidden"
        };
        let mut line = format!(
            "Scrolled to {} (section {visibility}): {}",
            viewport.position,
            onboarding.gate().state()
        );
        if shown {
            line = format!("{line} (modal shown)");
        }
        lines.push(line);

        if shown && dismiss {
            onboarding.dismiss();
            lines.push(format!("Dismissed: {}", onboarding.gate().state()));
        }
    }

    return lines;
}

fn pick_conversation(store: &ConversationStore, prompt: &str) -> Result<Option<String>> {
    if store.list().is_empty() {
        println!("There are no conversations yet. Start one with `ktg-hub chat`!");
        return Ok(None);
    }

    let options = store
        .list()
        .iter()
        .map(|conversation| {
            return format_conversation(
                conversation,
                store.active_id() == Some(conversation.id.as_str()),
            );
        })
        .collect::<Vec<String>>();

    let idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(0)
        .items(&options)
        .interact_opt()?;

    return Ok(idx.map(|idx| return store.list()[idx].id.to_string()));
}

/// `--model` when given, otherwise the active conversation's own model. Only
/// a brand new conversation falls back to the hub's selected model.
fn chat_model(store: &ConversationStore, requested: Option<&str>, hub_model: &str) -> String {
    if let Some(model) = requested {
        return model.to_string();
    }

    return match store.active() {
        Some(conversation) if !conversation.model.is_empty() => conversation.model.to_string(),
        _ => hub_model.to_string(),
    };
}

fn resolve_conversation_id(store: &ConversationStore, matches: &ArgMatches) -> Result<String> {
    let id = match matches.get_one::<String>("id") {
        Some(id) => id.to_string(),
        None => store
            .active_id()
            .ok_or_else(|| return anyhow!("There is no active conversation"))?
            .to_string(),
    };

    if store.get(&id).is_none() {
        bail!(format!("No conversation found with ID {id}"));
    }

    return Ok(id);
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

async fn run_chat(context: &AppContext, matches: &ArgMatches) -> Result<()> {
    let text = matches
        .get_one::<String>("message")
        .ok_or_else(|| return anyhow!("A message is required"))?;
    let service = context.chat_service()?;
    let mut stdout = io::stdout();
    let on_token = |token: &str| {
        print!("{token}");
        if let Err(err) = stdout.flush() {
            tracing::warn!(error = ?err, "Failed to flush stdout");
        }
    };

    let finish = if matches.get_flag("hub") {
        let mut hub = context.hub();
        service.send_hub(&mut hub, text, on_token).await?
    } else {
        let mut conversations = context.conversations();
        let model = chat_model(
            &conversations,
            matches.get_one::<String>("model").map(|model| return model.as_str()),
            context.hub().selected_model(),
        );
        service
            .send(&mut conversations, &model, text, on_token)
            .await?
            .finish
    };

    println!();
    if finish == ChatFinish::Stalled {
        eprintln!(
            "{}",
            "The reply stalled and was saved as far as it got.".yellow()
        );
    }

    return Ok(());
}

fn run_conversations(context: &AppContext, matches: &ArgMatches) -> Result<()> {
    let mut store = context.conversations();

    match matches.subcommand() {
        Some(("dir", _)) => {
            println!("{}", context.storage_dir.to_string_lossy());
        }
        Some(("list", _)) => {
            println!("{}", format_conversation_list(&store));
        }
        Some(("new", new_matches)) => {
            let model = match new_matches.get_one::<String>("model") {
                Some(model) => model.to_string(),
                None => context.hub().selected_model().to_string(),
            };
            validate_model(&model)?;
            let conversation = store.create(&model);
            println!("Created conversation {}", conversation.id);
        }
        Some(("open", open_matches)) => {
            let id = match open_matches.get_one::<String>("id") {
                Some(id) => Some(id.to_string()),
                None => pick_conversation(&store, "Which conversation would you like to open?")?,
            };

            if let Some(id) = id {
                if store.get(&id).is_none() {
                    bail!(format!("No conversation found with ID {id}"));
                }
                store.set_active(&id);
                println!("Opened conversation {id}");
            }
        }
        Some(("show", show_matches)) => {
            let id = resolve_conversation_id(&store, show_matches)?;
            if let Some(conversation) = store.get(&id) {
                println!("{}", format_transcript(conversation));
            }
        }
        Some(("rename", rename_matches)) => {
            let id = resolve_conversation_id(&store, rename_matches)?;
            let title = rename_matches
                .get_one::<String>("title")
                .ok_or_else(|| return anyhow!("A title is required"))?;
            store.update(&id, ConversationUpdate::default().title(title));
            println!("Renamed conversation {id}");
        }
        Some(("model", model_matches)) => {
            let id = resolve_conversation_id(&store, model_matches)?;
            let model = model_matches
                .get_one::<String>("name")
                .ok_or_else(|| return anyhow!("A model name is required"))?;
            validate_model(model)?;
            store.update(&id, ConversationUpdate::default().model(model));
            println!("Conversation {id} now uses {model}");
        }
        Some(("delete", delete_matches)) => {
            if let Some(id) = delete_matches.get_one::<String>("id") {
                store.delete(id);
                println!("Deleted conversation {id}");
            } else if delete_matches.get_flag("all") {
                let ids = store
                    .list()
                    .iter()
                    .map(|conversation| return conversation.id.to_string())
                    .collect::<Vec<String>>();
                for id in ids {
                    store.delete(&id);
                }
                println!("Deleted all conversations");
            } else {
                subcommand_conversations_delete().print_long_help()?;
            }
        }
        _ => {
            subcommand_conversations().print_long_help()?;
        }
    }

    return Ok(());
}

fn get_u32(matches: &ArgMatches, id: &str) -> Result<u32> {
    return matches
        .get_one::<u32>(id)
        .copied()
        .ok_or_else(|| return anyhow!("Missing value for --{id}"));
}

fn run_intro(context: &AppContext, matches: &ArgMatches) -> Result<()> {
    let mut hub = context.hub();

    match matches.subcommand() {
        Some(("status", _)) => {
            let gate = FirstSession::mount(&mut hub);
            println!("State: {}", gate.state());
            println!("First session: {}", gate.is_first_session());
            println!("Seen intro: {}", gate.has_seen_intro());
            println!("Trigger position: {}", context.trigger_position()?);
        }
        Some(("simulate", simulate_matches)) => {
            let positions = simulate_matches
                .get_many::<u32>("positions")
                .map(|values| return values.copied().collect::<Vec<u32>>())
                .unwrap_or_default();
            let target = Region::new(
                get_u32(simulate_matches, "target-top")?,
                get_u32(simulate_matches, "target-height")?,
            );
            let viewport = Viewport::new(
                get_u32(simulate_matches, "content-height")?,
                get_u32(simulate_matches, "viewport-height")?,
            );

            let lines = simulate_intro(
                &mut hub,
                context.trigger_position()?,
                target,
                viewport,
                &positions,
                simulate_matches.get_flag("dismiss"),
            );
            println!("{}", lines.join("\n"));
        }
        Some(("dismiss", _)) => {
            let mut gate = FirstSession::mount(&mut hub);
            gate.dismiss();
            println!("Intro marked as seen");
        }
        Some(("reset", _)) => {
            let mut gate = FirstSession::mount(&mut hub);
            gate.reset();
            println!("Intro reset, the next visit is a first session again");
        }
        _ => {
            subcommand_intro().print_long_help()?;
        }
    }

    return Ok(());
}

fn run_prefs(context: &AppContext, matches: &ArgMatches) -> Result<()> {
    let mut hub = context.hub();

    match matches.subcommand() {
        Some(("model", model_matches)) => {
            let model = model_matches
                .get_one::<String>("name")
                .ok_or_else(|| return anyhow!("A model name is required"))?;
            validate_model(model)?;
            hub.set_selected_model(model);
            println!("{model} has entered the chat.");
        }
        Some(("clear-messages", _)) => {
            hub.clear_messages();
            println!("Cleared hub messages");
        }
        _ => {
            println!("{}", format_prefs(hub.state()));
        }
    }

    return Ok(());
}

async fn run_models(context: &AppContext, matches: &ArgMatches) -> Result<()> {
    let mut hub = context.hub();

    if !matches.get_flag("remote") {
        println!("{}", format_models(hub.selected_model()));
        return Ok(());
    }

    let gateway = GatewayManager::get()?;
    gateway.health_check().await?;
    let models = gateway.list_models().await?;
    println!("{}", models.join("\n"));
    hub.set_available_models(models);

    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for ktg-hub")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running ktg-hub with environment variable RUST_LOG=ktg_hub")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn arg_model(help: &'static str) -> Arg {
    return Arg::new("model")
        .short('m')
        .long("model")
        .num_args(1)
        .help(help);
}

fn arg_conversation_id() -> Arg {
    return Arg::new("id")
        .short('i')
        .long("id")
        .num_args(1)
        .help("Conversation ID. Defaults to the active conversation.");
}

fn subcommand_chat() -> Command {
    return Command::new("chat")
        .about("Send a message in the active conversation, creating one if there is none.")
        .arg(
            Arg::new("message")
                .help("Message to send.")
                .required(true),
        )
        .arg(arg_model("Model to talk to. Defaults to the active conversation's model, then the model selected in the hub preferences."))
        .arg(
            Arg::new("hub")
                .long("hub")
                .help("Talk to the AI hub instead, using its own history and selected model.")
                .action(ArgAction::SetTrue)
                .conflicts_with("model"),
        );
}

fn subcommand_conversations_delete() -> Command {
    return Command::new("delete")
        .about("Delete one or all conversations.")
        .arg(
            clap::Arg::new("id")
                .short('i')
                .long("id")
                .help("Conversation ID")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("all")
                .long("all")
                .help("Delete all conversations.")
                .action(ArgAction::SetTrue),
        )
        .group(
            ArgGroup::new("delete-args")
                .args(["id", "all"])
                .required(true),
        );
}

fn subcommand_conversations() -> Command {
    return Command::new("conversations")
        .about("Manage chat conversations.")
        .arg_required_else_help(true)
        .subcommand(Command::new("dir").about("Print the storage directory path."))
        .subcommand(Command::new("list").about("List all conversations, newest first. The active one is marked with *."))
        .subcommand(
            Command::new("new")
                .about("Start a new conversation and make it active.")
                .arg(arg_model("Model for the new conversation. Defaults to the model selected in the hub preferences.")),
        )
        .subcommand(
            Command::new("open")
                .about("Make a conversation active by ID. Omit passing an ID to load an interactive selection.")
                .arg(arg_conversation_id()),
        )
        .subcommand(
            Command::new("show")
                .about("Print a conversation's messages.")
                .arg(arg_conversation_id()),
        )
        .subcommand(
            Command::new("rename")
                .about("Change a conversation's title.")
                .arg(Arg::new("title").help("New title.").required(true))
                .arg(arg_conversation_id()),
        )
        .subcommand(
            Command::new("model")
                .about("Switch the model a conversation talks to.")
                .arg(Arg::new("name").help("Model ID, see `ktg-hub models`.").required(true))
                .arg(arg_conversation_id()),
        )
        .subcommand(subcommand_conversations_delete());
}

fn subcommand_intro() -> Command {
    return Command::new("intro")
        .about("Inspect and drive the first session introduction.")
        .arg_required_else_help(true)
        .subcommand(Command::new("status").about("Show whether the next visit is a first session."))
        .subcommand(
            Command::new("simulate")
                .about("Scroll through the page and report when the introduction would show.")
                .arg(
                    Arg::new("positions")
                        .short('p')
                        .long("positions")
                        .help("Comma separated scroll positions to visit in order.")
                        .value_parser(value_parser!(u32))
                        .value_delimiter(',')
                        .num_args(1..)
                        .required(true),
                )
                .arg(
                    Arg::new("target-top")
                        .long("target-top")
                        .help("Offset of the hub section from the top of the page.")
                        .value_parser(value_parser!(u32))
                        .default_value("2000"),
                )
                .arg(
                    Arg::new("target-height")
                        .long("target-height")
                        .help("Height of the hub section.")
                        .value_parser(value_parser!(u32))
                        .default_value("800"),
                )
                .arg(
                    Arg::new("viewport-height")
                        .long("viewport-height")
                        .help("Height of the visible area.")
                        .value_parser(value_parser!(u32))
                        .default_value("1000"),
                )
                .arg(
                    Arg::new("content-height")
                        .long("content-height")
                        .help("Height of the whole page.")
                        .value_parser(value_parser!(u32))
                        .default_value("6000"),
                )
                .arg(
                    Arg::new("dismiss")
                        .long("dismiss")
                        .help("Dismiss the introduction as soon as it shows.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("dismiss").about("Mark the introduction as seen."))
        .subcommand(Command::new("reset").about("Forget that the introduction was seen."));
}

fn subcommand_prefs() -> Command {
    return Command::new("prefs")
        .about("Show or change the AI hub preferences.")
        .subcommand(Command::new("show").about("Show the current preferences."))
        .subcommand(
            Command::new("model")
                .about("Select the hub's model.")
                .arg(Arg::new("name").help("Model ID, see `ktg-hub models`.").required(true)),
        )
        .subcommand(Command::new("clear-messages").about("Forget the hub's chat history."));
}

fn subcommand_models() -> Command {
    return Command::new("models")
        .about("List the models a conversation can use.")
        .arg(
            Arg::new("remote")
                .long("remote")
                .help("List the models advertised by the gateway instead.")
                .action(ArgAction::SetTrue),
        );
}

pub fn build() -> Command {
    let storage_keys = format!(
        "{}\n  Conversations, the active conversation and hub preferences are saved as JSON under --storage-dir.",
        "STORAGE:".underline().bold()
    );

    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("ktg-hub")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(storage_keys)
        .arg_required_else_help(false)
        .subcommand(subcommand_chat())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_conversations())
        .subcommand(subcommand_debug())
        .subcommand(subcommand_intro())
        .subcommand(Command::new("manpages").about("Generates manpages and outputs to stdout."))
        .subcommand(subcommand_models())
        .subcommand(subcommand_prefs())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("KTG_HUB_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::Storage.to_string())
                .long(ConfigKey::Storage.to_string())
                .env("KTG_HUB_STORAGE")
                .num_args(1)
                .help(format!("Storage backend for conversations and hub preferences. [default: {}]", Config::default(ConfigKey::Storage)))
                .value_parser(PossibleValuesParser::new(StorageName::VARIANTS))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::StorageDir.to_string())
                .long(ConfigKey::StorageDir.to_string())
                .env("KTG_HUB_STORAGE_DIR")
                .num_args(1)
                .help(format!("Directory the file storage writes to. [default: {}]", Config::default(ConfigKey::StorageDir)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::GatewayUrl.to_string())
                .long(ConfigKey::GatewayUrl.to_string())
                .env("KTG_HUB_GATEWAY_URL")
                .num_args(1)
                .help(format!("OpenAI compatible model gateway URL. [default: {}]", Config::default(ConfigKey::GatewayUrl)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::GatewayToken.to_string())
                .long(ConfigKey::GatewayToken.to_string())
                .env("KTG_HUB_GATEWAY_TOKEN")
                .num_args(1)
                .help("Model gateway API token.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::GatewayHealthCheckTimeout.to_string())
                .long(ConfigKey::GatewayHealthCheckTimeout.to_string())
                .env("KTG_HUB_GATEWAY_HEALTH_CHECK_TIMEOUT")
                .num_args(1)
                .help(format!("Time to wait in milliseconds before timing out when health checking the model gateway. [default: {}]", Config::default(ConfigKey::GatewayHealthCheckTimeout)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::GatewayStallTimeout.to_string())
                .long(ConfigKey::GatewayStallTimeout.to_string())
                .env("KTG_HUB_GATEWAY_STALL_TIMEOUT")
                .num_args(1)
                .help(format!("Time to wait in milliseconds for the next token before giving up on a streamed reply. [default: {}]", Config::default(ConfigKey::GatewayStallTimeout)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::TriggerPosition.to_string())
                .long(ConfigKey::TriggerPosition.to_string())
                .env("KTG_HUB_TRIGGER_POSITION")
                .num_args(1)
                .help(format!("Where the hub section trigger starts, as \"<element edge> <viewport line>\". [default: {}]", Config::default(ConfigKey::TriggerPosition)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::SystemPrompt.to_string())
                .long(ConfigKey::SystemPrompt.to_string())
                .env("KTG_HUB_SYSTEM_PROMPT")
                .num_args(1)
                .help("System prompt sent ahead of every conversation. Uses the built in hub prompt when empty.")
                .global(true),
        );
}

pub async fn parse() -> Result<()> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => match debug_matches.subcommand() {
            Some(("log-path", _)) => {
                println!("{}", log_dir().join("debug.log").to_string_lossy());
            }
            Some(("enum-config", _)) => {
                println!("{}", ConfigKey::VARIANTS.join("\n"));
            }
            _ => {
                subcommand_debug().print_long_help()?;
            }
        },
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
            }
            _ => {
                subcommand_config().print_long_help()?;
            }
        },
        Some(("manpages", _)) => {
            clap_mangen::Man::new(build()).render(&mut io::stdout())?;
        }
        Some((name, subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            let context = AppContext::from_config()?;

            match name {
                "chat" => run_chat(&context, subcmd_matches).await?,
                "conversations" => run_conversations(&context, subcmd_matches)?,
                "intro" => run_intro(&context, subcmd_matches)?,
                "models" => run_models(&context, subcmd_matches).await?,
                "prefs" => run_prefs(&context, subcmd_matches)?,
                _ => bail!(format!("Unknown command {name}")),
            }
        }
        None => {
            build().print_long_help()?;
        }
    }

    return Ok(());
}
