use std::io;
use std::path::PathBuf;

use chat_transport_mock::MockAgent;
use clap::Parser;
use console_chat::pump::drain_pending;
use console_chat::{logging, ChatConfig, ChatService};
use time::OffsetDateTime;

mod script;
mod setup;

use script::Step;

#[derive(Parser)]
#[command(name = "chat-replay")]
#[command(about = "Replay a recorded agent fragment stream and print the transcript", long_about = None)]
struct Cli {
    /// Script with one fragment, prompt or confirmation per line
    script: PathBuf,

    /// Session id; defaults to CONSOLE_CHAT_SESSION_ID or "default"
    #[arg(long)]
    session: Option<String>,

    /// Expand reasoning regions of assistant turns
    #[arg(long)]
    expand_thinking: bool,

    /// Active cluster attached to prompts
    #[arg(long)]
    cluster: Option<String>,

    /// Selected namespace attached to prompts; repeatable
    #[arg(long = "namespace")]
    namespaces: Vec<String>,

    /// Extra `tag=value` context attached to prompts; repeatable
    #[arg(long = "context")]
    contexts: Vec<String>,

    /// Agent configuration secret manifest; its provider and model are reported
    #[arg(long)]
    agent_secret: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let mut config = ChatConfig::from_env();
    if let Some(session) = cli.session {
        config.session_id = session;
    }
    config.expand_thinking |= cli.expand_thinking;
    logging::init(&config);

    let steps = script::load(&cli.script).map_err(io::Error::other)?;
    let registry =
        setup::context_registry(cli.cluster.as_deref(), &cli.namespaces, &cli.contexts)
            .map_err(io::Error::other)?;
    let profile = match &cli.agent_secret {
        Some(path) => setup::load_agent_profile(path).map_err(io::Error::other)?,
        None => None,
    };
    let session_id = config.session_id.clone();

    let mut service = ChatService::new(config);
    service.init_session(&session_id);
    service.select_context(registry.all());
    let (agent, mut events) = MockAgent::new(session_id.clone());

    agent.open();
    drain_pending(&mut service, &agent, &mut events);

    for step in steps {
        match step {
            Step::Fragment(text) => agent.push(text),
            Step::Prompt(text) => {
                if let Err(error) = service.send_message(&session_id, &text, &agent) {
                    tracing::warn!(%error, "prompt was not sent");
                }
            }
            Step::Confirm(accepted) => {
                let pending = service
                    .messages(&session_id)
                    .filter(|message| message.has_pending_confirmation())
                    .last()
                    .map(|message| message.id);
                match pending {
                    Some(id) => service
                        .confirm_message(&session_id, id, accepted, &agent)
                        .map_err(io::Error::other)?,
                    None => tracing::warn!("no pending confirmation to answer"),
                }
            }
        }
        drain_pending(&mut service, &agent, &mut events);
    }

    let transcript = service
        .export_transcript(&session_id, OffsetDateTime::now_utc().date())
        .map_err(io::Error::other)?;

    if let Some(profile) = &profile {
        println!("# agent: {} ({})", profile.provider.display_name(), profile.model);
    }
    println!("# {}", transcript.file_name);
    println!("{}", transcript.content);
    println!();
    println!("phase: {}", service.phase(&session_id).as_str());
    println!("frames sent: {}", agent.sent().len());
    if let Some(error) = service.error(&session_id) {
        println!("error ({}): {}", error.kind.as_str(), error.message);
    }

    Ok(())
}
