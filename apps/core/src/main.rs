// Welcome Book chatbot entry point
// `serve` runs the HTTP API, `chat` talks to the bot from the terminal.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};
use welcomebook_core::actors::{QuestionRecorderHandle, QuestionStore};
use welcomebook_core::database::{self, SqliteQuestionStore};
use welcomebook_core::fs_manager::PortablePathManager;
use welcomebook_core::render::{typing_frames, RenderedMessage, TerminalRenderer};
use welcomebook_core::server::{self, AppState};
use welcomebook_core::telemetry::{init_tracing, LogFormat};
use welcomebook_core::{ChatSession, EngineHandle, KnowledgeBase};

#[derive(Debug, Parser)]
#[command(name = "welcomebook", version, about = "Welcome Book keyword chatbot")]
struct Cli {
    /// Chatbot configuration document (keywords and responses)
    #[arg(long, env = "WELCOMEBOOK_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log output format: pretty or json
    #[arg(long, env = "WELCOMEBOOK_LOG_FORMAT", default_value = "pretty", global = true)]
    log_format: LogFormat,

    /// Address the HTTP API listens on
    #[arg(long, env = "WELCOMEBOOK_BIND", default_value = "127.0.0.1:3000", global = true)]
    bind: SocketAddr,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Chat with the bot in the terminal
    Chat {
        /// Pause before the bot answers
        #[arg(long, default_value_t = 500)]
        reply_delay_ms: u64,
        /// Pause between typed characters of text answers
        #[arg(long, default_value_t = 15)]
        typing_delay_ms: u64,
        /// Do not record questions in the question log
        #[arg(long)]
        no_record: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(cli.log_format).context("failed to install tracing subscriber")?;

    PortablePathManager::init().context("failed to initialize data directories")?;
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(PortablePathManager::default_config_path);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server(cli.bind, config_path).await,
        Command::Chat {
            reply_delay_ms,
            typing_delay_ms,
            no_record,
        } => {
            run_terminal_chat(
                config_path,
                Duration::from_millis(reply_delay_ms),
                Duration::from_millis(typing_delay_ms),
                !no_record,
            )
            .await
        }
    }
}

async fn run_server(bind: SocketAddr, config_path: PathBuf) -> anyhow::Result<()> {
    let engine = EngineHandle::disabled();
    match KnowledgeBase::load(&config_path).await {
        Ok(knowledge) => {
            engine.install(knowledge);
        }
        Err(e) if e.is_config_error() => {
            error!("{}. Chat input is disabled until POST /api/admin/reload succeeds.", e);
        }
        Err(e) => return Err(e.into()),
    }

    let pool = database::init_db().await.context("failed to open question log")?;
    let store: Arc<dyn QuestionStore> = Arc::new(SqliteQuestionStore::new(pool));
    let recorder = QuestionRecorderHandle::spawn(store.clone());

    let state = AppState {
        engine,
        store,
        recorder: recorder.clone(),
        config_path,
    };
    server::serve(bind, state).await?;

    recorder.flush().await.ok();
    recorder.shutdown().await.ok();
    Ok(())
}

async fn run_terminal_chat(
    config_path: PathBuf,
    reply_delay: Duration,
    typing_delay: Duration,
    record: bool,
) -> anyhow::Result<()> {
    let knowledge = KnowledgeBase::load(&config_path)
        .await
        .with_context(|| format!("cannot start chat without a valid configuration ({:?})", config_path))?;

    // The chat keeps working when the question log is unavailable
    let recorder = if record {
        match database::init_db().await {
            Ok(pool) => Some(QuestionRecorderHandle::spawn(Arc::new(SqliteQuestionStore::new(pool)))),
            Err(e) => {
                warn!("Question log unavailable, questions will not be recorded: {}", e);
                None
            }
        }
    } else {
        None
    };

    let renderer = TerminalRenderer;
    let mut session = ChatSession::new(&knowledge);
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    info!(session = %session.id(), "Terminal chat started");
    stdout
        .write_all(b"Type a question, a quick reply number, /hide, /show or /quit.\n")
        .await?;
    if let Some(greeting) = session.open(&knowledge, &renderer) {
        print_bot(&mut stdout, &greeting, typing_delay).await?;
    }

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match ChatCommand::parse(input) {
            Some(ChatCommand::Quit) => break,
            Some(command @ (ChatCommand::Show | ChatCommand::Hide)) => {
                let visible = command == ChatCommand::Show;
                session.set_visible(visible);
                let state = if visible { "opened" } else { "closed" };
                stdout.write_all(format!("(chat {})\n", state).as_bytes()).await?;
                continue;
            }
            None => {}
        }
        if !session.is_visible() {
            continue;
        }

        let text = match input.parse::<usize>() {
            Ok(position) if session.quick_replies_visible() => session
                .quick_reply(position)
                .map(|reply| reply.utterance.clone())
                .unwrap_or_else(|| input.to_string()),
            _ => input.to_string(),
        };

        if let Some(turn) = session.handle(&text, &knowledge, recorder.as_ref(), &renderer) {
            sleep(reply_delay).await;
            print_bot(&mut stdout, &turn.bot, typing_delay).await?;
        }
    }

    if let Some(recorder) = recorder {
        recorder.flush().await.ok();
        recorder.shutdown().await.ok();
    }
    Ok(())
}

/// Slash commands of the terminal chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChatCommand {
    Quit,
    Show,
    Hide,
}

impl ChatCommand {
    fn parse(input: &str) -> Option<Self> {
        match input {
            "/quit" | "/esci" => Some(ChatCommand::Quit),
            "/show" => Some(ChatCommand::Show),
            "/hide" => Some(ChatCommand::Hide),
            _ => None,
        }
    }
}

async fn print_bot(
    stdout: &mut tokio::io::Stdout,
    message: &RenderedMessage,
    typing_delay: Duration,
) -> std::io::Result<()> {
    if message.animate_typing && !typing_delay.is_zero() {
        let mut printed = 0;
        for frame in typing_frames(&message.body) {
            stdout.write_all(frame[printed..].as_bytes()).await?;
            stdout.flush().await?;
            printed = frame.len();
            sleep(typing_delay).await;
        }
    } else {
        stdout.write_all(message.body.as_bytes()).await?;
    }
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}
