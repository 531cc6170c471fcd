//! `transcript-chat`: stream chat replies from a backend into the terminal.
//!
//! Sends one message with `--message`, otherwise reads messages from stdin
//! line by line. Replies are printed as they arrive.

mod render;

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use transcript::{ChatSession, ExchangeOutcome, SessionConfig};
use transcript_stream::HttpTransport;
use transcript_types::ChatTransport;

use render::Renderer;

#[derive(Parser)]
#[command(name = "transcript-chat")]
#[command(about = "Chat with a streaming backend from the terminal")]
#[command(version)]
struct Args {
    /// Backend base URL
    #[arg(short, long, env = "CHAT_API_URL", default_value = "http://localhost:8000")]
    url: String,

    /// Thread id to resume (a fresh one is generated otherwise)
    #[arg(short, long)]
    thread_id: Option<String>,

    /// Send a single message and exit
    #[arg(short, long)]
    message: Option<String>,

    /// Check the backend health endpoint before chatting
    #[arg(long)]
    check_health: bool,

    /// Print the final transcript as JSON on exit
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let transport = HttpTransport::new().base_url(&args.url);
    if args.check_health {
        transport
            .check_health()
            .await
            .with_context(|| format!("backend at {} is not healthy", args.url))?;
    }

    let mut config = SessionConfig::default();
    if let Some(thread_id) = args.thread_id {
        config = config.with_thread_id(thread_id);
    }
    let mut session = ChatSession::with_config(transport, config);
    tracing::info!(thread_id = %session.thread_id(), url = %args.url, "session started");

    let mut renderer = Renderer::new();
    match args.message {
        Some(text) => {
            exchange(&mut session, &mut renderer, &text).await?;
        }
        None => {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            prompt()?;
            while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
                if exchange(&mut session, &mut renderer, &line).await? != ExchangeOutcome::Ignored {
                    println!();
                }
                prompt()?;
            }
        }
    }

    if args.json {
        let snapshot = session.snapshot();
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).context("failed to serialize transcript")?
        );
    }
    Ok(())
}

/// Run one exchange, rendering each published snapshot as it arrives.
async fn exchange<T: ChatTransport>(
    session: &mut ChatSession<T>,
    renderer: &mut Renderer,
    text: &str,
) -> Result<ExchangeOutcome> {
    let mut updates = session.subscribe();
    let mut stdout = std::io::stdout();

    let outcome = {
        let send = session.send_message(text);
        tokio::pin!(send);
        loop {
            tokio::select! {
                outcome = &mut send => break outcome,
                Ok(()) = updates.changed() => {
                    let snapshot = updates.borrow_and_update().clone();
                    renderer.render(&snapshot, &mut stdout).context("failed to write reply")?;
                }
            }
        }
    };

    renderer
        .render(&session.snapshot(), &mut stdout)
        .context("failed to write reply")?;
    if outcome == ExchangeOutcome::Exhausted {
        tracing::warn!("reply ended without a completion status");
    }
    Ok(outcome)
}

fn prompt() -> Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ").context("failed to write prompt")?;
    stdout.flush().context("failed to write prompt")
}
