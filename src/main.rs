//! polybot - persona-switching assistant REPL.

use anyhow::Result;
use clap::Parser;
use polybot::agent::AgentRunner;
use polybot::config::Config;
use polybot::dispatcher::Dispatcher;
use polybot::errors::DispatchError;
use polybot::llm;
use polybot::mcp::client::McpClient;
use polybot::retry::RetryPolicy;
use polybot::tools;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const APOLOGY: &str = "Sorry, I ran into a problem answering that. Please try again.";

#[derive(Parser, Debug)]
#[command(name = "polybot", about = "Persona-switching chat assistant")]
struct Args {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// One-shot prompt; skips the REPL
    #[arg(short = 'm', long)]
    prompt: Option<String>,

    /// User id to dispatch as
    #[arg(long, default_value = "local")]
    user: String,

    /// Override the chat model
    #[arg(long)]
    model: Option<String>,

    /// Override the tool server URL
    #[arg(long)]
    mcp_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    if let Some(model) = &args.model {
        cfg.model = model.clone();
    }
    if let Some(url) = &args.mcp_url {
        cfg.mcp_url = url.clone();
    }
    if cfg.api_key.is_empty() {
        eprintln!("[polybot] OPENROUTER_API_KEY is not set; model calls will fail");
    }

    let llm_client = Arc::new(llm::Client::new(
        &cfg.base_url,
        &cfg.api_key,
        Duration::from_secs(120),
    )?);
    let runner = AgentRunner::new(llm_client, &cfg.model);

    let dispatcher = Arc::new(
        Dispatcher::new(runner, vec![tools::weather::descriptor()])
            .with_agent_timeout(cfg.agent_timeout()),
    );

    // Discover remote tools before accepting any input
    let mcp = Arc::new(McpClient::new(&cfg.mcp_url, Duration::from_secs(30))?);
    dispatcher
        .initialize(
            mcp,
            RetryPolicy::new(cfg.discovery_attempts, cfg.discovery_backoff()),
        )
        .await;

    if dispatcher.list_personas().is_empty() {
        anyhow::bail!("persona catalog failed to build; refusing to start");
    }

    if let Some(prompt) = &args.prompt {
        match dispatcher.dispatch(&args.user, prompt).await {
            Ok(answer) => println!("{}", answer),
            Err(e) => {
                eprintln!("[polybot] dispatch failed: {}", e);
                println!("{}", APOLOGY);
            }
        }
        return Ok(());
    }

    run_repl(&args.user, dispatcher).await
}

async fn run_repl(user: &str, dispatcher: Arc<Dispatcher>) -> Result<()> {
    println!("polybot ready. /personas lists modes, /mode <id> switches, /quit exits.");

    let mut editor = DefaultEditor::new()?;
    loop {
        let prompt = format!("[{}]> ", dispatcher.get_mode(user));
        match editor.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);

                if let Some(rest) = line.strip_prefix('/') {
                    if handle_command(user, &dispatcher, rest) {
                        break;
                    }
                    continue;
                }

                match dispatcher.dispatch(user, line).await {
                    Ok(answer) => println!("{}", answer),
                    Err(DispatchError::Agent(e)) => {
                        eprintln!("[polybot] {}", e);
                        println!("{}", APOLOGY);
                    }
                    Err(e) => {
                        eprintln!("[polybot] {}", e);
                        println!("{}", APOLOGY);
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("[polybot] readline error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Returns true when the REPL should exit.
fn handle_command(user: &str, dispatcher: &Dispatcher, command: &str) -> bool {
    let mut parts = command.splitn(2, ' ');
    match (parts.next().unwrap_or(""), parts.next()) {
        ("quit", _) | ("exit", _) => return true,
        ("personas", _) | ("modes", _) => {
            for p in dispatcher.list_personas() {
                println!("  {:<8} {} - {}", p.id, p.display_name, p.description);
            }
        }
        ("mode", Some(id)) => match dispatcher.set_mode(user, id.trim()) {
            Ok(()) => println!("Switched to {} mode.", id.trim()),
            Err(DispatchError::UnknownPersona(id)) => {
                let valid: Vec<String> = dispatcher
                    .list_personas()
                    .into_iter()
                    .map(|p| p.id)
                    .collect();
                println!("Unknown mode '{}'. Valid modes: {}", id, valid.join(", "));
            }
            Err(e) => println!("Could not switch mode: {}", e),
        },
        ("mode", None) => println!("Current mode: {}", dispatcher.get_mode(user)),
        ("help", _) => {
            println!("  /personas       - list available modes");
            println!("  /mode <id>      - switch mode");
            println!("  /mode           - show current mode");
            println!("  /quit           - exit");
        }
        (other, _) => println!("Unknown command '/{}'. Try /help.", other),
    }
    false
}
