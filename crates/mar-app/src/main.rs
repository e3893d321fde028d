//! MAR application binary: composition root.
//!
//! 1. Parse CLI flags and load configuration from TOML plus environment
//! 2. Initialize tracing
//! 3. Either serve the HTTP API or run a terminal conversation client

mod cli;

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use mar_api::{start_server, AppState};
use mar_chat::ResponseOrchestrator;
use mar_client::{
    ConversationClient, HttpTransport, LocalTransport, OrchestratorTransport, SilentSpeech,
    SubmitOutcome, SuggestionOutcome, SUGGESTIONS,
};
use mar_core::{ChatMessage, MarConfig, LANGUAGES};

use cli::{CliArgs, Command};

async fn serve(config: MarConfig) -> Result<(), Box<dyn std::error::Error>> {
    let orchestrator = ResponseOrchestrator::from_config(&config)?;
    let state = AppState::new(config.clone(), orchestrator);
    start_server(&config, state).await?;
    Ok(())
}

// =============================================================================
// Terminal chat
// =============================================================================

const HELP: &str = "Commands: /lang <code>, /languages, /speech, /suggest [n], /clear, /quit";

fn print_message(message: &ChatMessage) {
    println!("MAR: {}", message.text);
    if let Some(ref image) = message.image_url {
        println!("  [image] {}", image);
    }
    if let Some(ref location) = message.location {
        println!("  [location] {}", location);
    }
}

fn print_outcome(outcome: &SubmitOutcome) {
    match outcome {
        SubmitOutcome::Ignored => {}
        SubmitOutcome::Busy => println!("(still waiting for the previous reply)"),
        SubmitOutcome::Replied(m) | SubmitOutcome::Failed(m) => print_message(m),
    }
}

/// Handle a slash command. Returns false when the session should end.
async fn run_command(client: &ConversationClient, line: &str) -> bool {
    let mut parts = line.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    match name {
        "/quit" | "/exit" => return false,
        "/clear" => client.clear_history(),
        "/speech" => {
            client.toggle_playback();
        }
        "/languages" => {
            for lang in LANGUAGES {
                println!("  {} {} ({})", lang.flag, lang.name, lang.code);
            }
        }
        "/lang" => match arg {
            Some(code) => {
                if let Err(e) = client.set_language(code) {
                    println!("{}", e);
                }
            }
            None => println!("Usage: /lang <code>"),
        },
        "/suggest" => match arg.and_then(|n| n.parse::<usize>().ok()) {
            Some(n) if (1..=SUGGESTIONS.len()).contains(&n) => {
                let suggestion = &SUGGESTIONS[n - 1];
                println!("You: {}", suggestion.text);
                match client.choose_suggestion(suggestion).await {
                    SuggestionOutcome::Submitted(outcome) => print_outcome(&outcome),
                    SuggestionOutcome::Redirect(url) => println!("Open {}", url),
                }
            }
            _ => {
                for (i, s) in SUGGESTIONS.iter().enumerate() {
                    println!("  {}. {} {}", i + 1, s.icon, s.text);
                }
            }
        },
        _ => println!("{}", HELP),
    }
    println!("[{}]", client.status());
    true
}

async fn chat(
    mut config: MarConfig,
    server: Option<String>,
    local: bool,
    language: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let transport: Arc<dyn OrchestratorTransport> = if local {
        let orchestrator = ResponseOrchestrator::from_config(&config)?;
        Arc::new(LocalTransport::new(Arc::new(orchestrator)))
    } else {
        if let Some(url) = server {
            config.client.server_url = url;
        }
        tracing::info!(server = %config.client.server_url, "Using remote orchestrator");
        Arc::new(HttpTransport::new(&config.client)?)
    };

    let client = ConversationClient::from_config(&config.client, transport, Arc::new(SilentSpeech));
    if let Some(code) = language {
        client.set_language(&code)?;
    }

    println!("{}", client.status());
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.starts_with('/') {
            if !run_command(&client, line).await {
                break;
            }
            continue;
        }
        print_outcome(&client.submit(line).await);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config_file = args.resolve_config_path();
    let mut config =
        MarConfig::load_or_default(&config_file).with_env_overrides(|k| std::env::var(k).ok());
    config.general.log_level = args.resolve_log_level(&config.general.log_level);
    config.general.port = args.resolve_port(config.general.port);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.general.log_level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting MAR v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    match args.command() {
        Command::Serve { .. } => serve(config).await,
        Command::Chat {
            server,
            local,
            language,
        } => chat(config, server, local, language).await,
    }
}
