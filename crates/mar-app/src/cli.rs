//! CLI argument definitions for the MAR binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// MAR: a voice and text chat assistant.
#[derive(Parser, Debug)]
#[command(name = "mar", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the HTTP API server (default).
    Serve {
        /// API server port.
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,
    },
    /// Chat with the assistant from the terminal.
    Chat {
        /// Server to talk to instead of the configured one.
        #[arg(short = 's', long = "server")]
        server: Option<String>,

        /// Run the orchestrator in-process instead of over HTTP.
        #[arg(long = "local")]
        local: bool,

        /// Initial language code, e.g. ceb-PH.
        #[arg(long = "language")]
        language: Option<String>,
    },
}

impl CliArgs {
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Serve { port: None })
    }

    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > MAR_CONFIG env var > ~/.mar/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        self.resolve_config_path_with(|k| std::env::var(k).ok())
    }

    fn resolve_config_path_with(&self, env: impl Fn(&str) -> Option<String>) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Some(p) = env("MAR_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path(env("HOME"))
    }

    /// Resolve the API server port.
    ///
    /// Priority: --port flag > MAR_PORT env var > config file value > 3030.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        self.resolve_port_with(config_port, |k| std::env::var(k).ok())
    }

    fn resolve_port_with(&self, config_port: u16, env: impl Fn(&str) -> Option<String>) -> u16 {
        if let Some(Command::Serve { port: Some(p) }) = &self.command {
            return *p;
        }
        if let Some(p) = env("MAR_PORT").and_then(|v| v.parse::<u16>().ok()) {
            return p;
        }
        if config_port != 0 {
            return config_port;
        }
        3030
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

fn default_config_path(home: Option<String>) -> PathBuf {
    match home {
        Some(home) => PathBuf::from(home).join(".mar").join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}
