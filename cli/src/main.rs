// Copyright (c) 2026 Veritel Contributors
// SPDX-License-Identifier: AGPL-3.0

//! # Veritel CLI
//!
//! The `veritel` binary runs the chat orchestrator and launches the
//! ACA-Py agents it drives.
//!
//! ## Commands
//!
//! - `veritel serve` — run the chat orchestrator HTTP API
//! - `veritel agent start <issuer|holder|verifier>` — launch one agent
//! - `veritel config show|validate|generate` — configuration management

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{AgentCommand, ConfigCommand};

/// Veritel — chat-driven credential orchestrator
#[derive(Parser)]
#[command(name = "veritel")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "VERITEL_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "VERITEL_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the chat orchestrator HTTP API
    Serve,

    /// Manage the ACA-Py agent processes
    Agent {
        #[command(subcommand)]
        command: AgentCommand,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Serve => commands::serve::run(cli.config.as_deref()).await,
        Commands::Agent { command } => commands::agent::handle_command(command).await,
        Commands::Config { command } => {
            commands::config::handle_command(command, cli.config.clone()).await
        }
    }
}
