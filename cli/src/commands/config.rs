// Copyright (c) 2026 Veritel Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use veritel_core::domain::config::OrchestratorConfig;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./veritel.yaml)
        #[arg(short, long, default_value = "./veritel.yaml")]
        output: PathBuf,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths),
        ConfigCommand::Validate { file } => validate(file.or(config_override)),
        ConfigCommand::Generate { output } => generate(output),
    }
}

fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = OrchestratorConfig::load_or_default(config_override.as_deref())
        .context("failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        for (index, path) in OrchestratorConfig::discovery_paths().iter().enumerate() {
            println!("  {}. {}", index + 2, path.display());
        }
        println!();
    }

    println!("{}", "Agents:".bold());
    for (name, endpoint) in [
        ("issuer", &config.agents.issuer),
        ("holder", &config.agents.holder),
        ("verifier", &config.agents.verifier),
    ] {
        println!(
            "  {} ({}) → {}",
            name.bold(),
            endpoint.label,
            endpoint.admin_url
        );
    }
    println!();

    println!("{}", "Classifier:".bold());
    println!("  Endpoint: {}", config.classifier.endpoint);
    println!("  Model: {}", config.classifier.model);
    println!();

    println!("{}", "HTTP:".bold());
    println!("  Bind: {}:{}", config.http.host, config.http.port);
    println!("  Request timeout: {}s", config.request_timeout_secs);

    Ok(())
}

fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = OrchestratorConfig::load_or_default(config_path.as_deref())
        .context("failed to load configuration")?;
    config
        .validate()
        .context("configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());
    Ok(())
}

fn generate(output: PathBuf) -> Result<()> {
    let sample = OrchestratorConfig::default().to_yaml();
    std::fs::write(&output, sample)
        .with_context(|| format!("failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );
    Ok(())
}
