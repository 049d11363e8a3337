// Copyright (c) 2026 Veritel Contributors
// SPDX-License-Identifier: AGPL-3.0

//! `veritel agent`: launch the ACA-Py agent processes the orchestrator
//! drives. Each role gets the argument set of the reference deployment;
//! ledger and wallet secrets are overridable.

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use colored::Colorize;
use tokio::process::Command;
use tracing::info;

#[derive(Subcommand)]
pub enum AgentCommand {
    /// Start one agent in the foreground (Ctrl-C stops it)
    Start(StartArgs),

    /// Print the aca-py command line for a role without running it
    Show {
        #[arg(value_enum)]
        role: Role,
    },
}

#[derive(Args)]
pub struct StartArgs {
    #[arg(value_enum)]
    pub role: Role,

    /// Path to the aca-py binary
    #[arg(long, default_value = "aca-py")]
    pub binary: String,

    /// Genesis transactions URL of the local ledger
    #[arg(long, default_value = "http://localhost:9000/genesis")]
    pub genesis_url: String,

    /// Ledger pool name
    #[arg(long, default_value = "localindypool")]
    pub ledger_pool: String,

    /// Wallet seed (32 chars)
    #[arg(long, env = "VERITEL_AGENT_SEED", default_value = "000000000000000000000000Steward1")]
    pub seed: String,

    /// Wallet key
    #[arg(long, env = "VERITEL_WALLET_KEY", default_value = "123456")]
    pub wallet_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Role {
    Issuer,
    Holder,
    Verifier,
}

impl Role {
    fn name(self) -> &'static str {
        match self {
            Role::Issuer => "Issuer",
            Role::Holder => "Holder",
            Role::Verifier => "Verifier",
        }
    }

    fn inbound_port(self) -> u16 {
        match self {
            Role::Issuer => 8000,
            Role::Holder => 8010,
            Role::Verifier => 8020,
        }
    }

    fn admin_port(self) -> u16 {
        self.inbound_port() + 1
    }

    fn wallet_name(self) -> &'static str {
        match self {
            Role::Issuer => "issuer_wallet",
            Role::Holder => "holder_wallet",
            Role::Verifier => "verifier_wallet",
        }
    }

    /// Role-specific auto-behavior flags. The issuer auto-responds to
    /// credential protocol messages, the holder stores credentials and
    /// answers presentation requests, the verifier only needs public
    /// invites.
    fn extra_flags(self) -> &'static [&'static str] {
        match self {
            Role::Issuer => &[
                "--public-invites",
                "--auto-respond-credential-proposal",
                "--auto-respond-credential-request",
                "--requests-through-public-did",
            ],
            Role::Holder => &[
                "--auto-respond-credential-offer",
                "--auto-store-credential",
                "--auto-respond-presentation-request",
                "--auto-respond-presentation-proposal",
            ],
            Role::Verifier => &["--public-invites"],
        }
    }
}

/// Build the full aca-py argument list for a role.
pub fn build_args(args: &StartArgs) -> Vec<String> {
    let role = args.role;
    let mut argv: Vec<String> = vec![
        "start".into(),
        "--inbound-transport".into(),
        "http".into(),
        "0.0.0.0".into(),
        role.inbound_port().to_string(),
        "--outbound-transport".into(),
        "ws".into(),
        "--outbound-transport".into(),
        "http".into(),
        "--endpoint".into(),
        format!("http://localhost:{}", role.inbound_port()),
        "--label".into(),
        role.name().into(),
        "--seed".into(),
        args.seed.clone(),
        "--genesis-url".into(),
        args.genesis_url.clone(),
        "--ledger-pool-name".into(),
        args.ledger_pool.clone(),
        "--wallet-key".into(),
        args.wallet_key.clone(),
        "--wallet-name".into(),
        role.wallet_name().into(),
        "--wallet-type".into(),
        "askar-anoncreds".into(),
        "--admin".into(),
        "0.0.0.0".into(),
        role.admin_port().to_string(),
        "--admin-insecure-mode".into(),
        "--auto-provision".into(),
        "--auto-accept-invites".into(),
        "--auto-accept-requests".into(),
        "--auto-ping-connection".into(),
        "--auto-respond-messages".into(),
    ];
    argv.extend(role.extra_flags().iter().map(|flag| flag.to_string()));
    argv
}

pub async fn handle_command(command: AgentCommand) -> Result<()> {
    match command {
        AgentCommand::Start(args) => start(args).await,
        AgentCommand::Show { role } => {
            let args = StartArgs {
                role,
                binary: "aca-py".into(),
                genesis_url: "http://localhost:9000/genesis".into(),
                ledger_pool: "localindypool".into(),
                seed: "000000000000000000000000Steward1".into(),
                wallet_key: "123456".into(),
            };
            println!("aca-py {}", build_args(&args).join(" "));
            Ok(())
        }
    }
}

async fn start(args: StartArgs) -> Result<()> {
    let role = args.role;
    println!(
        "{}",
        format!(
            "Starting {} agent (admin port {})...",
            role.name(),
            role.admin_port()
        )
        .bold()
    );

    let mut child = Command::new(&args.binary)
        .args(build_args(&args))
        .spawn()
        .with_context(|| format!("failed to spawn {} (is aca-py installed?)", args.binary))?;

    tokio::select! {
        status = child.wait() => {
            let status = status.context("agent process error")?;
            if status.success() {
                info!(role = role.name(), "agent exited");
                Ok(())
            } else {
                anyhow::bail!("{} agent exited with {status}", role.name());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\n{}", format!("Stopping {} agent...", role.name()).yellow());
            child.start_kill().context("failed to stop agent")?;
            child.wait().await.context("agent did not stop")?;
            Ok(())
        }
    }
}
