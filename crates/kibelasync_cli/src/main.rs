//! kibelasync CLI
//!
//! Keeps a directory of markdown files in sync with a Kibela team.
//!
//! # Commands
//!
//! - `pull` - Fetch notes that changed remotely into `<dir>/<number>.md`
//! - `push` - Send local markdown files back, creating notes that have no id

mod client;
mod commands;
mod markdown;

use clap::{Parser, Subcommand};
use client::ReqwestClient;
use kibelasync_engine::{CallContext, HttpTransport, SyncConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Markdown sync for Kibela.
#[derive(Parser)]
#[command(name = "kibelasync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Kibela team name
    #[arg(global = true, long, env = "KIBELA_TEAM", hide_env_values = true)]
    team: Option<String>,

    /// Access token
    #[arg(global = true, long, env = "KIBELA_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GraphQL endpoint, defaults to the team's API
    #[arg(global = true, long, env = "KIBELA_ENDPOINT")]
    endpoint: Option<String>,

    /// Per-request timeout in seconds
    #[arg(global = true, long, default_value = "30")]
    timeout: u64,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync remote notes into a directory
    Pull {
        /// Pull every note without comparing update times
        #[arg(long)]
        full: bool,

        /// Sync directory
        #[arg(short, long, default_value = "notes")]
        dir: PathBuf,

        /// Folder in Kibela, e.g. "dev/rust"
        #[arg(short, long)]
        folder: Option<String>,

        /// Only the most recently updated notes; 0 for all
        #[arg(short, long, default_value = "0")]
        limit: usize,

        /// Note numbers or <number>.md files to pull unconditionally
        targets: Vec<String>,
    },

    /// Push markdown files
    Push {
        /// Files to push
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let team = cli.team.ok_or("team required (--team or KIBELA_TEAM)")?;
    let token = cli.token.ok_or("token required (--token or KIBELA_TOKEN)")?;
    let mut config = SyncConfig::new(team, token).with_timeout(Duration::from_secs(cli.timeout));
    if let Some(endpoint) = cli.endpoint {
        config = config.with_endpoint(endpoint);
    }

    let transport = HttpTransport::new(config.clone(), ReqwestClient::new()?);
    let ctx = CallContext::new();

    match cli.command {
        Commands::Pull {
            full,
            dir,
            folder,
            limit,
            targets,
        } => {
            commands::pull::run(
                config,
                transport,
                &ctx,
                commands::pull::PullArgs {
                    dir: &dir,
                    folder: folder.as_deref(),
                    limit,
                    full,
                    targets: &targets,
                },
            )?;
        }
        Commands::Push { files } => {
            commands::push::run(config, transport, &ctx, &files)?;
        }
    }

    Ok(())
}
