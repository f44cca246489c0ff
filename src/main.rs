//! truecount - Honest change counts for a git working tree
//!
//! Polls git for staged, unstaged and untracked files and prints a
//! summary whenever the total number of changed files moves.
//!
//! # Usage
//!
//! ```bash
//! truecount                 # Monitor the current directory
//! truecount /path/to/repo   # Monitor another repository
//! truecount -i 5            # Poll every five seconds
//! ```

mod app;
mod config;
mod git;
mod report;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Report real file change counts straight from git
#[derive(Parser, Debug)]
#[command(name = "truecount")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the repository (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Seconds between polls (defaults to 2)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Config file to use instead of the per-user one
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let file = match &args.config {
        Some(path) => config::load_file(path)?,
        None => config::load_default()?,
    };
    let config = Config::resolve(args.path, args.interval, file)?;

    init_tracing(&config.log_level);

    git::ensure_repository(&config.path)?;

    let repo = git::describe(&config.path).unwrap_or_else(|err| {
        debug!(event = "repo.describe_failed", error = %err);
        git::RepoInfo::unknown(&config.path)
    });

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async {
        let source = git::GitCli::new(&config.path);
        let mut monitor = app::Monitor::new(config.interval, io::stdout());

        monitor.announce(&repo)?;
        monitor.run(&source, interrupted()).await
    })
}

/// Log to stderr so reports on stdout stay clean
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Resolves on Ctrl+C
async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(event = "monitor.signal_unavailable", error = %err);
        // Default SIGINT handling still applies
        std::future::pending::<()>().await;
    }
}
