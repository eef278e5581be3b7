//! worktrail - record editing sessions and narrate them into workflows
//!
//! Main entry point for the worktrail CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod backend;
mod commands;
mod sink;

use commands::{config, find, replay};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// worktrail - record editing sessions and narrate them into workflows
#[derive(Parser)]
#[command(name = "worktrail")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay an editor event log and narrate it into a workflow
    Replay(replay::ReplayArgs),

    /// Find a saved workflow for a task
    Find(find::FindArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

const VERBOSE_DIRECTIVES: &str = "worktrail=debug,worktrail_recorder=debug,worktrail_session=debug,worktrail_workflow=debug,worktrail_llm=debug,worktrail_config=debug,info";
const QUIET_DIRECTIVES: &str = "worktrail=info,worktrail_workflow=info,worktrail_llm=info,warn";

/// Console log filter. `RUST_LOG` wins over `--verbose` when set.
fn console_filter(verbose: bool) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(if verbose {
            VERBOSE_DIRECTIVES
        } else {
            QUIET_DIRECTIVES
        })
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing: console (human-readable) + rotating JSON file
    let log_dir = worktrail_config::user_config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "worktrail.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(console_filter(cli.verbose)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "worktrail=trace,worktrail_recorder=trace,worktrail_session=trace,worktrail_workflow=trace,worktrail_llm=trace,worktrail_config=trace,info",
                )),
        )
        .init();

    let ctx = commands::Context {
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Replay(args) => replay::run(args, &ctx).await,
        Commands::Find(args) => find::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
