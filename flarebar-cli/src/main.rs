// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Flarebar CLI - Cloudflare account resources from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Overview: account, workers, pages, usage
//! flarebar status
//!
//! # Resource listings
//! flarebar workers
//! flarebar pages
//! flarebar storage
//!
//! # Usage metrics
//! flarebar usage
//!
//! # Accounts
//! flarebar accounts
//! flarebar accounts --select 023e105f4ecef8ad9ca31a8372d0c353
//!
//! # Credential profiles
//! flarebar profile list
//! flarebar profile add work --token cf-xxxxx
//! flarebar profile use work
//!
//! # Watch mode
//! flarebar watch --interval 60
//!
//! # JSON output
//! flarebar status --format json --pretty
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{accounts, profile, resources, status, usage, watch};

// ============================================================================
// CLI Definition
// ============================================================================

/// Flarebar CLI - Cloudflare account resources.
#[derive(Parser)]
#[command(name = "flarebar")]
#[command(about = "Cloudflare account resource monitoring CLI")]
#[command(long_about = r#"
Flarebar shows the Workers, Pages, KV, R2, D1, and Queues resources of a
Cloudflare account, plus aggregated usage metrics for the current day.

Credentials resolve in order: the active profile, the wrangler config file,
then CLOUDFLARE_API_TOKEN / CLOUDFLARE_ACCOUNT_ID.

Examples:
  flarebar status                # Overview of the selected account
  flarebar workers               # Worker scripts
  flarebar storage               # KV, R2, D1, Queues
  flarebar usage                 # Today's usage metrics
  flarebar profile add work --token cf-xxxxx
  flarebar watch --interval 60   # Auto-refreshing overview
"#)]
#[command(version)]
#[command(author = "Flarebar Contributors")]
pub struct Cli {
    /// Subcommand to run. If none, runs 'status' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Show the account overview (default if no command specified).
    #[command(visible_alias = "s")]
    Status,

    /// List Worker scripts.
    #[command(visible_alias = "w")]
    Workers,

    /// List Pages projects and their latest deployments.
    #[command(visible_alias = "p")]
    Pages,

    /// List storage resources: KV, R2, D1, Queues.
    Storage,

    /// Show today's aggregated usage metrics.
    #[command(visible_alias = "u")]
    Usage,

    /// List accounts or select one.
    #[command(visible_alias = "a")]
    Accounts(accounts::AccountsArgs),

    /// Manage credential profiles.
    Profile(profile::ProfileArgs),

    /// Watch the overview (like htop for your Cloudflare account).
    Watch(watch::WatchArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Not authenticated.
    NotAuthenticated = 2,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("flarebar=debug,info")
    } else {
        EnvFilter::new("flarebar=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Some(Commands::Status) | None => status::run(&cli).await,
        Some(Commands::Workers) => resources::run_workers(&cli).await,
        Some(Commands::Pages) => resources::run_pages(&cli).await,
        Some(Commands::Storage) => resources::run_storage(&cli).await,
        Some(Commands::Usage) => usage::run(&cli).await,
        Some(Commands::Accounts(args)) => accounts::run(args, &cli).await,
        Some(Commands::Profile(args)) => profile::run(args, &cli).await,
        Some(Commands::Watch(args)) => watch::run(args, &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(ExitCode::Error as i32);
    }

    Ok(())
}
