//! Watch command - auto-refreshing overview.

use anyhow::Result;
use clap::Args;
use flarebar_engine::Tab;
use std::io::{Write, stdout};
use tokio::time::{Duration, interval};
use tracing::info;

use crate::Cli;
use crate::output::TextFormatter;

use super::build_services;

/// Arguments for the watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Refresh interval in seconds.
    #[arg(long, short, default_value = "300")]
    pub interval: u64,

    /// Minimum interval to use.
    #[arg(long, default_value = "30")]
    pub min_interval: u64,
}

/// Runs the watch command.
pub async fn run(args: &WatchArgs, cli: &Cli) -> Result<()> {
    let refresh_interval = args.interval.max(args.min_interval);

    info!(interval = refresh_interval, "Starting watch mode");

    let services = build_services()?;
    let formatter = TextFormatter::new(!cli.no_color);

    let mut ticker = interval(Duration::from_secs(refresh_interval));
    // Consume the interval's immediate first tick; the bootstrap below
    // already refreshes.
    ticker.tick().await;

    services.orchestrator.check_authentication(Tab::Overview).await;

    loop {
        let state = services.orchestrator.state();

        // Clear screen
        print!("\x1b[2J\x1b[H");
        stdout().flush()?;

        let now = chrono::Local::now();
        println!(
            "Flarebar Watch Mode - {} (refresh: {refresh_interval}s)",
            now.format("%H:%M:%S")
        );
        println!("{}", "─".repeat(50));
        println!();
        println!("{}", formatter.format_status(&state));
        println!();
        println!("Press Ctrl+C to exit");

        ticker.tick().await;
        services.orchestrator.refresh(Tab::Overview).await;
    }
}
