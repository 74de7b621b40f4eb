//! Resource listing commands: workers, pages, storage.

use anyhow::{Result, bail};
use flarebar_engine::{AppState, Tab};

use crate::output::{TextFormatter, print_json};
use crate::{Cli, OutputFormat};

use super::build_services;

/// Refreshes for the given tab and returns the resulting state snapshot.
async fn load(tab: Tab) -> Result<AppState> {
    let services = build_services()?;
    services.orchestrator.check_authentication(tab).await;

    let state = services.orchestrator.state();
    if !state.is_authenticated {
        bail!("not authenticated; add a profile or run `wrangler login`");
    }
    if let Some(error) = &state.error {
        bail!("{error}");
    }
    Ok(state)
}

/// Runs the workers command.
pub async fn run_workers(cli: &Cli) -> Result<()> {
    let state = load(Tab::Workers).await?;

    if cli.format == OutputFormat::Json {
        return print_json(&state.workers, cli.pretty);
    }

    let formatter = TextFormatter::new(!cli.no_color);
    println!("{}", formatter.format_workers(&state));
    Ok(())
}

/// Runs the pages command.
pub async fn run_pages(cli: &Cli) -> Result<()> {
    let state = load(Tab::Pages).await?;

    if cli.format == OutputFormat::Json {
        return print_json(&state.pages_projects, cli.pretty);
    }

    let formatter = TextFormatter::new(!cli.no_color);
    println!("{}", formatter.format_pages(&state));
    Ok(())
}

/// Runs the storage command.
pub async fn run_storage(cli: &Cli) -> Result<()> {
    let state = load(Tab::Storage).await?;

    if cli.format == OutputFormat::Json {
        return print_json(
            &serde_json::json!({
                "kv_namespaces": state.kv_namespaces,
                "r2_buckets": state.r2_buckets,
                "d1_databases": state.d1_databases,
                "queues": state.queues,
            }),
            cli.pretty,
        );
    }

    let formatter = TextFormatter::new(!cli.no_color);
    println!("{}", formatter.format_storage(&state));
    Ok(())
}
