//! Usage command - today's aggregated metrics.

use anyhow::{Result, bail};
use flarebar_engine::Tab;

use crate::output::{TextFormatter, print_json};
use crate::{Cli, OutputFormat};

use super::build_services;

/// Runs the usage command.
pub async fn run(cli: &Cli) -> Result<()> {
    let services = build_services()?;
    services.orchestrator.check_authentication(Tab::Overview).await;

    let state = services.orchestrator.state();
    if !state.is_authenticated {
        bail!("not authenticated; add a profile or run `wrangler login`");
    }
    if let Some(error) = &state.error {
        bail!("{error}");
    }

    if cli.format == OutputFormat::Json {
        return print_json(
            &serde_json::json!({
                "usage": state.usage,
                "usage_error": state.usage_error,
            }),
            cli.pretty,
        );
    }

    let formatter = TextFormatter::new(!cli.no_color);
    println!("{}", formatter.format_usage(&state));
    Ok(())
}
