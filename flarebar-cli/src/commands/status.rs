//! Status command - the account overview.

use anyhow::Result;
use flarebar_engine::Tab;

use crate::output::{TextFormatter, print_json, status_report};
use crate::{Cli, OutputFormat};

use super::build_services;

/// Runs the status command.
pub async fn run(cli: &Cli) -> Result<()> {
    let services = build_services()?;
    services.orchestrator.check_authentication(Tab::Overview).await;

    let state = services.orchestrator.state();

    if cli.format == OutputFormat::Json {
        return print_json(&status_report(&state), cli.pretty);
    }

    let formatter = TextFormatter::new(!cli.no_color);
    println!("{}", formatter.format_status(&state));

    if !state.is_authenticated {
        std::process::exit(crate::ExitCode::NotAuthenticated as i32);
    }
    Ok(())
}
