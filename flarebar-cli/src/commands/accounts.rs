//! Accounts command - list accounts and switch the selection.

use anyhow::{Result, bail};
use clap::Args;
use flarebar_engine::Tab;

use crate::output::print_json;
use crate::{Cli, OutputFormat};

use super::build_services;

/// Arguments for the accounts command.
#[derive(Args)]
pub struct AccountsArgs {
    /// Select this account id for subsequent commands.
    #[arg(long)]
    pub select: Option<String>,
}

/// Runs the accounts command.
pub async fn run(args: &AccountsArgs, cli: &Cli) -> Result<()> {
    let services = build_services()?;
    services.orchestrator.check_authentication(Tab::Overview).await;

    let state = services.orchestrator.state();
    if !state.is_authenticated {
        bail!("not authenticated; add a profile or run `wrangler login`");
    }
    if let Some(error) = &state.error {
        bail!("{error}");
    }

    if let Some(id) = &args.select {
        if !state.accounts.iter().any(|a| &a.id == id) {
            bail!("no account with id {id}");
        }
        services.orchestrator.select_account(id, Tab::Overview).await;
    }

    let state = services.orchestrator.state();

    if cli.format == OutputFormat::Json {
        return print_json(&state.accounts, cli.pretty);
    }

    for account in &state.accounts {
        let marker = if state.selected_account_id.as_deref() == Some(account.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{marker} {:<34} {}", account.id, account.name);
    }
    Ok(())
}
