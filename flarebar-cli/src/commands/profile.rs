//! Profile command - manage credential profiles.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use flarebar_core::Profile;
use flarebar_store::ProfileStore;

use crate::output::print_json;
use crate::{Cli, OutputFormat};

use super::build_services;

/// Arguments for the profile command.
#[derive(Args)]
pub struct ProfileArgs {
    /// Profile action to perform.
    #[command(subcommand)]
    pub action: ProfileAction,
}

/// Profile actions.
#[derive(Subcommand)]
pub enum ProfileAction {
    /// List stored profiles.
    List,

    /// Add a new profile.
    Add {
        /// Display name for the profile.
        name: String,

        /// Cloudflare API token.
        #[arg(long)]
        token: String,

        /// Also make this the active profile.
        #[arg(long)]
        activate: bool,
    },

    /// Make a profile the active identity (by name or id).
    Use {
        /// Profile name or id.
        profile: String,
    },

    /// Deactivate the active profile (falls back to wrangler config / env).
    Deactivate,

    /// Remove a profile (by name or id).
    Remove {
        /// Profile name or id.
        profile: String,
    },
}

/// Runs the profile command.
pub async fn run(args: &ProfileArgs, cli: &Cli) -> Result<()> {
    let services = build_services()?;
    let profiles = &services.profiles;

    match &args.action {
        ProfileAction::List => list(profiles, cli),
        ProfileAction::Add {
            name,
            token,
            activate,
        } => {
            let profile = Profile::new(name.clone(), token.clone());
            let id = profile.id.clone();
            profiles.add(profile)?;
            if *activate {
                profiles.set_active_id(Some(&id));
            }
            if !cli.quiet {
                println!("Added profile {name}");
            }
            Ok(())
        }
        ProfileAction::Use { profile } => {
            let found = find(profiles, profile)?;
            profiles.set_active_id(Some(&found.id));
            if !cli.quiet {
                println!("Active profile: {}", found.name);
            }
            Ok(())
        }
        ProfileAction::Deactivate => {
            profiles.set_active_id(None);
            if !cli.quiet {
                println!("No active profile; falling back to wrangler config / environment");
            }
            Ok(())
        }
        ProfileAction::Remove { profile } => {
            let found = find(profiles, profile)?;
            profiles.delete(&found.id)?;
            if !cli.quiet {
                println!("Removed profile {}", found.name);
            }
            Ok(())
        }
    }
}

fn list(profiles: &ProfileStore, cli: &Cli) -> Result<()> {
    let stored = profiles.list();
    let active = profiles.active_id();

    if cli.format == OutputFormat::Json {
        // Names and ids only; tokens stay in the secret store.
        let rows: Vec<serde_json::Value> = stored
            .iter()
            .map(|p| {
                serde_json::json!({
                    "id": p.id,
                    "name": p.name,
                    "active": active.as_deref() == Some(p.id.as_str()),
                })
            })
            .collect();
        return print_json(&rows, cli.pretty);
    }

    if stored.is_empty() {
        println!("No profiles. Add one with: flarebar profile add <name> --token <token>");
        return Ok(());
    }

    for profile in &stored {
        let marker = if active.as_deref() == Some(profile.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{marker} {:<24} {}", profile.name, profile.id);
    }
    Ok(())
}

/// Looks a profile up by name first, then by id.
fn find(profiles: &ProfileStore, needle: &str) -> Result<Profile> {
    let stored = profiles.list();

    if let Some(profile) = stored.iter().find(|p| p.name == needle) {
        return Ok(profile.clone());
    }
    if let Some(profile) = stored.iter().find(|p| p.id == needle) {
        return Ok(profile.clone());
    }
    bail!("no profile named {needle}");
}
