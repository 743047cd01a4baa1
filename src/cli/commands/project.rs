//! Project command - show or set the project version.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use crate::config::Config;
use crate::storage::RecordStore;

#[derive(clap::Args)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<ProjectCommand>,
}

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// Show the project version of the current scope
    Show,
    /// Set the project version of the current scope
    Set { version: String },
    /// List project versions of every scope
    List,
}

pub fn run(args: Args, config: &Config) -> Result<()> {
    let store = RecordStore::open_with(config)?;

    match args.command {
        Some(ProjectCommand::Show) | None => match store.project_version() {
            Some(version) => println!("{} {}", store.scope().cyan(), version.green()),
            None => println!(
                "{}",
                format!("No project version set for '{}'", store.scope()).yellow()
            ),
        },
        Some(ProjectCommand::Set { version }) => {
            store.set_project_version(&version)?;
            println!("{} {} = {}", "✓".green(), store.scope(), version);
        }
        Some(ProjectCommand::List) => {
            let versions = store.all_project_versions();
            if versions.is_empty() {
                println!("{}", "No project versions set.".dimmed());
            }
            for (scope, version) in versions {
                println!("{:<24} {}", scope.cyan(), version);
            }
        }
    }
    Ok(())
}
