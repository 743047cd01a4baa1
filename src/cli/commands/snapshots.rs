//! Snapshots command - list the snapshot files in the storage directory.

use anyhow::Result;
use chrono::{DateTime, Local};
use colored::Colorize;

use crate::config::Config;
use crate::storage::RecordStore;

/// Arguments for the snapshots command.
#[derive(clap::Args)]
pub struct Args {
    /// Maximum number of snapshots to display
    #[arg(short, long, default_value = "20", value_name = "N")]
    pub limit: usize,
}

/// Executes the snapshots command.
pub fn run(args: Args, config: &Config) -> Result<()> {
    let store = RecordStore::open_with(config)?;
    let files = store.snapshot_files()?;

    println!("{} {}", "Storage:".bold(), store.root().display());

    let legacy = store.legacy_path();
    if legacy.exists() {
        println!("{} {}", "Legacy file:".bold(), legacy.display());
    }

    if files.is_empty() {
        println!("{}", "No snapshots found.".dimmed());
        return Ok(());
    }

    println!();
    println!("{}", format!("{:<20}  {}", "MODIFIED", "FILE").bold());
    for path in files.iter().take(args.limit) {
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|_| "-".to_string());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("{:<20}  {}", modified.dimmed(), name);
    }

    if files.len() > args.limit {
        println!("{}", format!("... and {} more", files.len() - args.limit).dimmed());
    }

    Ok(())
}
