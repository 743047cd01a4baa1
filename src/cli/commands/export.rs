//! Export command - write every tracked prompt to one JSON file.
//!
//! The document has the shape
//! `{"exported_at": ..., "total_prompts": N, "prompts": [...]}`.

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;

use crate::config::Config;
use crate::storage::RecordStore;

/// Default export file name, relative to the working directory.
const DEFAULT_EXPORT_FILE: &str = "prompts_export.json";

/// Arguments for the export command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    chorus export                        Write prompts_export.json\n    \
    chorus export -o my_prompts.json     Write to a custom file\n    \
    chorus export -o -                   Print to stdout")]
pub struct Args {
    /// File to write; '-' prints to stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Executes the export command.
pub fn run(args: Args, config: &Config) -> Result<()> {
    let store = RecordStore::open_with(config)?;

    if store.is_empty() {
        println!("{}", "No prompts to export.".dimmed());
        return Ok(());
    }

    let document = store.export();
    let output = args.output.unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE));

    if output.as_os_str() == "-" {
        println!("{}", document.to_json()?);
    } else {
        document.write_to(&output)?;
        eprintln!(
            "{} Exported {} prompts to {}",
            "✓".green(),
            document.total_prompts,
            output.display()
        );
    }

    Ok(())
}
