//! Latest command - show the newest version of a function's prompt.

use anyhow::Result;
use clap::ValueEnum;

use super::show::print_record;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::storage::RecordStore;

/// How "latest" is decided.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LatestBy {
    /// Highest MAJOR.MINOR.PATCH (default).
    #[default]
    Semver,
    /// Highest trailing version component, newest record on ties.
    Recency,
}

/// Arguments for the latest command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    chorus latest summarize                 Highest semantic version\n    \
    chorus latest summarize --by recency    Highest trailing component")]
pub struct Args {
    /// Function the prompt belongs to
    #[arg(value_name = "FUNCTION")]
    pub function: String,

    /// Ordering used to pick the latest version
    #[arg(long, value_enum, default_value = "semver")]
    pub by: LatestBy,

    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Executes the latest command.
pub fn run(args: Args, config: &Config) -> Result<()> {
    let store = RecordStore::open_with(config)?;

    let latest = match args.by {
        LatestBy::Semver => store.latest_by_semver(&args.function),
        LatestBy::Recency => store.latest_by_recency(&args.function),
    };
    let Some(record) = latest else {
        anyhow::bail!(
            "No prompts found for function '{}'. Run 'chorus list' to see tracked functions.",
            args.function
        );
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
        OutputFormat::Text => print_record(record),
    }
    Ok(())
}
