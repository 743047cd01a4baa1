//! List command - list tracked prompt versions.
//!
//! Displays every stored prompt version grouped by function, with the
//! trace of the last tracked call for each version.

use anyhow::Result;
use colored::Colorize;

use crate::cli::{truncate_str, OutputFormat};
use crate::config::Config;
use crate::storage::{RecordStore, VersionRecord};
use crate::versioning::parse_parts;

/// Maximum characters of a call's output shown per version.
const OUTPUT_PREVIEW_CHARS: usize = 100;

/// Arguments for the list command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    chorus list                        List all tracked prompts\n    \
    chorus list --function summarize   Only functions matching 'summarize'\n    \
    chorus list --full                 Include prompt text and inputs\n    \
    chorus list --format json          Output as JSON")]
pub struct Args {
    /// Filter to functions whose name contains this text (case-insensitive)
    #[arg(long, value_name = "NAME")]
    pub function: Option<String>,

    /// Show the full prompt text and call inputs
    #[arg(long)]
    pub full: bool,

    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Executes the list command.
pub fn run(args: Args, config: &Config) -> Result<()> {
    let store = RecordStore::open_with(config)?;
    if store.is_empty() {
        println!("{}", "No prompts found in storage.".dimmed());
        println!();
        println!("Track some prompts first; versions are stored in {}.", store.root().display());
        return Ok(());
    }

    let owners = matching_owners(store.owners(), args.function.as_deref());
    if owners.is_empty() {
        if let Some(name) = &args.function {
            println!("{}", format!("No prompts found for function: {name}").yellow());
        }
        return Ok(());
    }

    let groups: Vec<(&str, Vec<&VersionRecord>)> = owners
        .into_iter()
        .map(|owner| (owner, sorted_versions(store.list(Some(owner)))))
        .collect();

    match args.format {
        OutputFormat::Json => {
            let records: Vec<&VersionRecord> =
                groups.iter().flat_map(|(_, versions)| versions.iter().copied()).collect();
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        OutputFormat::Text => print_grouped(&groups, args.full),
    }

    Ok(())
}

/// Keeps owners whose name contains `needle`, ignoring case.
fn matching_owners<'a>(owners: Vec<&'a str>, needle: Option<&str>) -> Vec<&'a str> {
    let Some(needle) = needle else {
        return owners;
    };
    let needle = needle.to_lowercase();
    owners
        .into_iter()
        .filter(|owner| owner.to_lowercase().contains(&needle))
        .collect()
}

/// Orders one owner's records by semantic version, then creation time.
fn sorted_versions(mut records: Vec<&VersionRecord>) -> Vec<&VersionRecord> {
    records.sort_by_key(|r| (parse_parts(r.version()), r.created_at()));
    records
}

fn print_grouped(groups: &[(&str, Vec<&VersionRecord>)], full: bool) {
    let total: usize = groups.iter().map(|(_, versions)| versions.len()).sum();
    println!("{} {}", "Total prompts:".bold(), total);

    for (owner, versions) in groups {
        println!();
        println!("{}", owner.cyan().bold());
        for record in versions {
            print_version(record, full);
        }
    }
}

fn print_version(record: &VersionRecord, full: bool) {
    let description = if record.description().is_empty() {
        "-".dimmed().to_string()
    } else {
        record.description().to_string()
    };
    println!("  {} {}", format!("v{}", record.version()).green(), description);
    println!(
        "      {} {}",
        "Created:".dimmed(),
        record.created_at().format("%Y-%m-%d %H:%M:%S")
    );
    if !record.tags().is_empty() {
        let tags: Vec<&str> = record.tags().iter().map(String::as_str).collect();
        println!("      {} {}", "Tags:".dimmed(), tags.join(", "));
    }
    if let Some(seconds) = record.execution_time() {
        println!("      {} {:.3}s", "Execution time:".dimmed(), seconds);
    }
    println!("      {} {}", "Execution ID:".dimmed(), record.execution_id());
    if let Some(output) = record.output() {
        println!(
            "      {} {}",
            "Output:".dimmed(),
            truncate_str(&display_value(output), OUTPUT_PREVIEW_CHARS)
        );
    }
    if full {
        println!("      {} {}", "Prompt:".dimmed(), record.prompt());
        if !record.inputs().is_empty() {
            let inputs = serde_json::to_string(record.inputs()).unwrap_or_default();
            println!("      {} {}", "Inputs:".dimmed(), inputs);
        }
    }
}

/// Strings print without quotes; everything else as JSON.
pub(crate) fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
