//! Show command - display one prompt version.
//!
//! Displays the full prompt text of a version together with the inputs,
//! output, and timing of the last call recorded against it.

use anyhow::Result;
use colored::{ColoredString, Colorize};

use super::list::display_value;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::storage::{RecordStore, VersionRecord};

/// Arguments for the show command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    chorus show summarize 1.0.0             Show a prompt version\n    \
    chorus show summarize 1.0.0 -f json     Output as JSON")]
pub struct Args {
    /// Function the prompt belongs to
    #[arg(value_name = "FUNCTION")]
    pub function: String,

    /// Exact version to show
    #[arg(value_name = "VERSION")]
    pub version: String,

    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Executes the show command.
pub fn run(args: Args, config: &Config) -> Result<()> {
    let store = RecordStore::open_with(config)?;

    let Some(record) = store.get(&args.function, &args.version) else {
        if store.list(Some(args.function.as_str())).is_empty() {
            anyhow::bail!(
                "No prompts found for function '{}'. Run 'chorus list' to see tracked functions.",
                args.function
            );
        }
        anyhow::bail!(
            "Prompt not found: {} v{}. Run 'chorus list --function {}' to see its versions.",
            args.function,
            args.version,
            args.function
        );
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
        OutputFormat::Text => print_record(record),
    }
    Ok(())
}

/// Width of the field-name column in detail output.
const LABEL_WIDTH: usize = 16;

/// A field name padded to the label column, then dimmed, so escape codes
/// never count towards the width.
fn label(name: &str) -> ColoredString {
    format!("{:<width$}", name, width = LABEL_WIDTH).dimmed()
}

/// Prints every field of a record for the terminal.
pub(crate) fn print_record(record: &VersionRecord) {
    println!(
        "{} {} {}",
        "Prompt:".bold(),
        record.owner().cyan().bold(),
        format!("v{}", record.version()).green()
    );
    println!("{}", "=".repeat(50).dimmed());
    println!("{}{}", label("Description:"), record.description());
    let tags: Vec<&str> = record.tags().iter().map(String::as_str).collect();
    println!("{}{}", label("Tags:"), tags.join(", "));
    println!(
        "{}{}",
        label("Created:"),
        record.created_at().format("%Y-%m-%d %H:%M:%S")
    );
    println!("{}{}", label("Hash:"), record.prompt_hash().yellow());
    println!("{}{}", label("Execution ID:"), record.execution_id());
    if let Some(seconds) = record.execution_time() {
        println!("{}{:.3}s", label("Execution time:"), seconds);
    }

    if !record.inputs().is_empty() {
        println!();
        println!("{}", "Inputs:".bold());
        for (name, value) in record.inputs() {
            println!("  {}: {}", name, display_value(value));
        }
    }

    if let Some(output) = record.output() {
        println!();
        println!("{}", "Output:".bold());
        println!("{}", display_value(output));
    }

    println!();
    println!("{}", "Prompt:".bold());
    println!("{}", record.prompt());
}
