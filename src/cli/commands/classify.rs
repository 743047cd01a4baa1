//! Classify command - decide how a prompt edit bumps the version.
//!
//! Compares two prompt files and reports whether the edit is a major,
//! minor, or patch change, which rule decided it, and optionally the
//! version that follows a given one.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::versioning::{self, analyze_change, bump, BumpKind};

/// Arguments for the classify command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    chorus classify old.txt new.txt                 Print the bump category\n    \
    chorus classify old.txt new.txt --from 1.4.2    Also print the next version")]
pub struct Args {
    /// File holding the previous prompt
    #[arg(value_name = "OLD")]
    pub old: PathBuf,

    /// File holding the edited prompt
    #[arg(value_name = "NEW")]
    pub new: PathBuf,

    /// Current version to bump
    #[arg(long, value_name = "VERSION")]
    pub from: Option<String>,

    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct Classification {
    bump: BumpKind,
    reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next: Option<String>,
}

/// Executes the classify command.
pub fn run(args: Args) -> Result<()> {
    if let Some(from) = &args.from {
        versioning::validate(from)?;
    }

    let old = fs::read_to_string(&args.old)
        .with_context(|| format!("Failed to read {}", args.old.display()))?;
    let new = fs::read_to_string(&args.new)
        .with_context(|| format!("Failed to read {}", args.new.display()))?;

    let analysis = analyze_change(&old, &new);
    let result = Classification {
        bump: analysis.kind,
        reason: analysis.trigger.to_string(),
        next: args.from.as_deref().map(|v| bump(v, analysis.kind)),
        from: args.from,
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => {
            let label = match result.bump {
                BumpKind::Major => result.bump.as_str().red().bold(),
                BumpKind::Minor => result.bump.as_str().yellow().bold(),
                BumpKind::Patch => result.bump.as_str().green().bold(),
            };
            println!("{} ({})", label, result.reason.dimmed());
            if let (Some(from), Some(next)) = (&result.from, &result.next) {
                println!("{} -> {}", from, next.bold());
            }
        }
    }

    Ok(())
}
