use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;
mod storage;
mod versioning;

use cli::commands;
use config::Config;

/// The main CLI command line interface.
#[derive(Parser)]
#[command(name = "chorus")]
#[command(version)]
#[command(about = "Version control for LLM prompts")]
#[command(long_about = "Chorus records the prompts your application sends to language models,\n\
    assigns each distinct prompt a semantic version, and keeps the history\n\
    in timestamped JSON snapshots.\n\n\
    Edits are classified automatically: breaking rewrites bump the major\n\
    version, added capabilities bump the minor version, and wording fixes\n\
    bump the patch version.")]
#[command(after_help = "EXAMPLES:\n    \
    chorus list                          List tracked prompts\n    \
    chorus show summarize 1.2.0          View one prompt version\n    \
    chorus latest summarize              View the newest version\n    \
    chorus classify old.txt new.txt      Classify a prompt edit\n    \
    chorus export -o prompts.json        Export every prompt\n\n\
    For more information about a command, run 'chorus <command> --help'.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Snapshot directory (overrides config and CHORUS_STORAGE_PATH)
    #[arg(long, global = true, value_name = "DIR")]
    storage: Option<PathBuf>,

    /// Label used in snapshot file names (overrides config and CHORUS_SCOPE)
    #[arg(long, global = true, value_name = "LABEL")]
    scope: Option<String>,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List tracked prompt versions
    #[command(long_about = "Displays every stored prompt version grouped by function, with the\n\
        description, tags, timing, and output of the last tracked call.\n\
        Functions can be filtered by a case-insensitive name substring.")]
    List(commands::list::Args),

    /// Show one prompt version
    #[command(long_about = "Displays the full prompt text of a function's version together with\n\
        the inputs, output, and execution metadata of its last call.")]
    Show(commands::show::Args),

    /// Show the latest version of a function's prompt
    #[command(long_about = "Displays the newest prompt of a function. By default the highest\n\
        semantic version wins; --by recency picks the highest trailing\n\
        version component instead.")]
    Latest(commands::latest::Args),

    /// Export every tracked prompt to JSON
    #[command(long_about = "Writes all stored prompt versions to a single JSON document with\n\
        an export timestamp and the total number of prompts.")]
    Export(commands::export::Args),

    /// List snapshot files in the storage directory
    Snapshots(commands::snapshots::Args),

    /// Classify the change between two prompt files
    #[command(long_about = "Compares two prompt files and reports whether the edit is a major,\n\
        minor, or patch change along with the rule that decided it.\n\
        With --from, also prints the version that would follow.")]
    Classify(commands::classify::Args),

    /// Show or set the project version
    #[command(long_about = "Reads or records the project version associated with the current\n\
        scope. Versions are stored in project_version.json in the storage\n\
        directory.")]
    Project(commands::project::Args),

    /// View and manage configuration settings
    #[command(long_about = "Provides subcommands to show, get, and set configuration values.\n\
        Configuration is stored in ~/.chorus/config.yaml.")]
    Config(commands::config::Args),

    /// Generate shell completion scripts
    #[command(long_about = "Prints a completion script for bash, zsh, fish, powershell, or elvish\n\
        to stdout. Redirect it into your shell's completion directory.")]
    Completions(commands::completions::Args),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "chorus=debug"
    } else {
        "chorus=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let mut config = Config::load()?;
    if let Some(storage) = cli.storage {
        config.storage_path = storage;
    }
    if let Some(scope) = cli.scope {
        config.scope = scope;
    }

    match cli.command {
        Commands::List(args) => commands::list::run(args, &config),
        Commands::Show(args) => commands::show::run(args, &config),
        Commands::Latest(args) => commands::latest::run(args, &config),
        Commands::Export(args) => commands::export::run(args, &config),
        Commands::Snapshots(args) => commands::snapshots::run(args, &config),
        Commands::Classify(args) => commands::classify::run(args),
        Commands::Project(args) => commands::project::run(args, &config),
        Commands::Config(args) => commands::config::run(args, &config),
        Commands::Completions(args) => commands::completions::run(args, Cli::command()),
    }
}
