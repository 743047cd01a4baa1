//! Config command - manage configuration

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use crate::config::{Config, CONFIG_KEYS};

#[derive(clap::Args)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
}

/// Executes the config command. `effective` is the configuration after
/// environment and command-line overrides.
pub fn run(args: Args, effective: &Config) -> Result<()> {
    match args.command {
        Some(ConfigCommand::Show) | None => show_config(effective),
        Some(ConfigCommand::Get { key }) => {
            println!("{}", effective.get(&key)?);
            Ok(())
        }
        Some(ConfigCommand::Set { key, value }) => set_config(&key, &value),
    }
}

fn show_config(effective: &Config) -> Result<()> {
    println!("{}", "Chorus Configuration".bold());
    println!();

    let path = Config::config_path()?;
    let location = if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not created)", path.display())
    };
    println!("  {}  {}", "Config file:".dimmed(), location);

    for key in CONFIG_KEYS {
        println!("  {}  {}", format!("{key}:").dimmed(), effective.get(key)?);
    }

    Ok(())
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let path = Config::config_path()?;
    let mut config = Config::load_from(&path)?;
    config.set(key, value)?;
    config.save_to(&path)?;
    println!("{} {} = {}", "✓".green(), key, value);
    Ok(())
}
