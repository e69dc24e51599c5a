//! Config command - inspect and create the passbook configuration.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use passbook_core::models::PassbookConfig;

use super::{default_config_path, load_config};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write a configuration file with default settings
    Init(InitArgs),

    /// Print one value by dotted key (e.g., "coordinate.row_tolerance")
    Get { key: String },

    /// Print which configuration file is in effect
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Where to write the file (defaults to the active config path)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let active = config_path.map(PathBuf::from).unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => {
            let config = load_config(config_path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommand::Init(init) => write_defaults(init.output.unwrap_or(active), init.force)?,
        ConfigCommand::Get { key } => {
            let config = serde_json::to_value(load_config(config_path)?)?;
            let value = lookup(&config, &key)
                .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        ConfigCommand::Path => {
            let status = if active.exists() {
                style("exists").green()
            } else {
                style("not created, using defaults").yellow()
            };
            println!("{} ({})", active.display(), status);
        }
    }

    Ok(())
}

fn write_defaults(path: PathBuf, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    PassbookConfig::default().save(&path)?;
    println!("{} Wrote {}", style("✓").green(), path.display());
    Ok(())
}

/// Walk a dotted key through nested JSON objects.
fn lookup<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(value, |node, part| node.get(part))
}
