//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod detect;
pub mod parse;

use std::path::{Path, PathBuf};

use tracing::debug;

use passbook_core::models::{PassbookConfig, Transaction, fields};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON array of transactions
    Json,
    /// CSV with one row per transaction
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

/// Default configuration file location under the user config dir.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("passbook")
        .join("config.json")
}

/// Load the explicit config file, else the default one if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<PassbookConfig> {
    if let Some(path) = config_path {
        return Ok(PassbookConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config at {}", default_path.display());
        Ok(PassbookConfig::from_file(&default_path)?)
    } else {
        Ok(PassbookConfig::default())
    }
}

pub fn format_transactions(
    transactions: &[Transaction],
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(transactions)?),
        OutputFormat::Csv => format_csv(transactions),
    }
}

/// Column order: canonical fields present in any record, then extras, then `Bank`.
fn csv_columns(transactions: &[Transaction]) -> Vec<String> {
    let mut columns: Vec<String> = vec![fields::DATE.to_string(), fields::DESCRIPTION.to_string()];
    for name in [fields::AMOUNT, fields::DEBIT, fields::CREDIT, fields::BALANCE] {
        if transactions.iter().any(|t| t.field(name).is_some()) {
            columns.push(name.to_string());
        }
    }

    let mut extras: Vec<&String> = transactions.iter().flat_map(|t| t.extras.keys()).collect();
    extras.sort();
    extras.dedup();
    columns.extend(extras.into_iter().cloned());
    columns.push("Bank".to_string());
    columns
}

fn format_csv(transactions: &[Transaction]) -> anyhow::Result<String> {
    let columns = csv_columns(transactions);
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(&columns)?;

    for txn in transactions {
        wtr.write_record(columns.iter().map(|c| txn.field(c).unwrap_or("")))?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}
