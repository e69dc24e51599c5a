//! Parse command - extract transactions from a single statement.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use passbook_core::models::{Mode, ParseOutcome};
use passbook_core::{Parser, PdfLayoutSource};

use super::{OutputFormat, format_transactions, load_config};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Statement PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: the input path with the format's extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Format selection: auto, axis, yesbank, jk, hdfc, kotak, or standard
    #[arg(short, long, default_value = "auto")]
    mode: Mode,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print format, strategy, and warnings to stderr
    #[arg(long)]
    report: bool,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Parsing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Parsing {}", args.input.display()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let parser = Parser::new(&config)?;
    let source = PdfLayoutSource::new(config.pdf.clone());
    let input = args.input.clone();
    let mode = args.mode;
    let result =
        tokio::task::spawn_blocking(move || parser.parse_path(&source, &input, mode)).await?;

    pb.finish_and_clear();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{} {}", style("✗").red(), e);
            println!("transactions:0");
            std::process::exit(1);
        }
    };

    if args.report {
        print_report(&outcome);
    }

    if outcome.is_empty() {
        println!("transactions:0");
        std::process::exit(1);
    }

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension(args.format.extension()));
    let content = format_transactions(&outcome.transactions, args.format)?;
    fs::write(&output_path, content)?;
    debug!("Wrote output to {}", output_path.display());

    println!("transactions:{}", outcome.len());

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn print_report(outcome: &ParseOutcome) {
    eprintln!(
        "{} Format: {} ({:?})",
        style("ℹ").blue(),
        outcome.format,
        outcome.format_source
    );
    match outcome.strategy {
        Some(strategy) => eprintln!(
            "{} Strategy: {} (attempt {})",
            style("ℹ").blue(),
            strategy,
            outcome.attempts
        ),
        None => eprintln!(
            "{} All {} strategies came up empty",
            style("⚠").yellow(),
            outcome.attempts
        ),
    }
    eprintln!(
        "{} Processing time: {}ms",
        style("ℹ").blue(),
        outcome.processing_time_ms
    );

    if !outcome.warnings.is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &outcome.warnings {
            eprintln!("  - {}", warning);
        }
    }
}
