//! Detect command - print the statement format without extracting.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use passbook_core::{LayoutSource, Parser, PdfLayoutSource};

use super::load_config;

/// Arguments for the detect command.
#[derive(Args)]
pub struct DetectArgs {
    /// Statement PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Also list the strategies that would run, in order
    #[arg(long)]
    chain: bool,
}

pub async fn run(args: DetectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let parser = Parser::new(&config)?;
    let source = PdfLayoutSource::new(config.pdf.clone());

    let input = args.input.clone();
    let document = tokio::task::spawn_blocking(move || source.open(&input)).await??;
    info!("Loaded {} pages", document.page_count());

    let format = parser.classify(&document);
    println!("{}", format);

    if args.chain {
        for (i, id) in parser.chain(format).ids().iter().enumerate() {
            println!("  {}. {}", i + 1, id);
        }
    }

    Ok(())
}
