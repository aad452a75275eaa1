use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use crate::batch;
use crate::config::DiagramConfig;
use crate::format::DecimalLocale;
use crate::workbook;

#[derive(Parser, Debug)]
#[command(
    name = "sankeyflow",
    version,
    about = "Plot Sankey charts from an Excel spreadsheet, one per sheet"
)]
pub struct Args {
    /// Path to an Excel spreadsheet
    #[arg(short = 'f', long)]
    pub file: PathBuf,

    /// Sheets to process (all sheets if not given)
    #[arg(short = 's', long, num_args = 1..)]
    pub sheets: Option<Vec<String>>,

    /// Directory to use for the output
    #[arg(short = 'o', long = "output_dir", default_value = "./out")]
    pub output_dir: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short = 'l', long = "log_level", default_value = "INFO")]
    pub log_level: String,

    /// Language for number formats, e.g. "en_US" or "de_DE"
    #[arg(long, default_value = "de_DE.UTF-8")]
    pub language: String,

    #[command(flatten)]
    pub diagram: DiagramConfig,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let locale = DecimalLocale::from_tag(&args.language);
    let tables = workbook::read_edge_tables(&args.file, args.sheets.as_deref())?;
    info!("loaded {} sheet(s) from {}", tables.len(), args.file.display());

    let label = args
        .file
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("sankey")
        .to_string();
    batch::run(&tables, &args.output_dir, &label, &args.diagram, locale)?;
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let level: tracing::Level = level
        .to_lowercase()
        .parse()
        .with_context(|| format!("invalid log level {level:?}"))?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
    Ok(())
}
