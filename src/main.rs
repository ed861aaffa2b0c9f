// Passport roster builder
// Runs a folder of passport scans through MRZ validation into a CSV roster

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::Parser;
use passport_roster::{
    processing::ManifestExtractor,
    storage::Table,
    utils::{PassportError, Result},
    validation::FlagKind,
    PassportBatch, PipelineConfig,
};

#[derive(Parser, Debug)]
#[command(name = "passport-roster", version, about = "Build a passport roster from MRZ scans")]
struct Args {
    /// Folder containing the passport scans
    #[arg(long)]
    images: PathBuf,

    /// JSON file with the extraction service's MRZ results, keyed by file name
    #[arg(long)]
    manifest: PathBuf,

    /// Roster CSV to create or append to
    #[arg(long, default_value = "processed/roster.csv")]
    table: PathBuf,

    /// Curated CSV whose travel columns are merged in by passport number
    #[arg(long)]
    source: Option<PathBuf>,

    /// Pipeline configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Processing date as DD-MM-YYYY (defaults to today)
    #[arg(long)]
    today: Option<String>,
}

fn run(args: &Args) -> Result<()> {
    let config = PipelineConfig::load(args.config.as_deref())?;

    let today = match &args.today {
        Some(raw) => NaiveDate::parse_from_str(raw, "%d-%m-%Y")
            .map_err(|e| PassportError::InvalidDate(format!("--today '{}': {}", raw, e)))?,
        None => Local::now().date_naive(),
    };

    let extractor = Arc::new(ManifestExtractor::from_file(&args.manifest)?);
    let source = args.source.as_deref().map(Table::open).transpose()?;
    let mut table = Table::open_or_create(&args.table)?;

    let batch = PassportBatch::new(config, extractor);
    let report = batch.run(&args.images, &mut table, source.as_ref(), today)?;

    log::info!(
        "Processed {} files ({} degraded); {} rows need review, {} expire within the horizon",
        report.rows.len(),
        report.degraded,
        report.health.flagged_rows(FlagKind::NeedsReview).len(),
        report.health.flagged_rows(FlagKind::ExpiringSoon).len()
    );
    if let Some(merge) = &report.merge {
        log::info!(
            "Merged travel details into {} rows ({} without a match)",
            merge.matched_rows,
            merge.unmatched_rows
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
