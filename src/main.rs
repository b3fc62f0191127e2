use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, Local, NaiveDate};
use clap::{CommandFactory, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use shift_extract::calendar::{ShiftEvent, stamp_all};
use shift_extract::config::Settings;
use shift_extract::{
    Extraction, PageFault, ShiftExtractor, TargetName, YearMonth, document, period,
};

#[derive(Parser)]
#[command(
    name = "shift_extract",
    about = "Find one person's shifts in decoded schedule documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Extract shifts from a document (.json / .txt) or a directory of them
    Extract {
        path: PathBuf,
        /// Person to search for; overrides `target_name` in the settings
        #[arg(long)]
        name: Option<String>,
        /// Settings file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write <stem>.shifts.json files here instead of printing
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show the year and month read from a file name, e.g. "令和6年5月シフト表.pdf"
    Period { file_name: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Extract {
            path,
            name,
            config,
            output,
        }) => run_extract(&path, name, config.as_deref(), output.as_deref()),
        Some(Command::Period { file_name }) => {
            run_period(&file_name);
            Ok(())
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level {level:?}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!(e))
}

// ═══════════════════════════════════════════════════════════════════════
//  EXTRACT
// ═══════════════════════════════════════════════════════════════════════

/// One document's output.
#[derive(Serialize)]
struct Report {
    source: String,
    target_name: String,
    period: Option<YearMonth>,
    period_source: &'static str,
    #[serde(flatten)]
    extraction: Extraction,
    events: Vec<ShiftEvent>,
}

fn run_extract(
    root: &Path,
    name: Option<String>,
    config: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let mut settings = Settings::load(config).context("loading settings")?;
    if let Some(name) = name {
        settings.target_name = name;
        settings.validate()?;
    }
    init_tracing(&settings.log_level)?;

    let target = TargetName::new(settings.target_name.as_str())?;
    let extractor = ShiftExtractor::new(target, settings.policy.grid(), &settings.policy.text())?;

    let paths = document::discover(root)
        .with_context(|| format!("cannot scan {}", root.display()))?;
    eprintln!("Found {} document(s) under {}", paths.len(), root.display());

    if let Some(dir) = output {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create {}", dir.display()))?;
    }

    let today = Local::now().date_naive();
    let (mut shifts, mut faults) = (0usize, 0usize);

    for path in &paths {
        let report = build_report(&extractor, &settings, path, today)?;
        if report.extraction.is_empty() {
            eprintln!(
                "  {}: no shifts found for {}",
                path.display(),
                report.target_name
            );
        }
        shifts += report.extraction.shifts.len();
        faults += report.extraction.faults.len();
        emit(&report, path, output)?;
    }

    eprintln!(
        "Processed {} document(s): {shifts} shift(s), {faults} fault(s)",
        paths.len()
    );
    Ok(())
}

fn build_report(
    extractor: &ShiftExtractor<'_>,
    settings: &Settings,
    path: &Path,
    today: NaiveDate,
) -> Result<Report> {
    let (file_name, pages, extraction) = match document::load(path) {
        Ok(doc) => {
            let pages = doc.pages.iter().map(|p| p.as_ref().map_err(Clone::clone));
            let extraction = extractor.extract(pages);
            let name = doc.display_name().map(str::to_string);
            (name, doc.decoded_pages(), extraction)
        }
        Err(e) => {
            // The rest of the batch still runs
            tracing::warn!(path = %path.display(), "{e}");
            let fault = PageFault::Undecodable {
                page: 0,
                reason: e.to_string(),
            };
            let name = path.file_name().and_then(|n| n.to_str()).map(str::to_string);
            (name, Vec::new(), Extraction::failed(fault))
        }
    };

    let resolution = period::resolve(file_name.as_deref(), &pages, today);
    let (period, period_source) = match resolution.year_month() {
        Some(ym) => (Some(ym), resolution.source()),
        None => {
            let ym = YearMonth::new(today.year(), today.month());
            tracing::warn!(
                path = %path.display(),
                "year/month not found, using the current month"
            );
            (ym, "today")
        }
    };

    let events = match period {
        Some(ym) => stamp_all(&extraction.shifts, ym, &settings.event)?,
        None => Vec::new(),
    };

    Ok(Report {
        source: path.display().to_string(),
        target_name: settings.target_name.clone(),
        period,
        period_source,
        extraction,
        events,
    })
}

fn emit(report: &Report, source: &Path, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    let Some(dir) = output else {
        println!("{json}");
        return Ok(());
    };

    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let path = dir.join(format!("{stem}.shifts.json"));
    std::fs::write(&path, &json).with_context(|| format!("cannot write {}", path.display()))?;
    eprintln!("  {} ({} bytes)", path.display(), json.len());
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
//  PERIOD
// ═══════════════════════════════════════════════════════════════════════

fn run_period(file_name: &str) {
    let today = Local::now().date_naive();
    match period::from_file_name(file_name, today) {
        Some(ym) => println!("{}年{}月", ym.year, ym.month_padded()),
        None => eprintln!("No year/month found in {file_name:?}"),
    }
}
