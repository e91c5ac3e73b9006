//! CLI entry point for the spreadsheet cleaning pipeline.

use anyhow::{Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use sheet_cleaner::config::{
    DEFAULT_INPUT_FILE, DEFAULT_LOG_FILE, DEFAULT_REPORT_FILE, DEFAULT_SPREADSHEET,
};
use sheet_cleaner::sinks::{CsvFileSink, FileLineSink, LineSink, OperationalLog, SpreadsheetSink};
use sheet_cleaner::{Pipeline, PipelineConfig, PipelineResult, ReportGenerator, load_csv};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

#[cfg(feature = "sheets")]
use sheet_cleaner::sinks::{GoogleSheetsConfig, GoogleSheetsSink, SpreadsheetTarget};
#[cfg(feature = "sheets")]
use std::env;

/// Environment variable holding the OAuth bearer token for Google Sheets.
#[cfg(feature = "sheets")]
const TOKEN_ENV_VAR: &str = "GOOGLE_SHEETS_TOKEN";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Clean a survey CSV and publish it to a spreadsheet",
    long_about = "Imputes, filters, normalizes and encodes a survey table, then replaces \
                  the contents of a spreadsheet with the result.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  GOOGLE_SHEETS_TOKEN    OAuth bearer token for the Sheets and Drive APIs\n\n\
                  EXAMPLES:\n  \
                  # Clean the default file and publish to the default spreadsheet\n  \
                  sheet-cleaner\n\n  \
                  # Publish to a spreadsheet by ID\n  \
                  sheet-cleaner -i data.csv --sheet-id 1AbC...\n\n  \
                  # Write the cleaned table to a local CSV instead\n  \
                  sheet-cleaner -i data.csv --output-csv cleaned.csv\n\n  \
                  # Run the pipeline without publishing\n  \
                  sheet-cleaner -i data.csv --dry-run"
)]
struct Args {
    /// Path to the CSV file to process
    #[arg(short, long, default_value = DEFAULT_INPUT_FILE)]
    input: String,

    /// Name of the target spreadsheet
    #[arg(short, long, default_value = DEFAULT_SPREADSHEET)]
    sheet: String,

    /// ID of the target spreadsheet (takes precedence over --sheet)
    #[arg(long)]
    sheet_id: Option<String>,

    /// Operational log file (appended)
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Quality report file (appended)
    #[arg(long, default_value = DEFAULT_REPORT_FILE)]
    report_file: PathBuf,

    /// JSON file overriding the pipeline configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the cleaned table to this CSV file instead of the spreadsheet
    #[arg(long)]
    output_csv: Option<PathBuf>,

    /// Run the pipeline but skip publishing
    #[arg(long)]
    dry_run: bool,

    /// Write a detailed JSON report next to the input
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for console logging.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet);

    // Load environment variables from .env file
    dotenv().ok();

    let config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            PipelineConfig::from_json_file(path)?
        }
        None => PipelineConfig::default(),
    };

    let oplog_sink: Arc<dyn LineSink> = Arc::new(FileLineSink::new(&args.log_file));
    let report_sink: Arc<dyn LineSink> = Arc::new(FileLineSink::new(&args.report_file));
    let oplog = OperationalLog::new(oplog_sink.clone());

    let pipeline = Pipeline::builder()
        .config(config)
        .operational_log(oplog_sink)
        .report_log(report_sink)
        .build()?;

    oplog.info(format!("Loading dataset from: {}", args.input))?;
    let data = match load_csv(&args.input) {
        Ok(df) => df,
        Err(e) => {
            oplog.error(format!("Failed to load '{}': {}", args.input, e))?;
            return Err(anyhow!("Failed to load input: {}", e));
        }
    };
    oplog.info(format!(
        "Dataset loaded: {} rows x {} columns",
        data.height(),
        data.width()
    ))?;

    run_pipeline(&pipeline, &args, data)
}

/// Run the pipeline, publish, and print results.
///
/// The publishing target is resolved before cleaning starts, so a missing
/// token or spreadsheet fails the run before the report log is written.
fn run_pipeline(pipeline: &Pipeline, args: &Args, data: polars::prelude::DataFrame) -> Result<()> {
    let original_shape = data.shape();

    let mut sink = if args.dry_run {
        info!("Dry run: skipping publishing");
        None
    } else {
        Some(open_sink(args)?)
    };

    let result = pipeline.process(data).map_err(|e| {
        error!("Pipeline failed: {}", e);
        anyhow!("Pipeline failed: {}", e)
    })?;

    let output_target = match sink.as_mut() {
        Some(sink) => {
            let written = pipeline
                .publish(&result, &mut **sink)
                .map_err(|e| anyhow!("Publishing failed: {}", e))?;
            debug!("Published {} rows", written);
            Some(sink.name().to_string())
        }
        None => None,
    };

    if args.emit_report {
        let report = ReportGenerator::build_run_report(
            &args.input,
            output_target.as_deref(),
            original_shape,
            &result,
        );
        let output_dir = Path::new(&args.input)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let generator = ReportGenerator::new(output_dir);
        let report_path = generator.write_report_to_file(&report, &extract_file_stem(&args.input))?;
        info!("Report written to: {}", report_path.display());
    }

    print_summary(&result, original_shape, output_target.as_deref(), args);
    Ok(())
}

/// Pick the publishing target from the CLI flags.
#[cfg(feature = "sheets")]
fn open_sink(args: &Args) -> Result<Box<dyn SpreadsheetSink>> {
    if let Some(path) = &args.output_csv {
        return Ok(Box::new(CsvFileSink::new(path)));
    }

    let token = env::var(TOKEN_ENV_VAR)
        .map_err(|_| anyhow!("{} not set; use --output-csv to publish locally", TOKEN_ENV_VAR))?;

    let target = match &args.sheet_id {
        Some(id) => SpreadsheetTarget::Id(id.clone()),
        None => SpreadsheetTarget::Name(args.sheet.clone()),
    };

    info!("Connecting to Google Sheets...");
    let sink = GoogleSheetsSink::connect(token, target, GoogleSheetsConfig::default())?;
    Ok(Box::new(sink))
}

/// Pick the publishing target when Google Sheets support is not compiled in.
#[cfg(not(feature = "sheets"))]
fn open_sink(args: &Args) -> Result<Box<dyn SpreadsheetSink>> {
    match &args.output_csv {
        Some(path) => Ok(Box::new(CsvFileSink::new(path))),
        None => Err(anyhow!(
            "Google Sheets support not compiled in; compile with --features sheets or use --output-csv"
        )),
    }
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Print a human-readable summary of the run.
///
/// Uses `println!` so the summary shows regardless of log level.
fn print_summary(
    result: &PipelineResult,
    original_shape: (usize, usize),
    output_target: Option<&str>,
    args: &Args,
) {
    let report = &result.report;

    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!("  Input:            {}", args.input);
    println!(
        "  Rows:             {} -> {}",
        original_shape.0,
        result.data.height()
    );
    println!(
        "  Modified cells:   {} of {} ({:.2}%)",
        report.metrics.modified_cells, report.metrics.total_cells, report.modified_percentage
    );
    println!(
        "  Discarded rows:   {} of {} ({:.2}%)",
        report.metrics.discarded_rows, report.metrics.total_rows, report.discarded_percentage
    );
    for (column, median) in &report.metrics.medians {
        println!("  Median '{}': {}", column, median);
    }
    match output_target {
        Some(target) => println!("  Published to:     {}", target),
        None => println!("  Published to:     (dry run, nothing written)"),
    }

    if !args.quiet {
        println!();
        println!("STEPS");
        println!("{}", "-".repeat(40));
        for (i, step) in result.processing_steps.iter().enumerate() {
            println!("  {}. {}", i + 1, step);
        }
    }
    println!("{}", "=".repeat(80));
}
