//! Signal Log CLI Application
//!
//! This is the command-line interface for the signal log decoder.
//! It uses the signal-log-decoder library and adds:
//! - Argument parsing and TOML configuration
//! - Logging setup
//! - Per-signal summaries (computed in parallel)
//! - Text and JSON output sinks

use anyhow::{Context, Result};
use clap::Parser;
use signal_log_decoder::Decoder;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

mod config;
mod report;

use config::{AppConfig, OutputFormat, Overrides};

/// Signal Log Reader - Decode, interpolate and summarize signal logs
#[derive(Parser, Debug)]
#[command(name = "signal-log-cli")]
#[command(
    about = "Decode plain-text signal logs, fill missing x values and report per-signal statistics",
    long_about = None
)]
#[command(version)]
struct Args {
    /// Path to the signal log file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Connect points with lines instead of drawing markers
    #[arg(long)]
    line_mode: bool,

    /// Maximum value for the signals, larger values are clipped (default: 4096)
    #[arg(long, value_name = "VALUE")]
    maximum: Option<f64>,

    /// Output format
    #[arg(long, value_enum, value_name = "FORMAT")]
    format: Option<OutputFormat>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let start = Instant::now();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Signal Log CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", signal_log_decoder::VERSION);

    let mut app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };
    app_config.apply(Overrides {
        maximum: args.maximum,
        line_mode: args.line_mode,
        format: args.format,
        output: args.output.clone(),
    });
    config::validate(&app_config).context("Invalid configuration")?;
    log::debug!("Effective configuration: {:?}", app_config);

    run(&args.file, &app_config)?;

    log::info!("finished in {:.3} seconds", start.elapsed().as_secs_f64());
    Ok(())
}

/// Decode the log and hand the result to the configured sink
fn run(path: &Path, app_config: &AppConfig) -> Result<()> {
    let decoder = Decoder::new(app_config.decoder.clone());
    let decoded = decoder
        .decode_file(path)
        .with_context(|| format!("Failed to decode signal log: {:?}", path))?;

    if decoded.report.has_warnings() {
        log::warn!(
            "{} line(s) skipped, {} block(s) truncated",
            decoded.report.skipped_lines,
            decoded.report.truncated_blocks
        );
    }

    let mut out: Box<dyn Write> = match &app_config.output.file {
        Some(file) => {
            let file = File::create(file)
                .with_context(|| format!("Failed to create output file: {:?}", file))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };

    report::write_report(path, &decoded, &app_config.output, &mut *out)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
