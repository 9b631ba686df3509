//! SGF Decoder CLI Application
//!
//! This is the command-line interface for the SGF sounding log decoder.
//! It uses the sgf-decoder library and adds:
//! - TOML configuration
//! - Parallel decoding of several files
//! - Summary reports (TXT/JSON)

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use sgf_decoder::{Decoder, GovernanceMode};
use std::path::PathBuf;

mod config;
mod report;

use config::{AppConfig, OutputFormat};
use report::FileReport;

/// SGF Decoder - Derive hammering and flushing state from sounding logs
#[derive(Parser, Debug)]
#[command(name = "sgf-cli")]
#[command(about = "Decode SGF sounding logs and summarise hammering/flushing", long_about = None)]
#[command(version)]
struct Args {
    /// SGF files to decode
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Let K codes govern a category from the first row of a method block
    #[arg(long)]
    lookahead: bool,

    /// Flushing pressure above which flushing counts as active
    #[arg(long, value_name = "MPA")]
    threshold: Option<f64>,

    /// Report format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file for the report (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("SGF Decoder CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", sgf_decoder::VERSION);

    let config = resolve_config(&args)?;
    if config.input.files.is_empty() {
        println!("SGF Decoder - No input specified");
        println!("\nQuick Start:");
        println!("  sgf-cli borehole.tot");
        println!("  sgf-cli --lookahead --format json *.tot");
        println!("  sgf-cli --config config.toml");
        println!("\nUse --help for more options");
        return Ok(());
    }

    let reports = decode_files(&config);
    let failures = reports.iter().filter(|r| r.error.is_some()).count();

    let rendered = match config.output.format {
        OutputFormat::Txt => report::render_txt(&reports)?,
        OutputFormat::Json => report::render_json(&reports)?,
    };

    match &config.output.output_file {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write report: {:?}", path))?;
            log::info!("Report written to {:?}", path);
        }
        None => print!("{}", rendered),
    }

    if failures > 0 {
        anyhow::bail!("{} of {} file(s) failed to decode", failures, reports.len());
    }

    Ok(())
}

/// Merge the optional config file with command line overrides
fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            let config = config::load_config(path)?;
            log::debug!("Configuration loaded successfully");
            config
        }
        None => AppConfig::default(),
    };

    config.input.files.extend(args.files.iter().cloned());
    if args.lookahead {
        config.decoder.governance = GovernanceMode::Lookahead;
    }
    if let Some(threshold) = args.threshold {
        config.decoder.flushing_pressure_threshold = threshold;
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(output) = &args.output {
        config.output.output_file = Some(output.clone());
    }

    config::validate(&config)?;
    Ok(config)
}

/// Decode every input file in parallel; each file gets its own decoding pass
fn decode_files(config: &AppConfig) -> Vec<FileReport> {
    let decoder = Decoder::new(config.decoder.clone());

    config
        .input
        .files
        .par_iter()
        .map(|path| {
            match decoder
                .decode_file(path)
                .with_context(|| format!("Failed to decode {:?}", path))
            {
                Ok(methods) => {
                    for method in &methods {
                        for diagnostic in &method.diagnostics {
                            log::warn!("{:?}: {}", path, diagnostic);
                        }
                    }
                    FileReport::decoded(path, &methods)
                }
                Err(e) => {
                    log::error!("{:#}", e);
                    FileReport::failed(path, &e)
                }
            }
        })
        .collect()
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

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
