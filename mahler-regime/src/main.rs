//! Market regime detector CLI.
//!
//! # Usage
//!
//! ```bash
//! # Replay recorded ticks and print the final regime per file
//! mahler-regime replay --input data/spy.csv --input data/qqq.csv
//!
//! # Classify every 10th tick with a custom config, JSON output
//! mahler-regime replay --input data/spy.csv --config config/regime.toml --every 10 --json
//!
//! # Print the effective configuration
//! mahler-regime config --config config/regime.toml
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use mahler_regime::data::{replay_many, ReplayReport};
use mahler_regime::RegimeConfig;

const SEPARATOR: &str = "============================================================";

#[derive(Parser)]
#[command(name = "mahler-regime")]
#[command(about = "Streaming market regime detection")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay CSV tick files (timestamp,price,volume) through a detector
    Replay {
        /// Tick file; repeat for several instruments
        #[arg(short, long, required = true)]
        input: Vec<PathBuf>,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Classify after every N ticks
        #[arg(long, default_value_t = 1)]
        every: usize,

        /// Emit full reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<RegimeConfig> {
    let config = match path {
        Some(path) => RegimeConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RegimeConfig::default(),
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn print_report(report: &ReplayReport) {
    println!("{}", SEPARATOR);
    println!("{}", report.source);
    println!("{}", SEPARATOR);
    println!("Ticks: {}", report.ticks);
    println!("Detections: {}", report.detections.len());

    if let Some(last) = report.final_detection() {
        println!(
            "Final: {} ({}), confidence {:.2}, volatility {}",
            last.regime,
            last.regime.description(),
            last.confidence,
            last.volatility_state
        );
        println!(
            "Position size multiplier: {:.2}",
            last.regime.position_size_multiplier()
        );
    }
    println!();
    println!("{}", report.statistics.summary());
}

fn cmd_replay(
    input: Vec<PathBuf>,
    config: Option<PathBuf>,
    every: usize,
    json: bool,
) -> Result<()> {
    let config = load_config(config.as_ref())?;
    let results = replay_many(&input, &config, every);

    let mut reports = Vec::with_capacity(results.len());
    for (path, result) in input.iter().zip(results) {
        let report = result.with_context(|| format!("Replay failed for {}", path.display()))?;
        reports.push(report);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report);
        }
    }
    Ok(())
}

fn cmd_config(config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config.as_ref())?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mahler_regime=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            input,
            config,
            every,
            json,
        } => cmd_replay(input, config, every, json)?,
        Commands::Config { config } => cmd_config(config)?,
    }

    Ok(())
}
