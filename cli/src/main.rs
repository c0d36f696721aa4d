//! Thin CLI over `campus_market_core`: argument parsing and JSON
//! (de)serialization only, no business logic of its own.

use campus_market_core::gridsearch::{self, GridSearchReport};
use campus_market_core::simulator::config::{GridSearchConfig, SimulationConfig};
use campus_market_core::simulator::engine::{DailyDetail, SimulationEngine};
use campus_market_core::{catalogue, models::AdminConfig, Store};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "campus-market", about = "Campus Market simulation and ingest CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one simulation via `run_single` and print `{ metrics, daily_detail }`.
    Simulate {
        #[arg(long)]
        config: PathBuf,
    },
    /// Run a grid-search sweep to completion and print the ranked report.
    GridSearch {
        #[arg(long)]
        config: PathBuf,
    },
    /// Parse a CSV file into resources/slots and print a summary count.
    Ingest {
        #[arg(long)]
        csv: PathBuf,
    },
}

#[derive(Serialize)]
struct SimulateReport {
    metrics: campus_market_core::simulator::metrics::StabilityMetrics,
    daily_detail: Vec<DailyDetail>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Simulate { config } => run_simulate(&config),
        Command::GridSearch { config } => run_grid_search(&config),
        Command::Ingest { csv } => run_ingest(&csv),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_simulate(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let config: SimulationConfig = serde_json::from_str(&text)?;
    let mut engine = SimulationEngine::new(config.clone());
    let weeks = config.max_days.div_ceil(7).max(1);
    let results = engine.simulate_semester(weeks)?;
    let report = SimulateReport { metrics: results.metrics, daily_detail: results.daily_detail };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_grid_search(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let config: GridSearchConfig = serde_json::from_str(&text)?;
    let report: GridSearchReport = gridsearch::grid_search_to_completion(&config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_ingest(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let rows = catalogue::parse_csv(&text)?;
    let mut store = Store::new();
    let mut config = AdminConfig::default();
    let report = catalogue::import_resources(&mut store, &mut config, &rows);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
