//! CLI entry point for the avoidance-strategy benchmark.
//!
//! ```bash
//! # Sweep all three methods across the default agent-count ladder
//! cargo run -p sim_bench -- run-full
//!
//! # Sweep with a custom scenario/sweep config and write CSV to a file
//! cargo run -p sim_bench -- run-full --scenario scenario.ron --sweep sweep.ron --output results.csv
//!
//! # Run a single method/agent-count pair and print one record
//! cargo run -p sim_bench -- run-one --method direct --agents 20
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sim_bench::{run_full, run_single, BenchmarkMethod, CsvSink, ScenarioConfig, SweepConfig};

#[derive(Parser)]
#[command(name = "sim_bench")]
#[command(about = "Compare navigation avoidance strategies across agent counts")]
#[command(version)]
struct Cli {
    /// Enable verbose (debug-level) logging to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep every configured `(method, agent_count)` pair and emit a CSV
    /// results stream (§4.6, §6).
    RunFull {
        /// Scenario RON file (grid/agent defaults). Falls back to built-in
        /// defaults if omitted.
        #[arg(long)]
        scenario: Option<PathBuf>,

        /// Sweep RON file (agent counts, methods, frame/timeout caps).
        /// Falls back to built-in defaults if omitted.
        #[arg(long)]
        sweep: Option<PathBuf>,

        /// Output CSV path. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a single `(method, agent_count)` pair and print one record.
    RunOne {
        /// Avoidance method to run.
        #[arg(short, long, value_enum)]
        method: CliMethod,

        /// Number of agents to spawn.
        #[arg(short, long)]
        agents: u32,

        /// Scenario RON file. Falls back to built-in defaults if omitted.
        #[arg(long)]
        scenario: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CliMethod {
    Direct,
    Indirect,
    None,
}

impl From<CliMethod> for BenchmarkMethod {
    fn from(value: CliMethod) -> Self {
        match value {
            CliMethod::Direct => Self::Direct,
            CliMethod::Indirect => Self::Indirect,
            CliMethod::None => Self::None,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::RunFull {
            scenario,
            sweep,
            output,
        } => cmd_run_full(scenario, sweep, output),
        Commands::RunOne {
            method,
            agents,
            scenario,
        } => cmd_run_one(method, agents, scenario),
    }
}

fn load_scenario(path: Option<PathBuf>) -> ScenarioConfig {
    match path {
        Some(path) => match ScenarioConfig::load(&path) {
            Ok(scenario) => scenario,
            Err(err) => {
                eprintln!("failed to load scenario {}: {err}", path.display());
                std::process::exit(1);
            }
        },
        None => ScenarioConfig::default(),
    }
}

fn cmd_run_full(scenario_path: Option<PathBuf>, sweep_path: Option<PathBuf>, output: Option<PathBuf>) {
    let scenario = load_scenario(scenario_path);
    let sweep = match sweep_path {
        Some(path) => match SweepConfig::load(&path) {
            Ok(sweep) => sweep,
            Err(err) => {
                eprintln!("failed to load sweep config {}: {err}", path.display());
                std::process::exit(1);
            }
        },
        None => SweepConfig::default(),
    };

    tracing::info!(
        agent_counts = ?sweep.agent_counts,
        methods = ?sweep.methods,
        "starting full sweep"
    );

    let result = match output {
        Some(path) => match std::fs::File::create(&path) {
            Ok(file) => run_full(&scenario, &sweep, &mut CsvSink::new(file)),
            Err(err) => {
                eprintln!("failed to create output file {}: {err}", path.display());
                std::process::exit(1);
            }
        },
        None => run_full(&scenario, &sweep, &mut CsvSink::new(std::io::stdout())),
    };

    if let Err(err) = result {
        eprintln!("sweep failed: {err}");
        std::process::exit(1);
    }
}

fn cmd_run_one(method: CliMethod, agents: u32, scenario_path: Option<PathBuf>) {
    let scenario = load_scenario(scenario_path);
    let method = BenchmarkMethod::from(method);
    let record = run_single(&scenario, method, agents);
    println!("{}", sim_bench::metrics::CSV_HEADER);
    println!("{}", record.to_csv_line());
}
