//! `taxi-sim`: run one simulated day of taxi dispatch from the terminal.

mod console;
mod export;
mod prompt;
mod report;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use taxi_core::events::{NullObserver, TripObserver};
use taxi_core::runner::Simulation;
use taxi_core::scenario::SimParams;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::console::ConsoleReporter;
use crate::report::FinalReport;

#[derive(Parser, Debug)]
#[command(name = "taxi-sim")]
#[command(about = "Simulate a day of taxi dispatch with one thread per client")]
struct Args {
    /// Number of taxis; prompted for when omitted.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    taxis: Option<u64>,

    /// Number of clients; prompted for when omitted.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    clients: Option<u64>,

    /// RNG seed for a reproducible fleet layout and client behaviour.
    #[arg(long, env = "TAXI_SIM_SEED")]
    seed: Option<u64>,

    /// Real milliseconds per simulated minute.
    #[arg(long)]
    minute_ms: Option<u64>,

    /// Simulated minutes before new trips stop being admitted.
    #[arg(long)]
    day_minutes: Option<u64>,

    /// JSON file with scenario parameters. Missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the final report as JSON.
    #[arg(long)]
    export_json: Option<PathBuf>,

    /// Write the per-taxi rows of the final report as CSV.
    #[arg(long)]
    export_csv: Option<PathBuf>,

    /// Skip the per-trip blocks and print only the final report.
    #[arg(short, long)]
    quiet: bool,

    /// Log dispatch decisions to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_thread_names(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;
    Ok(())
}

fn load_params(config: Option<&Path>) -> anyhow::Result<SimParams> {
    match config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))
        }
        None => Ok(SimParams::default()),
    }
}

fn apply_overrides(mut params: SimParams, args: &Args) -> SimParams {
    if let Some(seed) = args.seed {
        params = params.with_seed(seed);
    }
    if let Some(ms) = args.minute_ms {
        params = params.with_real_ms_per_minute(ms);
    }
    if let Some(minutes) = args.day_minutes {
        params = params.with_day_minutes(minutes);
    }
    params
}

fn population(flag: Option<u64>, prompt_text: &str) -> anyhow::Result<usize> {
    match flag {
        Some(count) => usize::try_from(count).context("population does not fit in memory"),
        None => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut output = io::stdout();
            prompt::read_positive_int(&mut input, &mut output, prompt_text)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let params = apply_overrides(load_params(args.config.as_deref())?, &args);
    params.validate()?;

    let taxi_count = population(args.taxis, "Enter the number of taxis: ")?;
    let client_count = population(args.clients, "Enter the number of clients: ")?;

    let observer: Arc<dyn TripObserver> = if args.quiet {
        Arc::new(NullObserver)
    } else {
        Arc::new(ConsoleReporter::new(io::stdout(), params.day_minutes))
    };

    let simulation = Simulation::new(params, taxi_count, client_count, observer)?;
    info!(
        seed = simulation.seed(),
        taxis = taxi_count,
        clients = client_count,
        "starting simulation"
    );
    let outcome = simulation.run()?;

    let report = FinalReport::from_outcome(&outcome);
    let mut stdout = io::stdout().lock();
    report.render(&mut stdout)?;
    stdout.flush()?;

    if let Some(path) = &args.export_json {
        export::export_to_json(&report, path)?;
        info!(path = %path.display(), "exported JSON report");
    }
    if let Some(path) = &args.export_csv {
        export::export_to_csv(&report, path)?;
        info!(path = %path.display(), "exported CSV report");
    }
    Ok(())
}
