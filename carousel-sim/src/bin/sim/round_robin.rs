//! Binary target for the Round-Robin seed sweep.
//!
//! Generates one random workload per seed, simulates it, and checks every
//! trace against the scheduling invariants. Exits non-zero if any seed fails.

use std::process;
use std::time::Duration;

use carousel_sim::SimulationBuilder;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "sim-round-robin")]
#[command(about = "Seeded Round-Robin simulation sweep with invariant checks", long_about = None)]
struct Args {
    /// Number of seeds to run
    #[arg(short, long, default_value = "500")]
    iterations: usize,

    /// Seed to run first; repeat to reproduce several faulty seeds
    #[arg(short, long)]
    seed: Vec<u64>,

    /// Run seeds for this many seconds instead of a fixed count
    #[arg(long)]
    time_limit: Option<u64>,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,carousel_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let iterations = args.iterations.max(args.seed.len());
    let mut builder = SimulationBuilder::new()
        .set_debug_seeds(args.seed)
        .set_iterations(iterations);
    if let Some(secs) = args.time_limit {
        builder = builder.set_time_limit(Duration::from_secs(secs));
    }

    let report = builder.run();

    eprintln!("{report}");

    if !report.all_passed() {
        eprintln!(
            "ERROR: {} of {} seeds failed",
            report.failed_runs, report.iterations
        );
        process::exit(1);
    }
}
