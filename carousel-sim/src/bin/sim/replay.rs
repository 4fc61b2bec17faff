//! Binary target that prints one simulation step by step.
//!
//! Without `--processes`, a workload is generated from `--seed`. Each step's
//! log lines go to stdout in order, followed by the results table.

use std::process;

use carousel_sim::{set_sim_seed, ProcessTable, Workload, WorkloadShape, DEFAULT_QUANTUM};
use clap::Parser;

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "sim-replay")]
#[command(about = "Print a Round-Robin simulation one step at a time", long_about = None)]
struct Args {
    /// Seed used to generate the workload
    #[arg(short, long, default_value = "1")]
    seed: u64,

    /// Quantum; defaults to the generated one, or 3 with --processes
    #[arg(short, long)]
    quantum: Option<u64>,

    /// Explicit processes as comma-separated arrival:burst pairs
    /// Example: --processes 0:4,0:3,5:2
    #[arg(short, long)]
    processes: Option<String>,

    /// Print the trace as JSON instead of log lines
    #[arg(long)]
    json: bool,
}

fn parse_processes(list: &str) -> Result<ProcessTable, String> {
    let mut table = ProcessTable::new();
    for pair in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (arrival, burst) = pair
            .split_once(':')
            .ok_or_else(|| format!("expected arrival:burst, got '{pair}'"))?;
        let arrival = arrival
            .trim()
            .parse()
            .map_err(|e| format!("invalid arrival in '{pair}': {e}"))?;
        let burst = burst
            .trim()
            .parse()
            .map_err(|e| format!("invalid burst in '{pair}': {e}"))?;
        table.add(arrival, burst);
    }
    Ok(table)
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let workload = match &args.processes {
        Some(list) => match parse_processes(list) {
            Ok(table) => Workload::new(
                table.into_specs(),
                args.quantum.unwrap_or(DEFAULT_QUANTUM),
            ),
            Err(e) => {
                eprintln!("ERROR: {e}");
                process::exit(2);
            }
        },
        None => {
            set_sim_seed(args.seed);
            let mut workload = WorkloadShape::default().generate();
            if let Some(quantum) = args.quantum {
                workload.quantum = quantum;
            }
            workload
        }
    };

    let trace = match workload.run() {
        Ok(trace) => trace,
        Err(e) => {
            eprintln!("ERROR: {e}");
            process::exit(1);
        }
    };

    if args.json {
        match trace.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("ERROR: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let mut replay = trace.replay();
    loop {
        let step = replay.current_step();
        for line in &step.logs {
            println!("{line}");
        }
        if !replay.advance() {
            break;
        }
    }

    let progress = replay.progress();
    eprintln!(
        "Completed {} of {} processes, last finish at {}",
        progress.completed,
        progress.total,
        progress.latest_finish.unwrap_or(0)
    );
}
