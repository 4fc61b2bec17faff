//! Developer commands for the Round-Robin simulation binaries.
//!
//! `sweep` runs `sim-round-robin` in release mode. When seeds fail, each one
//! is run again on its own with debug logging, and the matching `replay`
//! command is printed. `replay` forwards to `sim-replay`.

use std::io::{self, Write};
use std::process::{self, Command, Output};
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};

const SWEEP_BIN: &str = "sim-round-robin";
const REPLAY_BIN: &str = "sim-replay";

/// Line of the sweep report that lists failing seeds.
const FAULTY_SEEDS_PREFIX: &str = "Faulty seeds:";

#[derive(Parser, Debug)]
#[command(name = "xtask", about = "Run and triage the simulation binaries")]
struct Cli {
    #[command(subcommand)]
    command: Task,
}

#[derive(Subcommand, Debug)]
enum Task {
    /// Run the seeded invariant sweep and rerun any faulty seed alone
    Sweep(SweepArgs),
    /// Print one simulation step by step
    Replay(ReplayArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
struct SweepArgs {
    /// Number of seeds to run
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Seed to run first; repeatable
    #[arg(short, long)]
    seed: Vec<u64>,

    /// Run seeds for this many seconds instead of a fixed count
    #[arg(long)]
    time_limit: Option<u64>,

    /// Skip the per-seed rerun of failing seeds
    #[arg(long)]
    no_rerun: bool,
}

impl SweepArgs {
    fn binary_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(n) = self.iterations {
            args.extend(["--iterations".to_string(), n.to_string()]);
        }
        for seed in &self.seed {
            args.extend(["--seed".to_string(), seed.to_string()]);
        }
        if let Some(secs) = self.time_limit {
            args.extend(["--time-limit".to_string(), secs.to_string()]);
        }
        args
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
struct ReplayArgs {
    /// Seed used to generate the workload
    seed: Option<u64>,

    /// Quantum override
    #[arg(short, long)]
    quantum: Option<u64>,

    /// Explicit processes as comma-separated arrival:burst pairs
    #[arg(short, long)]
    processes: Option<String>,

    /// Print the trace as JSON
    #[arg(long)]
    json: bool,
}

impl ReplayArgs {
    fn binary_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(seed) = self.seed {
            args.extend(["--seed".to_string(), seed.to_string()]);
        }
        if let Some(q) = self.quantum {
            args.extend(["--quantum".to_string(), q.to_string()]);
        }
        if let Some(list) = &self.processes {
            args.extend(["--processes".to_string(), list.clone()]);
        }
        if self.json {
            args.push("--json".to_string());
        }
        args
    }
}

fn main() {
    let cli = Cli::parse();

    let code = match cli.command {
        Task::Sweep(args) => sweep(&args),
        Task::Replay(args) => replay(&args),
    };
    process::exit(code);
}

fn cargo_run(bin: &str, args: &[String]) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(["run", "--quiet", "--release", "--package", "carousel-sim", "--bin", bin, "--"]);
    cmd.args(args);
    cmd
}

fn replay(args: &ReplayArgs) -> i32 {
    match cargo_run(REPLAY_BIN, &args.binary_args()).status() {
        Ok(status) => status.code().unwrap_or(1),
        Err(e) => {
            eprintln!("{REPLAY_BIN}: failed to launch: {e}");
            1
        }
    }
}

fn sweep(args: &SweepArgs) -> i32 {
    let started = Instant::now();
    let output = match capture(cargo_run(SWEEP_BIN, &args.binary_args())) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("{SWEEP_BIN}: failed to launch: {e}");
            return 1;
        }
    };

    if output.status.success() {
        eprintln!("sweep passed ({})", fmt_duration(started.elapsed()));
        return 0;
    }

    let report = String::from_utf8_lossy(&output.stderr);
    let faulty = parse_faulty_seeds(&report);
    if faulty.is_empty() {
        // Failed without a seed to blame: a build error or a coverage gap.
        eprintln!("sweep failed with no faulty seed ({})", fmt_duration(started.elapsed()));
        return output.status.code().unwrap_or(1);
    }

    eprintln!("sweep failed on {} seed(s): {faulty:?}", faulty.len());
    if !args.no_rerun {
        for seed in &faulty {
            rerun_seed(*seed);
        }
    }

    eprintln!();
    eprintln!("Reproduce step by step with:");
    for seed in &faulty {
        eprintln!("  cargo xtask replay {seed}");
    }
    1
}

/// Run one seed alone with debug logging so its trace is readable.
fn rerun_seed(seed: u64) {
    eprintln!();
    eprintln!("--- seed {seed} ---");
    let mut cmd = cargo_run(
        SWEEP_BIN,
        &[
            "--seed".to_string(),
            seed.to_string(),
            "--iterations".to_string(),
            "1".to_string(),
        ],
    );
    cmd.env("RUST_LOG", "warn,carousel_sim=debug");
    if let Err(e) = cmd.status() {
        eprintln!("{SWEEP_BIN}: failed to rerun seed {seed}: {e}");
    }
}

/// Run `cmd`, echo what it printed, and hand the output back for parsing.
fn capture(mut cmd: Command) -> io::Result<Output> {
    let output = cmd.output()?;
    io::stdout().write_all(&output.stdout)?;
    io::stderr().write_all(&output.stderr)?;
    Ok(output)
}

/// Seeds listed on the `Faulty seeds: [..]` line of a sweep report.
fn parse_faulty_seeds(report: &str) -> Vec<u64> {
    report
        .lines()
        .find_map(|line| line.trim().strip_prefix(FAULTY_SEEDS_PREFIX))
        .map(|list| {
            list.trim()
                .trim_start_matches('[')
                .trim_end_matches(']')
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect()
        })
        .unwrap_or_default()
}

fn fmt_duration(d: Duration) -> String {
    if d.as_secs() < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {:02}s", d.as_secs() / 60, d.as_secs() % 60)
    }
}
