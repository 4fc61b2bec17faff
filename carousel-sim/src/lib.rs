//! # carousel-sim
//!
//! Step-by-step Round-Robin CPU scheduling simulation.
//!
//! The engine runs a whole simulation eagerly and returns a [`Trace`]: an
//! ordered list of immutable [`Step`] snapshots, one per scheduling decision,
//! each carrying the log lines, dispatch events, completions and rotation
//! order visible at that point. A [`Replay`] cursor walks the trace without
//! recomputing anything.
//!
//! ## Example Usage
//!
//! ```rust
//! use carousel_sim::{simulate, ProcessSpec, StepKind};
//!
//! let trace = simulate(
//!     &[ProcessSpec::new("P1", 0, 4), ProcessSpec::new("P2", 0, 3)],
//!     2,
//! )
//! .expect("valid input");
//!
//! let mut replay = trace.replay();
//! while replay.advance() {
//!     for line in &replay.current_step().logs {
//!         println!("{line}");
//!     }
//! }
//!
//! assert_eq!(replay.current_step().kind, StepKind::Summary);
//! let summary = trace.summary().expect("completed run");
//! assert_eq!(summary.average_turnaround, 6.5);
//! assert_eq!(summary.average_waiting, 3.0);
//! ```
//!
//! Seeded random workloads and multi-seed sweeps with invariant checking
//! live in [`runner`], [`workload`] and [`invariants`].

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]

/// Coverage assertions tracked across seeded runs.
pub mod assertions;
/// Engine configuration.
pub mod config;
/// The Round-Robin simulation engine.
pub mod engine;
/// Whole-trace invariant checks.
pub mod invariants;
/// Replay cursor over a computed trace.
pub mod replay;
/// Thread-local seeded randomness.
pub mod rng;
/// Multi-seed sweeps and reports.
pub mod runner;
/// Final results table.
pub mod summary;
/// Step snapshots and traces.
pub mod trace;
/// Seeded random workloads.
pub mod workload;

pub use assertions::{get_assertion_results, validate_assertion_contracts, AssertionStats};
pub use config::{SimulationConfig, DEFAULT_QUANTUM};
pub use engine::{simulate, SimulationEngine};
pub use invariants::{check_replay, check_trace, InvariantViolation};
pub use replay::{Replay, ReplayProgress};
pub use rng::{
    get_current_sim_seed, reset_sim_rng, set_sim_seed, sim_random, sim_random_range,
    sim_random_range_or_default,
};
pub use runner::{
    IterationControl, RunFailure, SimulationBuilder, SimulationMetrics, SimulationReport,
};
pub use summary::RunSummary;
pub use trace::{IdleGap, RunOutcome, Step, StepKind, Trace};
pub use workload::{Workload, WorkloadShape};

// Core type exports
pub use carousel_core::{
    CompletedProcess, DispatchEvent, ProcessId, ProcessSpec, ProcessTable, SimulationError,
    SimulationResult,
};
