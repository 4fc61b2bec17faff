//! Per-seed metrics and the aggregated sweep report.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use carousel_core::SimulationError;
use thiserror::Error;

use crate::assertions::AssertionStats;
use crate::invariants::InvariantViolation;

/// Metrics collected from one seeded run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationMetrics {
    /// Wall-clock time spent simulating and checking.
    pub wall_time: Duration,
    /// Simulated time at which the last process finished.
    pub makespan: u64,
    /// Dispatch events recorded.
    pub dispatches: usize,
    /// Steps recorded.
    pub steps: usize,
}

/// Why a seeded run failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunFailure {
    /// The engine rejected the run.
    #[error("simulation error: {0}")]
    Simulation(#[from] SimulationError),

    /// The engine produced a trace that breaks an invariant.
    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// Aggregated results of a multi-seed sweep.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// Number of seeds run.
    pub iterations: usize,
    /// Runs that produced a valid trace.
    pub successful_runs: usize,
    /// Runs that failed.
    pub failed_runs: usize,
    /// Metrics summed over successful runs.
    pub metrics: SimulationMetrics,
    /// Outcome of each run, in seed order.
    pub individual_metrics: Vec<Result<SimulationMetrics, RunFailure>>,
    /// Seeds in the order they were run.
    pub seeds_used: Vec<u64>,
    /// Seeds whose run failed.
    pub seeds_failing: Vec<u64>,
    /// Coverage assertion results of the sweep.
    pub assertion_results: HashMap<String, AssertionStats>,
    /// Coverage assertions that never held.
    pub assertion_violations: Vec<String>,
}

impl SimulationReport {
    /// Percentage of successful runs.
    pub fn success_rate(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            (self.successful_runs as f64 / self.iterations as f64) * 100.0
        }
    }

    /// Returns `true` when every run succeeded.
    pub fn all_passed(&self) -> bool {
        self.failed_runs == 0
    }

    /// Mean wall time per successful run.
    pub fn average_wall_time(&self) -> Duration {
        if self.successful_runs == 0 {
            Duration::ZERO
        } else {
            self.metrics.wall_time / self.successful_runs as u32
        }
    }

    /// Mean makespan per successful run.
    pub fn average_makespan(&self) -> f64 {
        self.per_success(self.metrics.makespan as f64)
    }

    /// Mean number of dispatches per successful run.
    pub fn average_dispatches(&self) -> f64 {
        self.per_success(self.metrics.dispatches as f64)
    }

    /// Mean number of steps per successful run.
    pub fn average_steps(&self) -> f64 {
        self.per_success(self.metrics.steps as f64)
    }

    fn per_success(&self, total: f64) -> f64 {
        if self.successful_runs == 0 {
            0.0
        } else {
            total / self.successful_runs as f64
        }
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Simulation Report ===")?;
        writeln!(f, "Iterations: {}", self.iterations)?;
        writeln!(f, "Successful: {}", self.successful_runs)?;
        writeln!(f, "Failed: {}", self.failed_runs)?;
        writeln!(f, "Success Rate: {:.2}%", self.success_rate())?;
        writeln!(f)?;
        writeln!(f, "Average Wall Time: {:?}", self.average_wall_time())?;
        writeln!(f, "Average Makespan: {:.1}", self.average_makespan())?;
        writeln!(f, "Average Dispatches: {:.1}", self.average_dispatches())?;
        writeln!(f, "Average Steps: {:.1}", self.average_steps())?;

        if !self.seeds_failing.is_empty() {
            writeln!(f)?;
            writeln!(f, "Faulty seeds: {:?}", self.seeds_failing)?;
            for (seed, result) in self.seeds_used.iter().zip(&self.individual_metrics) {
                if let Err(failure) = result {
                    writeln!(f, "  seed {seed}: {failure}")?;
                }
            }
        }

        if !self.assertion_violations.is_empty() {
            writeln!(f)?;
            writeln!(f, "=== Coverage Gaps ===")?;
            for v in &self.assertion_violations {
                writeln!(f, "  - {}", v)?;
            }
        }

        if !self.assertion_results.is_empty() {
            writeln!(f)?;
            writeln!(f, "Assertions tracked: {}", self.assertion_results.len())?;
        }

        Ok(())
    }
}
