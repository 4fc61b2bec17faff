//! Multi-seed sweep configuration and execution.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use tracing::instrument;

use crate::assertions::{get_assertion_results, reset_assertion_results, validate_assertion_contracts};
use crate::engine::SimulationEngine;
use crate::invariants::{check_replay, check_trace};
use crate::rng::{reset_sim_rng, set_sim_seed};
use crate::runner::report::{RunFailure, SimulationMetrics, SimulationReport};
use crate::sometimes_assert;
use crate::trace::Trace;
use crate::workload::{Workload, WorkloadShape};

/// How many seeds a sweep runs.
#[derive(Debug, Clone)]
pub enum IterationControl {
    /// Run exactly this many seeds.
    FixedCount(usize),
    /// Keep running seeds until this much wall time has passed.
    TimeLimit(Duration),
}

/// Builder for a seeded sweep of random workloads.
///
/// Every seed generates one workload from the configured
/// [`WorkloadShape`], simulates it, and checks the trace with
/// [`check_trace`] and [`check_replay`].
///
/// # Examples
///
/// ```
/// use carousel_sim::SimulationBuilder;
///
/// let report = SimulationBuilder::new()
///     .set_debug_seeds(vec![1, 2, 3])
///     .set_iterations(3)
///     .run();
/// assert_eq!(report.seeds_used, vec![1, 2, 3]);
/// assert!(report.all_passed());
/// ```
#[derive(Debug, Clone)]
pub struct SimulationBuilder {
    iteration_control: IterationControl,
    seeds: Vec<u64>,
    shape: WorkloadShape,
    max_iterations: Option<usize>,
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationBuilder {
    /// One iteration of the default workload shape.
    pub fn new() -> Self {
        Self {
            iteration_control: IterationControl::FixedCount(1),
            seeds: Vec::new(),
            shape: WorkloadShape::default(),
            max_iterations: None,
        }
    }

    /// Ranges generated workloads are drawn from.
    pub fn workload_shape(mut self, shape: WorkloadShape) -> Self {
        self.shape = shape;
        self
    }

    /// Run a fixed number of seeds.
    pub fn set_iterations(mut self, iterations: usize) -> Self {
        self.iteration_control = IterationControl::FixedCount(iterations);
        self
    }

    /// Set the iteration control directly.
    pub fn set_iteration_control(mut self, control: IterationControl) -> Self {
        self.iteration_control = control;
        self
    }

    /// Run seeds until `duration` of wall time has passed.
    pub fn set_time_limit(mut self, duration: Duration) -> Self {
        self.iteration_control = IterationControl::TimeLimit(duration);
        self
    }

    /// Run these seeds first, in order, before generated ones.
    ///
    /// Useful for reproducing a faulty seed from an earlier report.
    pub fn set_debug_seeds(mut self, seeds: Vec<u64>) -> Self {
        self.seeds = seeds;
        self
    }

    /// Override the engine iteration cap for every run.
    pub fn with_max_iterations(mut self, limit: usize) -> Self {
        self.max_iterations = Some(limit);
        self
    }

    /// Run the sweep.
    #[instrument(skip_all)]
    pub fn run(self) -> SimulationReport {
        let mut seeds_to_use = self.seeds.clone();
        let mut individual_metrics = Vec::new();
        let mut successful_runs = 0;
        let mut failed_runs = 0;
        let mut aggregated_metrics = SimulationMetrics::default();
        let mut faulty_seeds = Vec::new();

        let base_seed = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(12345);

        reset_assertion_results();

        let mut iteration_count = 0;
        let start_time = Instant::now();

        loop {
            match &self.iteration_control {
                IterationControl::FixedCount(count) => {
                    if iteration_count >= *count {
                        break;
                    }
                }
                IterationControl::TimeLimit(duration) => {
                    if start_time.elapsed() >= *duration {
                        break;
                    }
                }
            }

            let seed = if iteration_count < seeds_to_use.len() {
                seeds_to_use[iteration_count]
            } else {
                let mut hasher = DefaultHasher::new();
                base_seed.hash(&mut hasher);
                iteration_count.hash(&mut hasher);
                let new_seed = hasher.finish();
                seeds_to_use.push(new_seed);
                new_seed
            };

            iteration_count += 1;
            tracing::info!(iteration = iteration_count, seed, "Starting iteration");

            reset_sim_rng();
            set_sim_seed(seed);

            let workload = self.shape.generate();
            let result = self.run_one(&workload);

            match &result {
                Ok(metrics) => {
                    successful_runs += 1;
                    aggregated_metrics.wall_time += metrics.wall_time;
                    aggregated_metrics.makespan += metrics.makespan;
                    aggregated_metrics.dispatches += metrics.dispatches;
                    aggregated_metrics.steps += metrics.steps;
                }
                Err(failure) => {
                    failed_runs += 1;
                    faulty_seeds.push(seed);
                    tracing::error!(seed, %failure, "Iteration failed");
                }
            }
            individual_metrics.push(result);
        }

        seeds_to_use.truncate(iteration_count);

        SimulationReport {
            iterations: iteration_count,
            successful_runs,
            failed_runs,
            metrics: aggregated_metrics,
            individual_metrics,
            seeds_used: seeds_to_use,
            seeds_failing: faulty_seeds,
            assertion_results: get_assertion_results(),
            assertion_violations: validate_assertion_contracts(),
        }
    }

    fn run_one(&self, workload: &Workload) -> Result<SimulationMetrics, RunFailure> {
        let mut config = workload.config();
        if let Some(limit) = self.max_iterations {
            config = config.with_max_iterations(limit);
        }

        let started = Instant::now();
        let trace = SimulationEngine::new(config).run(&workload.processes)?;
        check_trace(&trace, &workload.processes)?;
        check_replay(&trace)?;
        record_coverage(&trace, workload);

        Ok(SimulationMetrics {
            wall_time: started.elapsed(),
            makespan: trace.last_step().time,
            dispatches: trace.events().len(),
            steps: trace.len(),
        })
    }
}

/// Note which scheduling situations this run exercised.
fn record_coverage(trace: &Trace, workload: &Workload) {
    let events = trace.events();

    sometimes_assert!(
        cpu_idle,
        trace.iter().any(|step| step.idle.is_some()),
        "CPU idled waiting for an arrival"
    );
    sometimes_assert!(
        arrival_during_execution,
        events.iter().any(|event| {
            workload
                .processes
                .iter()
                .any(|p| p.id != event.process && p.arrival > event.start && p.arrival <= event.end)
        }),
        "a process arrived while another held the CPU"
    );
    sometimes_assert!(
        simultaneous_arrivals,
        workload.processes.iter().enumerate().any(|(i, p)| {
            workload.processes[i + 1..]
                .iter()
                .any(|q| q.arrival == p.arrival)
        }),
        "two processes arrived at the same instant"
    );
    sometimes_assert!(
        preempted_by_quantum,
        events.iter().any(|event| !event.completes()),
        "a process was rotated with work left"
    );
    sometimes_assert!(
        short_final_slice,
        events.iter().any(|event| event.duration() < trace.quantum()),
        "a slice ended before the quantum"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_seeds_run_first() {
        let report = SimulationBuilder::new()
            .set_debug_seeds(vec![11, 22])
            .set_iterations(4)
            .run();

        assert_eq!(report.iterations, 4);
        assert_eq!(&report.seeds_used[..2], &[11, 22]);
        assert_eq!(report.seeds_used.len(), 4);
        assert!(report.all_passed(), "{report}");
    }

    #[test]
    fn test_same_seed_same_metrics() {
        let run = || {
            SimulationBuilder::new()
                .set_debug_seeds(vec![5])
                .set_iterations(1)
                .run()
        };
        let (a, b) = (run(), run());

        let strip = |report: &SimulationReport| {
            report
                .individual_metrics
                .iter()
                .map(|m| m.as_ref().map(|m| (m.makespan, m.dispatches, m.steps)).ok())
                .collect::<Vec<_>>()
        };
        assert_eq!(strip(&a), strip(&b));
    }

    #[test]
    fn test_iteration_cap_failures_are_reported() {
        let report = SimulationBuilder::new()
            .workload_shape(WorkloadShape {
                processes: 2..3,
                arrival: 0..1,
                burst: 10..11,
                quantum: 1..2,
            })
            .with_max_iterations(2)
            .set_debug_seeds(vec![3])
            .set_iterations(1)
            .run();

        assert_eq!(report.failed_runs, 1);
        assert_eq!(report.seeds_failing, vec![3]);
        assert!(matches!(
            report.individual_metrics[0],
            Err(RunFailure::Simulation(
                carousel_core::SimulationError::IterationLimitExceeded { limit: 2 }
            ))
        ));
    }

    #[test]
    fn test_time_limit_stops() {
        let report = SimulationBuilder::new()
            .set_time_limit(Duration::from_millis(50))
            .run();

        assert!(report.iterations >= 1);
        assert_eq!(report.seeds_used.len(), report.iterations);
    }

    #[test]
    fn test_zero_iterations() {
        let report = SimulationBuilder::new().set_iterations(0).run();
        assert_eq!(report.iterations, 0);
        assert!(report.seeds_used.is_empty());
        assert_eq!(report.success_rate(), 0.0);
    }

    #[test]
    fn test_sweep_covers_scheduling_situations() {
        let report = SimulationBuilder::new()
            .set_debug_seeds((0..200).collect())
            .set_iterations(200)
            .run();

        assert!(report.all_passed(), "{report}");
        assert!(report.assertion_violations.is_empty(), "{report}");
        for name in ["cpu_idle", "arrival_during_execution", "simultaneous_arrivals"] {
            assert!(report.assertion_results.contains_key(name));
        }
    }
}
