//! Seeded random workloads.

use std::ops::Range;

use carousel_core::{ProcessSpec, ProcessTable, SimulationResult};
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::engine::SimulationEngine;
use crate::rng::{sim_random, sim_random_range_or_default};
use crate::trace::Trace;

/// Ranges a generated workload is drawn from.
///
/// Every range is half-open. Burst and quantum draws are raised to 1, so a
/// generated workload is always valid input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadShape {
    /// Number of processes.
    pub processes: Range<usize>,
    /// Arrival time of each process.
    pub arrival: Range<u64>,
    /// CPU burst of each process.
    pub burst: Range<u64>,
    /// Quantum of the run.
    pub quantum: Range<u64>,
}

impl Default for WorkloadShape {
    fn default() -> Self {
        Self {
            processes: 1..9,
            arrival: 0..20,
            burst: 1..12,
            quantum: 1..6,
        }
    }
}

impl WorkloadShape {
    /// Draw a workload from the current thread's simulation RNG.
    ///
    /// Call [`set_sim_seed`](crate::set_sim_seed) first for a reproducible
    /// result. Roughly one arrival in four repeats the previous one, so ties
    /// show up in most sweeps.
    pub fn generate(&self) -> Workload {
        let count = sim_random_range_or_default(self.processes.clone());
        let quantum = sim_random_range_or_default(self.quantum.clone()).max(1);

        let mut table = ProcessTable::new();
        let mut previous_arrival = None;
        for _ in 0..count {
            let arrival = match previous_arrival {
                Some(previous) if sim_random::<u8>() < 64 => previous,
                _ => sim_random_range_or_default(self.arrival.clone()),
            };
            let burst = sim_random_range_or_default(self.burst.clone()).max(1);
            table.add(arrival, burst);
            previous_arrival = Some(arrival);
        }

        Workload {
            processes: table.into_specs(),
            quantum,
        }
    }
}

/// One simulation input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    /// Processes, in input order.
    pub processes: Vec<ProcessSpec>,
    /// Quantum of the run.
    pub quantum: u64,
}

impl Workload {
    /// Wrap explicit input.
    pub fn new(processes: Vec<ProcessSpec>, quantum: u64) -> Self {
        Self { processes, quantum }
    }

    /// Engine configuration for this workload.
    pub fn config(&self) -> SimulationConfig {
        SimulationConfig::new(self.quantum)
    }

    /// Simulate this workload with its default configuration.
    pub fn run(&self) -> SimulationResult<Trace> {
        SimulationEngine::new(self.config()).run(&self.processes)
    }
}
