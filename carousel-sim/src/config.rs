//! Engine configuration.

use carousel_core::{ProcessSpec, SimulationError, SimulationResult};
use serde::{Deserialize, Serialize};

/// Quantum used when none is specified.
pub const DEFAULT_QUANTUM: u64 = 3;

/// Configuration of a single simulation run.
///
/// # Examples
///
/// ```
/// use carousel_sim::SimulationConfig;
///
/// let config = SimulationConfig::new(4).with_max_iterations(1_000);
/// assert_eq!(config.quantum, 4);
/// assert!(config.validate().is_ok());
/// assert!(SimulationConfig::new(0).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Maximum contiguous CPU time granted per turn. Must be positive.
    pub quantum: u64,
    /// Cap on engine iterations. When unset, derived from the input as
    /// `sum(burst) + process_count + 1`, which a valid run never reaches.
    pub max_iterations: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new(DEFAULT_QUANTUM)
    }
}

impl SimulationConfig {
    /// Configuration with the given quantum and a derived iteration cap.
    pub fn new(quantum: u64) -> Self {
        Self {
            quantum,
            max_iterations: None,
        }
    }

    /// Override the iteration cap.
    pub fn with_max_iterations(mut self, limit: usize) -> Self {
        self.max_iterations = Some(limit);
        self
    }

    /// Reject a zero quantum.
    pub fn validate(&self) -> SimulationResult<()> {
        if self.quantum == 0 {
            return Err(SimulationError::InvalidQuantum {
                quantum: self.quantum,
            });
        }
        Ok(())
    }

    /// Iteration cap that applies to `processes`.
    pub fn iteration_limit(&self, processes: &[ProcessSpec]) -> usize {
        self.max_iterations.unwrap_or_else(|| {
            // Every dispatch consumes at least one unit of burst and every idle
            // jump lands on a distinct arrival.
            let total_burst = processes
                .iter()
                .map(|p| p.burst)
                .fold(0u64, u64::saturating_add);
            usize::try_from(total_burst)
                .unwrap_or(usize::MAX)
                .saturating_add(processes.len())
                .saturating_add(1)
        })
    }
}
