use thiserror::Error;

use crate::ProcessId;

/// Errors that can occur before or during a simulation run.
///
/// An empty process list is deliberately absent: it produces a trivial run,
/// not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// The quantum must be at least one time unit.
    #[error("invalid quantum: {quantum} (must be positive)")]
    InvalidQuantum {
        /// The rejected quantum.
        quantum: u64,
    },

    /// A process was supplied with a zero burst.
    #[error("invalid burst for process {id}: must be positive")]
    InvalidBurst {
        /// The offending process.
        id: ProcessId,
    },

    /// Two processes share the same identifier.
    #[error("duplicate process id: {id}")]
    DuplicateProcessId {
        /// The repeated identifier.
        id: ProcessId,
    },

    /// The clock would pass `u64::MAX` before the process could finish.
    #[error("time overflow: process {id} cannot finish before u64::MAX")]
    TimeOverflow {
        /// The process whose arrival or burst pushes the clock out of range.
        id: ProcessId,
    },

    /// The engine hit its iteration cap before every process completed.
    #[error("iteration limit exceeded: {limit}")]
    IterationLimitExceeded {
        /// The cap that was reached.
        limit: usize,
    },
}

/// A type alias for `Result<T, SimulationError>`.
pub type SimulationResult<T> = Result<T, SimulationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SimulationError::InvalidQuantum { quantum: 0 };
        assert_eq!(err.to_string(), "invalid quantum: 0 (must be positive)");

        let err = SimulationError::InvalidBurst {
            id: ProcessId::from("P3"),
        };
        assert_eq!(err.to_string(), "invalid burst for process P3: must be positive");

        let err = SimulationError::TimeOverflow {
            id: ProcessId::from("P1"),
        };
        assert_eq!(
            err.to_string(),
            "time overflow: process P1 cannot finish before u64::MAX"
        );

        let err = SimulationError::IterationLimitExceeded { limit: 12 };
        assert_eq!(err.to_string(), "iteration limit exceeded: 12");
    }
}
