//! Final per-process results and averages of a completed run.

use std::fmt;

use carousel_core::CompletedProcess;
use serde::{Deserialize, Serialize};

/// Results table attached to the last step of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// One row per completed process, ordered by id.
    pub rows: Vec<CompletedProcess>,
    /// Mean of `turnaround` over all rows.
    pub average_turnaround: f64,
    /// Mean of `waiting` over all rows.
    pub average_waiting: f64,
    /// Number of dispatch events, i.e. CPU turns handed out.
    pub total_dispatches: usize,
    /// Simulated time at which the last process finished.
    pub makespan: u64,
}

impl RunSummary {
    /// Build the summary from the completed processes of a run.
    pub fn new(completed: &[CompletedProcess], total_dispatches: usize, makespan: u64) -> Self {
        let mut rows = completed.to_vec();
        rows.sort_by(|a, b| a.id.cmp(&b.id));

        Self {
            average_turnaround: mean(rows.iter().map(|p| p.turnaround)).unwrap_or(0.0),
            average_waiting: mean(rows.iter().map(|p| p.waiting)).unwrap_or(0.0),
            rows,
            total_dispatches,
            makespan,
        }
    }
}

/// Arithmetic mean, or `None` for an empty sequence.
pub(crate) fn mean(values: impl Iterator<Item = u64>) -> Option<f64> {
    let (sum, count) = values.fold((0u128, 0u64), |(sum, count), v| {
        (sum + u128::from(v), count + 1)
    });
    if count == 0 {
        None
    } else {
        Some(sum as f64 / count as f64)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Process | Arrival | Burst | Finish | Turnaround | Waiting")?;
        writeln!(f, "--------|---------|-------|--------|------------|--------")?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<7} | {:>7} | {:>5} | {:>6} | {:>10} | {:>7}",
                row.id.as_str(),
                row.arrival,
                row.burst,
                row.finish,
                row.turnaround,
                row.waiting
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Average turnaround: {:.2}", self.average_turnaround)?;
        writeln!(f, "Average waiting: {:.2}", self.average_waiting)?;
        write!(f, "Dispatches: {}", self.total_dispatches)
    }
}
