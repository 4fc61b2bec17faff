//! Index cursor for stepping through a computed trace.

use crate::summary::mean;
use crate::trace::{Step, Trace};

/// Partial statistics as of the step a [`Replay`] is positioned on.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayProgress {
    /// Processes completed so far.
    pub completed: usize,
    /// Processes supplied to the run.
    pub total: usize,
    /// Mean turnaround of the completed processes.
    pub average_turnaround: Option<f64>,
    /// Mean waiting time of the completed processes.
    pub average_waiting: Option<f64>,
    /// Latest finish time among the completed processes.
    pub latest_finish: Option<u64>,
}

/// Cursor over the steps of a [`Trace`].
///
/// Moving the cursor never recomputes anything; it only selects which
/// precomputed step is current.
///
/// # Examples
///
/// ```
/// use carousel_core::ProcessSpec;
/// use carousel_sim::simulate;
///
/// let trace = simulate(&[ProcessSpec::new("P1", 0, 5)], 3).expect("valid input");
/// let mut replay = trace.replay();
///
/// assert_eq!(replay.current_index(), 0);
/// while replay.advance() {}
/// assert!(replay.is_at_end());
/// assert!(replay.current_step().summary.is_some());
///
/// // Advancing past the end saturates.
/// assert!(!replay.advance());
/// ```
#[derive(Debug, Clone)]
pub struct Replay<'a> {
    trace: &'a Trace,
    cursor: usize,
}

impl<'a> Replay<'a> {
    /// Cursor positioned on the first step of `trace`.
    pub fn new(trace: &'a Trace) -> Self {
        Self { trace, cursor: 0 }
    }

    /// Index of the current step.
    pub fn current_index(&self) -> usize {
        self.cursor
    }

    /// The current step.
    pub fn current_step(&self) -> &'a Step {
        &self.trace.steps()[self.cursor]
    }

    /// Move to the next step. Returns `false`, without moving, on the last step.
    pub fn advance(&mut self) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Jump to `index`, clamped to the last step.
    pub fn seek(&mut self, index: usize) -> &'a Step {
        self.cursor = index.min(self.trace.len() - 1);
        self.current_step()
    }

    /// Return to the first step.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Returns `true` on the last step.
    pub fn is_at_end(&self) -> bool {
        self.cursor + 1 >= self.trace.len()
    }

    /// Steps left after the current one.
    pub fn remaining(&self) -> usize {
        self.trace.len() - 1 - self.cursor
    }

    /// Statistics over the processes completed as of the current step.
    pub fn progress(&self) -> ReplayProgress {
        let completed = &self.current_step().completed;
        ReplayProgress {
            completed: completed.len(),
            total: self.trace.process_count(),
            average_turnaround: mean(completed.iter().map(|p| p.turnaround)),
            average_waiting: mean(completed.iter().map(|p| p.waiting)),
            latest_finish: completed.iter().map(|p| p.finish).max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use carousel_core::ProcessSpec;

    use crate::simulate;

    fn two_process_trace() -> crate::Trace {
        simulate(
            &[ProcessSpec::new("P1", 0, 4), ProcessSpec::new("P2", 0, 3)],
            2,
        )
        .expect("valid input")
    }

    #[test]
    fn test_advance_saturates() {
        let trace = two_process_trace();
        let mut replay = trace.replay();

        let mut moves = 0;
        while replay.advance() {
            moves += 1;
        }
        assert_eq!(moves, trace.len() - 1);
        assert_eq!(replay.current_index(), trace.len() - 1);
        assert_eq!(replay.remaining(), 0);

        assert!(!replay.advance());
        assert_eq!(replay.current_index(), trace.len() - 1);
    }

    #[test]
    fn test_seek_clamps_and_reset() {
        let trace = two_process_trace();
        let mut replay = trace.replay();

        let last = replay.seek(10_000);
        assert_eq!(last.index, trace.len() - 1);

        replay.reset();
        assert_eq!(replay.current_index(), 0);
        assert_eq!(replay.remaining(), trace.len() - 1);
    }

    #[test]
    fn test_progress_tracks_completions() {
        let trace = two_process_trace();
        let mut replay = trace.replay();

        let start = replay.progress();
        assert_eq!(start.completed, 0);
        assert_eq!(start.total, 2);
        assert_eq!(start.average_turnaround, None);
        assert_eq!(start.latest_finish, None);

        replay.seek(trace.len() - 1);
        let end = replay.progress();
        assert_eq!(end.completed, 2);
        assert_eq!(end.average_turnaround, Some(6.5));
        assert_eq!(end.average_waiting, Some(3.0));
        assert_eq!(end.latest_finish, Some(7));
    }

    #[test]
    fn test_trivial_trace_has_single_position() {
        let trace = simulate(&[], 2).expect("empty input is not an error");
        let mut replay = trace.replay();

        assert!(replay.is_at_end());
        assert!(!replay.advance());
        assert_eq!(replay.progress().total, 0);
    }
}
