//! Per-process run-time state and the value snapshots derived from it.

use serde::{Deserialize, Serialize};

use crate::{ProcessId, ProcessSpec};

/// One contiguous interval during which a single process occupied the CPU.
///
/// Enough on its own to draw one bar of a timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchEvent {
    /// The process that ran.
    pub process: ProcessId,
    /// Simulated time the slice started.
    pub start: u64,
    /// Simulated time the slice ended.
    pub end: u64,
    /// Remaining burst before the slice.
    pub remaining_before: u64,
    /// Remaining burst after the slice.
    pub remaining_after: u64,
}

impl DispatchEvent {
    /// Length of the slice in time units.
    pub fn duration(&self) -> u64 {
        self.end - self.start
    }

    /// Whether this slice drove the process to completion.
    pub fn completes(&self) -> bool {
        self.remaining_after == 0
    }
}

/// Immutable snapshot of a terminal process, one row of a results table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedProcess {
    /// The process.
    pub id: ProcessId,
    /// Arrival time.
    pub arrival: u64,
    /// Original burst.
    pub burst: u64,
    /// Time of first dispatch.
    pub start: u64,
    /// Time the remaining burst reached zero.
    pub finish: u64,
    /// `finish - arrival`.
    pub turnaround: u64,
    /// `turnaround - burst`.
    pub waiting: u64,
}

impl CompletedProcess {
    /// Time between arrival and first dispatch.
    pub fn response(&self) -> u64 {
        self.start - self.arrival
    }
}

/// Metrics fixed at the instant a process completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Completion {
    finish: u64,
    turnaround: u64,
    waiting: u64,
}

/// Identity plus mutable run-time state of one process.
///
/// Only [`dispatch`](Self::dispatch) mutates a record, and it refuses to run
/// a completed one, so the completion metrics are written exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    id: ProcessId,
    arrival: u64,
    burst: u64,
    remaining: u64,
    start_time: Option<u64>,
    completion: Option<Completion>,
}

impl ProcessRecord {
    /// Fresh record for a caller-supplied definition.
    pub fn new(spec: &ProcessSpec) -> Self {
        Self {
            id: spec.id.clone(),
            arrival: spec.arrival,
            burst: spec.burst,
            remaining: spec.burst,
            start_time: None,
            completion: None,
        }
    }

    /// The process identifier.
    pub fn id(&self) -> &ProcessId {
        &self.id
    }

    /// Arrival time.
    pub fn arrival(&self) -> u64 {
        self.arrival
    }

    /// Original burst, unaffected by dispatching.
    pub fn burst(&self) -> u64 {
        self.burst
    }

    /// CPU time still required.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Time of first dispatch, if the process has run at all.
    pub fn start_time(&self) -> Option<u64> {
        self.start_time
    }

    /// Finish time, once complete.
    pub fn finish_time(&self) -> Option<u64> {
        self.completion.map(|c| c.finish)
    }

    /// Turnaround time, once complete.
    pub fn turnaround(&self) -> Option<u64> {
        self.completion.map(|c| c.turnaround)
    }

    /// Waiting time, once complete.
    pub fn waiting(&self) -> Option<u64> {
        self.completion.map(|c| c.waiting)
    }

    /// Returns `true` once the remaining burst has reached zero.
    pub fn is_complete(&self) -> bool {
        self.completion.is_some()
    }

    /// Run the process at `now` for at most `quantum` time units.
    ///
    /// Records the first-response time, decrements the remaining burst and,
    /// when it reaches zero, fixes finish, turnaround and waiting times.
    ///
    /// # Panics
    ///
    /// Panics if the process already completed or `quantum` is zero.
    pub fn dispatch(&mut self, now: u64, quantum: u64) -> DispatchEvent {
        assert!(
            !self.is_complete(),
            "process {} dispatched after completion",
            self.id
        );
        assert!(quantum > 0, "process {} dispatched with zero quantum", self.id);

        self.start_time.get_or_insert(now);

        let slice = quantum.min(self.remaining);
        let remaining_before = self.remaining;
        self.remaining -= slice;
        let end = now + slice;

        if self.remaining == 0 {
            let turnaround = end - self.arrival;
            self.completion = Some(Completion {
                finish: end,
                turnaround,
                waiting: turnaround - self.burst,
            });
        }

        DispatchEvent {
            process: self.id.clone(),
            start: now,
            end,
            remaining_before,
            remaining_after: self.remaining,
        }
    }

    /// Value snapshot for reporting; `None` until the process completes.
    pub fn snapshot(&self) -> Option<CompletedProcess> {
        let completion = self.completion?;
        Some(CompletedProcess {
            id: self.id.clone(),
            arrival: self.arrival,
            burst: self.burst,
            start: self.start_time.unwrap_or(self.arrival),
            finish: completion.finish,
            turnaround: completion.turnaround,
            waiting: completion.waiting,
        })
    }
}
