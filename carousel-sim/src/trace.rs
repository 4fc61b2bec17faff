//! Step snapshots and the trace of a whole run.
//!
//! A [`Trace`] is computed eagerly by the engine and never changes afterwards.
//! Each [`Step`] owns independent copies of everything it shows, so consumers
//! can hold on to earlier steps while replaying later ones.

use carousel_core::{CompletedProcess, DispatchEvent, ProcessId};
use serde::{Deserialize, Serialize};

use crate::replay::Replay;
use crate::summary::RunSummary;

/// What kind of decision point a step captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    /// Initial state before any admission.
    Start,
    /// One dispatch of the current process, with its admissions and outcome.
    Dispatch,
    /// Final results table.
    Summary,
}

/// A jump of simulated time over a period with an empty rotation queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdleGap {
    /// Time at which the CPU went idle.
    pub from: u64,
    /// Arrival time the engine jumped to.
    pub to: u64,
}

/// Immutable snapshot of one decision point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Position in the trace.
    pub index: usize,
    /// Decision point captured.
    pub kind: StepKind,
    /// Descriptive log lines produced during this step.
    pub logs: Vec<String>,
    /// Every dispatch event so far.
    pub events: Vec<DispatchEvent>,
    /// Every completed process so far, ordered by id.
    pub completed: Vec<CompletedProcess>,
    /// Simulated time at the end of the step.
    pub time: u64,
    /// Rotation order starting at the process dispatched next.
    pub rotation: Vec<ProcessId>,
    /// Idle jump that preceded this step's dispatch, if any.
    pub idle: Option<IdleGap>,
    /// Results table, present on the summary step only.
    pub summary: Option<RunSummary>,
}

impl Step {
    /// The dispatch this step added, if any.
    pub fn latest_event(&self) -> Option<&DispatchEvent> {
        match self.kind {
            StepKind::Dispatch => self.events.last(),
            StepKind::Start | StepKind::Summary => None,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Every supplied process ran to completion.
    Completed,
    /// No process was supplied; the trace holds a single trivial step.
    NothingToSimulate,
}

/// The ordered steps of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TraceRepr")]
pub struct Trace {
    quantum: u64,
    process_count: usize,
    outcome: RunOutcome,
    steps: Vec<Step>,
}

/// Unchecked wire form of a [`Trace`].
#[derive(Deserialize)]
struct TraceRepr {
    quantum: u64,
    process_count: usize,
    outcome: RunOutcome,
    steps: Vec<Step>,
}

impl TryFrom<TraceRepr> for Trace {
    type Error = &'static str;

    fn try_from(repr: TraceRepr) -> Result<Self, Self::Error> {
        if repr.steps.is_empty() {
            return Err("trace has no steps");
        }
        Ok(Self {
            quantum: repr.quantum,
            process_count: repr.process_count,
            outcome: repr.outcome,
            steps: repr.steps,
        })
    }
}

impl Trace {
    pub(crate) fn new(
        quantum: u64,
        process_count: usize,
        outcome: RunOutcome,
        steps: Vec<Step>,
    ) -> Self {
        debug_assert!(!steps.is_empty(), "a trace always has a first step");
        Self {
            quantum,
            process_count,
            outcome,
            steps,
        }
    }

    /// Quantum the run used.
    pub fn quantum(&self) -> u64 {
        self.quantum
    }

    /// Number of processes supplied to the run.
    pub fn process_count(&self) -> usize {
        self.process_count
    }

    /// How the run ended.
    pub fn outcome(&self) -> RunOutcome {
        self.outcome
    }

    /// Returns `true` when there was nothing to simulate.
    pub fn is_trivial(&self) -> bool {
        self.outcome == RunOutcome::NothingToSimulate
    }

    /// All steps in order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Step at `index`.
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Number of steps. Never zero.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always `false`: even an empty run records one step.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The last step.
    pub fn last_step(&self) -> &Step {
        // Construction and deserialization both reject an empty step list.
        &self.steps[self.steps.len() - 1]
    }

    /// Every dispatch event of the run.
    pub fn events(&self) -> &[DispatchEvent] {
        &self.last_step().events
    }

    /// Every completed process, ordered by id.
    pub fn completed(&self) -> &[CompletedProcess] {
        &self.last_step().completed
    }

    /// Final results, absent when there was nothing to simulate.
    pub fn summary(&self) -> Option<&RunSummary> {
        self.last_step().summary.as_ref()
    }

    /// Iterate the steps in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    /// Cursor positioned on the first step.
    pub fn replay(&self) -> Replay<'_> {
        Replay::new(self)
    }

    /// Serialize the whole trace as JSON for an external presentation layer.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse a trace previously produced by [`Trace::to_json`].
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
