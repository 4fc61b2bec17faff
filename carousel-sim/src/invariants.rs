//! Whole-trace invariant checks.
//!
//! The checks are independent of the engine: they only look at the input and
//! the produced [`Trace`], so they can validate traces read back from JSON as
//! well as fresh runs.

use std::collections::{HashMap, HashSet};

use carousel_core::{DispatchEvent, ProcessId, ProcessSpec};
use thiserror::Error;

use crate::summary::{mean, RunSummary};
use crate::trace::{RunOutcome, StepKind, Trace};

/// A broken invariant, with enough context to locate it in the trace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// The outcome does not match whether input was supplied.
    #[error("outcome {outcome:?} does not match {processes} input processes")]
    OutcomeMismatch {
        /// Reported outcome.
        outcome: RunOutcome,
        /// Number of input processes.
        processes: usize,
    },

    /// A step's index does not match its position.
    #[error("step at position {position} has index {index}")]
    StepIndex {
        /// Position in the trace.
        position: usize,
        /// Index recorded in the step.
        index: usize,
    },

    /// A step kind appears where it should not.
    #[error("unexpected {kind:?} step at position {position}")]
    StepKindOrder {
        /// Position in the trace.
        position: usize,
        /// Offending kind.
        kind: StepKind,
    },

    /// Simulated time decreased between steps.
    #[error("time went backwards at step {step}: {previous} -> {time}")]
    TimeWentBackwards {
        /// Offending step.
        step: usize,
        /// Time of the previous step.
        previous: u64,
        /// Time of this step.
        time: u64,
    },

    /// A step does not extend the previous step's events by exactly one dispatch.
    #[error("events of step {step} do not extend the previous step")]
    EventsNotAppendOnly {
        /// Offending step.
        step: usize,
    },

    /// A step rewrote or dropped earlier completions, or lists them out of id order.
    #[error("completed list of step {step} is unordered or loses earlier completions")]
    CompletedNotMonotonic {
        /// Offending step.
        step: usize,
    },

    /// A process appears twice in one rotation snapshot.
    #[error("{process} appears twice in the rotation of step {step}")]
    DuplicateInRotation {
        /// Offending step.
        step: usize,
        /// Duplicated process.
        process: ProcessId,
    },

    /// A process that was not supplied shows up in the trace.
    #[error("unknown process {process}")]
    UnknownProcess {
        /// Unknown id.
        process: ProcessId,
    },

    /// Two dispatches overlap in time.
    #[error("dispatch {index} starts at {start} before the previous one ends at {previous_end}")]
    OverlappingEvents {
        /// Offending event index.
        index: usize,
        /// Its start time.
        start: u64,
        /// End of the previous event.
        previous_end: u64,
    },

    /// The CPU idled between dispatches without an idle gap being recorded.
    #[error("unrecorded idle time before dispatch {index}: {from} -> {to}")]
    UnrecordedIdle {
        /// Offending event index.
        index: usize,
        /// End of the previous event.
        from: u64,
        /// Start of this event.
        to: u64,
    },

    /// A process ran before it arrived.
    #[error("{process} dispatched at {start} before arriving at {arrival}")]
    StartBeforeArrival {
        /// Offending process.
        process: ProcessId,
        /// Dispatch start.
        start: u64,
        /// Arrival time.
        arrival: u64,
    },

    /// A slice length does not equal `min(quantum, remaining)`.
    #[error("dispatch {index} of {process} ran {duration} with {remaining} remaining (quantum {quantum})")]
    BadSlice {
        /// Offending event index.
        index: usize,
        /// Dispatched process.
        process: ProcessId,
        /// Slice length.
        duration: u64,
        /// Remaining work before the slice.
        remaining: u64,
        /// Quantum of the run.
        quantum: u64,
    },

    /// Remaining work bookkeeping does not add up.
    #[error("dispatch {index} of {process} has inconsistent remaining work")]
    RemainingMismatch {
        /// Offending event index.
        index: usize,
        /// Dispatched process.
        process: ProcessId,
    },

    /// Dispatched time for a process differs from its burst.
    #[error("{process} ran for {dispatched} but has burst {burst}")]
    BurstNotConserved {
        /// Offending process.
        process: ProcessId,
        /// Burst from the input.
        burst: u64,
        /// Sum of its slice lengths.
        dispatched: u64,
    },

    /// A process did not complete exactly once.
    #[error("{process} completed {count} times")]
    CompletionCount {
        /// Offending process.
        process: ProcessId,
        /// Number of completion rows.
        count: usize,
    },

    /// A completion row disagrees with the input or with the formulas.
    #[error("{process}: {metric} is {found}, expected {expected}")]
    MetricMismatch {
        /// Offending process.
        process: ProcessId,
        /// Which field.
        metric: &'static str,
        /// Value derived from input and events.
        expected: u64,
        /// Value in the trace.
        found: u64,
    },

    /// The summary disagrees with the last step.
    #[error("summary inconsistent: {reason}")]
    SummaryMismatch {
        /// What differs.
        reason: String,
    },

    /// Replaying the trace gave different results for the same position.
    #[error("replay diverged at step {index}")]
    ReplayDiverged {
        /// Offending step.
        index: usize,
    },
}

/// Verify every structural and arithmetic invariant of `trace` against `input`.
pub fn check_trace(trace: &Trace, input: &[ProcessSpec]) -> Result<(), InvariantViolation> {
    check_outcome(trace, input)?;
    check_steps(trace)?;

    let specs: HashMap<&ProcessId, &ProcessSpec> = input.iter().map(|p| (&p.id, p)).collect();
    check_events(trace, &specs)?;
    check_completions(trace, input, &specs)?;
    check_summary(trace)
}

/// Verify that moving a replay cursor never changes what a position shows.
pub fn check_replay(trace: &Trace) -> Result<(), InvariantViolation> {
    let mut forward = trace.replay();
    let mut visited = vec![forward.current_step()];
    let mut progress = vec![forward.progress()];
    while forward.advance() {
        visited.push(forward.current_step());
        progress.push(forward.progress());
    }

    if visited.len() != trace.len() {
        return Err(InvariantViolation::ReplayDiverged {
            index: visited.len(),
        });
    }

    // Seek backwards then forwards; every position must show the same step.
    let mut cursor = trace.replay();
    let order = (0..trace.len()).rev().chain(0..trace.len());
    for index in order {
        let step = cursor.seek(index);
        if !std::ptr::eq(step, visited[index])
            || step.index != index
            || cursor.progress() != progress[index]
        {
            return Err(InvariantViolation::ReplayDiverged { index });
        }
    }

    cursor.reset();
    if cursor.current_index() != 0 || cursor.progress() != progress[0] {
        return Err(InvariantViolation::ReplayDiverged { index: 0 });
    }
    Ok(())
}

fn check_outcome(trace: &Trace, input: &[ProcessSpec]) -> Result<(), InvariantViolation> {
    let expected = if input.is_empty() {
        RunOutcome::NothingToSimulate
    } else {
        RunOutcome::Completed
    };
    if trace.outcome() != expected || trace.process_count() != input.len() {
        return Err(InvariantViolation::OutcomeMismatch {
            outcome: trace.outcome(),
            processes: input.len(),
        });
    }
    Ok(())
}

fn check_steps(trace: &Trace) -> Result<(), InvariantViolation> {
    let last = trace.len() - 1;

    for (position, step) in trace.iter().enumerate() {
        if step.index != position {
            return Err(InvariantViolation::StepIndex {
                position,
                index: step.index,
            });
        }

        let kind_ok = match step.kind {
            StepKind::Start => position == 0,
            StepKind::Dispatch => position > 0 && position < last,
            StepKind::Summary => position == last && position > 0,
        };
        if !kind_ok {
            return Err(InvariantViolation::StepKindOrder {
                position,
                kind: step.kind,
            });
        }

        let mut seen = HashSet::with_capacity(step.rotation.len());
        for id in &step.rotation {
            if !seen.insert(id) {
                return Err(InvariantViolation::DuplicateInRotation {
                    step: position,
                    process: id.clone(),
                });
            }
        }

        if position == 0 {
            continue;
        }
        let previous = &trace.steps()[position - 1];

        if step.time < previous.time {
            return Err(InvariantViolation::TimeWentBackwards {
                step: position,
                previous: previous.time,
                time: step.time,
            });
        }

        let added = match step.kind {
            StepKind::Dispatch => 1,
            StepKind::Start | StepKind::Summary => 0,
        };
        if step.events.len() != previous.events.len() + added
            || !step.events.starts_with(&previous.events)
        {
            return Err(InvariantViolation::EventsNotAppendOnly { step: position });
        }
        let ordered = step.completed.windows(2).all(|w| w[0].id < w[1].id);
        let kept = previous
            .completed
            .iter()
            .all(|row| step.completed.contains(row));
        if !ordered || !kept || step.completed.len() < previous.completed.len() {
            return Err(InvariantViolation::CompletedNotMonotonic { step: position });
        }
    }
    Ok(())
}

fn check_events(
    trace: &Trace,
    specs: &HashMap<&ProcessId, &ProcessSpec>,
) -> Result<(), InvariantViolation> {
    let quantum = trace.quantum();
    let mut remaining: HashMap<&ProcessId, u64> =
        specs.iter().map(|(&id, spec)| (id, spec.burst)).collect();
    let mut previous: Option<&DispatchEvent> = None;

    for (index, event) in trace.events().iter().enumerate() {
        let spec = specs
            .get(&event.process)
            .ok_or_else(|| InvariantViolation::UnknownProcess {
                process: event.process.clone(),
            })?;

        if event.start < spec.arrival {
            return Err(InvariantViolation::StartBeforeArrival {
                process: event.process.clone(),
                start: event.start,
                arrival: spec.arrival,
            });
        }

        if let Some(prev) = previous {
            if event.start < prev.end {
                return Err(InvariantViolation::OverlappingEvents {
                    index,
                    start: event.start,
                    previous_end: prev.end,
                });
            }
            // The step that holds this event (index + 1, after Start) records the idle jump.
            let idle = trace.step(index + 1).and_then(|step| step.idle);
            let gap_recorded = idle.is_some_and(|gap| gap.from == prev.end && gap.to == event.start);
            if event.start > prev.end && !gap_recorded {
                return Err(InvariantViolation::UnrecordedIdle {
                    index,
                    from: prev.end,
                    to: event.start,
                });
            }
        }

        let left = remaining.get_mut(&event.process).ok_or_else(|| {
            InvariantViolation::UnknownProcess {
                process: event.process.clone(),
            }
        })?;
        if event.remaining_before != *left
            || event.end < event.start
            || event.remaining_after + event.duration() != event.remaining_before
        {
            return Err(InvariantViolation::RemainingMismatch {
                index,
                process: event.process.clone(),
            });
        }
        if event.duration() != quantum.min(event.remaining_before) {
            return Err(InvariantViolation::BadSlice {
                index,
                process: event.process.clone(),
                duration: event.duration(),
                remaining: event.remaining_before,
                quantum,
            });
        }
        *left = event.remaining_after;
        previous = Some(event);
    }

    for (&id, spec) in specs {
        let dispatched: u64 = trace
            .events()
            .iter()
            .filter(|e| &e.process == id)
            .map(DispatchEvent::duration)
            .sum();
        if dispatched != spec.burst {
            return Err(InvariantViolation::BurstNotConserved {
                process: id.clone(),
                burst: spec.burst,
                dispatched,
            });
        }
    }
    Ok(())
}

fn check_completions(
    trace: &Trace,
    input: &[ProcessSpec],
    specs: &HashMap<&ProcessId, &ProcessSpec>,
) -> Result<(), InvariantViolation> {
    let completed = trace.completed();

    for row in completed {
        if !specs.contains_key(&row.id) {
            return Err(InvariantViolation::UnknownProcess {
                process: row.id.clone(),
            });
        }
    }

    for spec in input {
        let rows: Vec<_> = completed.iter().filter(|c| c.id == spec.id).collect();
        let [row] = rows.as_slice() else {
            return Err(InvariantViolation::CompletionCount {
                process: spec.id.clone(),
                count: rows.len(),
            });
        };

        let own: Vec<&DispatchEvent> = trace
            .events()
            .iter()
            .filter(|e| e.process == spec.id)
            .collect();
        let first_start = own.first().map_or(0, |e| e.start);
        let last_end = own.last().map_or(0, |e| e.end);

        let checks = [
            ("arrival", spec.arrival, row.arrival),
            ("burst", spec.burst, row.burst),
            ("start", first_start, row.start),
            ("finish", last_end, row.finish),
            ("turnaround", row.finish.saturating_sub(spec.arrival), row.turnaround),
            ("waiting", row.turnaround.saturating_sub(spec.burst), row.waiting),
        ];
        for (metric, expected, found) in checks {
            if expected != found {
                return Err(InvariantViolation::MetricMismatch {
                    process: spec.id.clone(),
                    metric,
                    expected,
                    found,
                });
            }
        }
    }
    Ok(())
}

fn check_summary(trace: &Trace) -> Result<(), InvariantViolation> {
    let last = trace.last_step();

    let Some(summary) = trace.summary() else {
        if trace.is_trivial() {
            return Ok(());
        }
        return Err(InvariantViolation::SummaryMismatch {
            reason: "completed run has no summary".to_string(),
        });
    };

    let expected = RunSummary::new(&last.completed, last.events.len(), last.time);
    if summary.rows != last.completed {
        return Err(InvariantViolation::SummaryMismatch {
            reason: "rows differ from the completed processes".to_string(),
        });
    }
    if summary.total_dispatches != trace.events().len() {
        return Err(InvariantViolation::SummaryMismatch {
            reason: format!(
                "{} dispatches reported, {} recorded",
                summary.total_dispatches,
                trace.events().len()
            ),
        });
    }
    let last_finish = last.completed.iter().map(|c| c.finish).max().unwrap_or(0);
    if summary.makespan != last_finish || summary.makespan != last.time {
        return Err(InvariantViolation::SummaryMismatch {
            reason: format!("makespan {} vs last finish {last_finish}", summary.makespan),
        });
    }
    let turnaround = mean(summary.rows.iter().map(|r| r.turnaround)).unwrap_or(0.0);
    let waiting = mean(summary.rows.iter().map(|r| r.waiting)).unwrap_or(0.0);
    if summary.average_turnaround != turnaround
        || summary.average_waiting != waiting
        || *summary != expected
    {
        return Err(InvariantViolation::SummaryMismatch {
            reason: "averages differ from the rows".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulate;

    fn input() -> Vec<ProcessSpec> {
        vec![
            ProcessSpec::new("P1", 0, 5),
            ProcessSpec::new("P2", 1, 3),
            ProcessSpec::new("P3", 9, 2),
        ]
    }

    #[test]
    fn test_engine_trace_passes() {
        let input = input();
        let trace = simulate(&input, 2).expect("valid input");

        assert_eq!(check_trace(&trace, &input), Ok(()));
        assert_eq!(check_replay(&trace), Ok(()));
    }

    #[test]
    fn test_trivial_trace_passes() {
        let trace = simulate(&[], 4).expect("empty input");
        assert_eq!(check_trace(&trace, &[]), Ok(()));
        assert_eq!(check_replay(&trace), Ok(()));
    }

    #[test]
    fn test_wrong_input_is_detected() {
        let input = input();
        let trace = simulate(&input, 2).expect("valid input");

        let mut other = input.clone();
        other[1].burst = 4;
        assert!(matches!(
            check_trace(&trace, &other),
            Err(InvariantViolation::RemainingMismatch { .. })
                | Err(InvariantViolation::BurstNotConserved { .. })
        ));

        assert!(matches!(
            check_trace(&trace, &input[..2]),
            Err(InvariantViolation::OutcomeMismatch { .. })
        ));
    }

    #[test]
    fn test_tampered_trace_is_detected() {
        let input = input();
        let trace = simulate(&input, 2).expect("valid input");

        let mut json: serde_json::Value =
            serde_json::from_str(&trace.to_json().expect("serializable")).expect("json");
        let last = json["steps"]
            .as_array()
            .map(|steps| steps.len() - 1)
            .expect("steps array");
        json["steps"][last]["completed"][0]["waiting"] = serde_json::json!(99);
        let tampered: Trace = serde_json::from_value(json).expect("still a trace");

        assert!(check_trace(&tampered, &input).is_err());
    }
}
