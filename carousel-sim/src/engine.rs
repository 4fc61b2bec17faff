//! Time-stepped Round-Robin simulation.
//!
//! The engine runs a whole simulation eagerly and returns its [`Trace`].
//! Each iteration of the main loop:
//!
//! 1. admits every backlogged process whose arrival is `<= time`,
//! 2. jumps `time` straight to the next arrival when the queue is empty,
//! 3. dispatches the current process for `min(quantum, remaining)`,
//! 4. admits arrivals up to the new `time`, before any other decision,
//! 5. removes the process if it completed, otherwise rotates past it,
//! 6. records a [`Step`].
//!
//! Arrivals that fall inside a running slice are admitted at the slice
//! boundary; a slice is never preempted. Simultaneous arrivals are admitted
//! in input order.

use std::collections::HashSet;

use carousel_core::{
    CompletedProcess, DispatchEvent, ProcessRecord, ProcessSpec, RotationQueue, SimulationError,
    SimulationResult,
};
use tracing::instrument;

use crate::config::SimulationConfig;
use crate::summary::RunSummary;
use crate::trace::{IdleGap, RunOutcome, Step, StepKind, Trace};

/// Run a simulation with the default iteration cap.
///
/// # Examples
///
/// ```
/// use carousel_core::ProcessSpec;
/// use carousel_sim::simulate;
///
/// let trace = simulate(&[ProcessSpec::new("P1", 0, 5)], 3).expect("valid input");
/// let spans: Vec<(u64, u64)> = trace.events().iter().map(|e| (e.start, e.end)).collect();
/// assert_eq!(spans, vec![(0, 3), (3, 5)]);
/// ```
pub fn simulate(processes: &[ProcessSpec], quantum: u64) -> SimulationResult<Trace> {
    SimulationEngine::new(SimulationConfig::new(quantum)).run(processes)
}

/// Round-Robin simulation engine.
///
/// The engine holds configuration only; every [`run`](Self::run) builds its
/// own private working state, so one engine can serve concurrent runs.
#[derive(Debug, Clone, Default)]
pub struct SimulationEngine {
    config: SimulationConfig,
}

impl SimulationEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// The engine configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulate `processes` to completion and return every recorded step.
    ///
    /// An empty `processes` slice is not an error: the trace holds a single
    /// step and reports [`RunOutcome::NothingToSimulate`].
    ///
    /// # Errors
    ///
    /// Fails before simulating on a zero quantum, a zero burst, a duplicate
    /// id or an input whose clock could pass `u64::MAX`, and fails with [`SimulationError::IterationLimitExceeded`] if the
    /// configured iteration cap is reached.
    #[instrument(skip_all, fields(quantum = self.config.quantum, processes = processes.len()))]
    pub fn run(&self, processes: &[ProcessSpec]) -> SimulationResult<Trace> {
        self.config.validate()?;
        validate_processes(processes)?;

        let quantum = self.config.quantum;
        if processes.is_empty() {
            tracing::info!("Nothing to simulate");
            return Ok(nothing_to_simulate(quantum));
        }

        let limit = self.config.iteration_limit(processes);
        let mut run = Run::new(processes, quantum);
        run.execute(limit)?;
        let trace = run.finish();

        tracing::info!(
            steps = trace.len(),
            dispatches = trace.events().len(),
            makespan = trace.last_step().time,
            "Simulation completed"
        );
        Ok(trace)
    }
}

fn validate_processes(processes: &[ProcessSpec]) -> SimulationResult<()> {
    let mut seen = HashSet::with_capacity(processes.len());
    let mut total_burst = 0u64;
    for spec in processes {
        if spec.burst == 0 {
            return Err(SimulationError::InvalidBurst {
                id: spec.id.clone(),
            });
        }
        if !seen.insert(&spec.id) {
            return Err(SimulationError::DuplicateProcessId {
                id: spec.id.clone(),
            });
        }
        total_burst = total_burst
            .checked_add(spec.burst)
            .ok_or_else(|| SimulationError::TimeOverflow {
                id: spec.id.clone(),
            })?;
    }

    // The clock never passes the latest arrival plus all the work there is.
    for spec in processes {
        if spec.arrival.checked_add(total_burst).is_none() {
            return Err(SimulationError::TimeOverflow {
                id: spec.id.clone(),
            });
        }
    }
    Ok(())
}

fn nothing_to_simulate(quantum: u64) -> Trace {
    let step = Step {
        index: 0,
        kind: StepKind::Start,
        logs: vec![
            "=== ROUND ROBIN SIMULATION ===".to_string(),
            format!("Quantum: {quantum}"),
            "Nothing to simulate: no processes supplied".to_string(),
        ],
        events: Vec::new(),
        completed: Vec::new(),
        time: 0,
        rotation: Vec::new(),
        idle: None,
        summary: None,
    };
    Trace::new(quantum, 0, RunOutcome::NothingToSimulate, vec![step])
}

/// Where an admission happens relative to the dispatch of an iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    BeforeDispatch,
    DuringExecution,
}

/// Private working state of one run.
struct Run {
    quantum: u64,
    time: u64,
    /// Process arena, indexed by input position.
    records: Vec<ProcessRecord>,
    /// Arena indices sorted by arrival, ties in input order.
    backlog: Vec<usize>,
    arrival_index: usize,
    queue: RotationQueue<usize>,
    events: Vec<DispatchEvent>,
    completed: Vec<CompletedProcess>,
    /// Log lines not yet attached to a step.
    logs: Vec<String>,
    pending_idle: Option<IdleGap>,
    steps: Vec<Step>,
}

impl Run {
    fn new(processes: &[ProcessSpec], quantum: u64) -> Self {
        let records: Vec<ProcessRecord> = processes.iter().map(ProcessRecord::new).collect();
        let mut backlog: Vec<usize> = (0..records.len()).collect();
        // Stable: equal arrivals keep input order.
        backlog.sort_by_key(|&slot| records[slot].arrival());

        let mut run = Self {
            quantum,
            time: 0,
            records,
            backlog,
            arrival_index: 0,
            queue: RotationQueue::new(),
            events: Vec::new(),
            completed: Vec::new(),
            logs: Vec::new(),
            pending_idle: None,
            steps: Vec::new(),
        };

        run.log("=== ROUND ROBIN SIMULATION ===");
        run.log(format!("Quantum: {quantum}"));
        run.log(format!("Processes: {}", run.records.len()));
        run.log("Rotation order kept in a circular doubly-linked queue");
        run.log("");
        run.record_step(StepKind::Start);
        run
    }

    fn log(&mut self, line: impl Into<String>) {
        self.logs.push(line.into());
    }

    fn has_work(&self) -> bool {
        self.arrival_index < self.backlog.len() || !self.queue.is_empty()
    }

    fn next_arrival(&self) -> Option<u64> {
        self.backlog
            .get(self.arrival_index)
            .map(|&slot| self.records[slot].arrival())
    }

    fn execute(&mut self, limit: usize) -> SimulationResult<()> {
        let mut iterations = 0usize;

        while self.has_work() {
            if iterations == limit {
                tracing::warn!(limit, time = self.time, "Iteration limit reached");
                return Err(SimulationError::IterationLimitExceeded { limit });
            }
            iterations += 1;

            self.admit(Admission::BeforeDispatch);

            if self.queue.is_empty() {
                if let Some(next) = self.next_arrival() {
                    self.idle_until(next);
                }
                continue;
            }

            self.dispatch_current();
            self.record_step(StepKind::Dispatch);
        }

        Ok(())
    }

    fn admit(&mut self, admission: Admission) {
        while let Some(&slot) = self.backlog.get(self.arrival_index) {
            if self.records[slot].arrival() > self.time {
                break;
            }
            self.arrival_index += 1;
            self.queue.add(slot);

            let id = self.records[slot].id().clone();
            tracing::debug!(process = %id, time = self.time, ?admission, "Admitted");
            match admission {
                Admission::BeforeDispatch => {
                    self.log(format!(
                        "t={}: {id} arrives in the rotation queue",
                        self.time
                    ));
                    self.log(format!("   node linked at position {}", self.queue.len()));
                }
                Admission::DuringExecution => {
                    self.log(format!("t={}: {id} arrives during execution", self.time));
                    self.log("   linked at the tail of the rotation queue");
                }
            }
        }
    }

    fn idle_until(&mut self, next: u64) {
        tracing::debug!(from = self.time, to = next, "CPU idle");
        self.log("CPU idle: rotation queue empty");
        self.log(format!("   advancing time from {} to {next}", self.time));
        self.pending_idle = Some(IdleGap {
            from: self.time,
            to: next,
        });
        self.time = next;
    }

    fn dispatch_current(&mut self) {
        let slot = *self
            .queue
            .peek_current()
            .expect("rotation queue checked non-empty before dispatch");

        let record = &mut self.records[slot];
        let first_response = record.start_time().is_none();
        let event = record.dispatch(self.time, self.quantum);
        let id = event.process.clone();

        tracing::debug!(
            process = %id,
            start = event.start,
            end = event.end,
            remaining = event.remaining_after,
            "Dispatched"
        );

        self.log(format!("t={}: {id} enters the CPU", event.start));
        if first_response {
            self.log(format!("   first response of {id}"));
        }
        self.log(format!("   current node: {id}"));
        self.log(format!("   remaining before: {}", event.remaining_before));
        self.log(format!("   slice: {}", event.duration()));
        self.log(format!("t={}: {id} leaves the CPU", event.end));
        self.log(format!("   remaining after: {}", event.remaining_after));

        self.time = event.end;
        self.events.push(event);

        self.admit(Admission::DuringExecution);

        match self.records[slot].snapshot() {
            Some(done) => {
                self.queue.remove_current();
                tracing::debug!(
                    process = %done.id,
                    finish = done.finish,
                    turnaround = done.turnaround,
                    waiting = done.waiting,
                    "Completed"
                );
                self.log(format!("{} COMPLETED", done.id));
                self.log("   node removed from the rotation queue");
                self.log(format!("   finish = {}", done.finish));
                self.log(format!(
                    "   turnaround = {} (finish - arrival = {} - {})",
                    done.turnaround, done.finish, done.arrival
                ));
                self.log(format!(
                    "   waiting = {} (turnaround - burst = {} - {})",
                    done.waiting, done.turnaround, done.burst
                ));
                self.completed.push(done);
            }
            None => {
                self.queue.advance();
                self.log(format!("{id} stays in the rotation queue"));
                self.log("   pointer moved to the next node");
            }
        }
    }

    /// Completions so far, ordered by id.
    fn completed_snapshot(&self) -> Vec<CompletedProcess> {
        let mut rows = self.completed.clone();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        rows
    }

    fn record_step(&mut self, kind: StepKind) {
        let rotation: Vec<_> = self
            .queue
            .iter()
            .map(|&slot| self.records[slot].id().clone())
            .collect();

        if kind == StepKind::Dispatch {
            let listed: Vec<&str> = rotation.iter().map(|id| id.as_str()).collect();
            self.log(format!("Rotation queue: [{}]", listed.join(", ")));
            self.log(format!("   size: {} nodes", self.queue.len()));
            self.log("");
        }

        let step = Step {
            index: self.steps.len(),
            kind,
            logs: std::mem::take(&mut self.logs),
            events: self.events.clone(),
            completed: self.completed_snapshot(),
            time: self.time,
            rotation,
            idle: self.pending_idle.take(),
            summary: None,
        };
        self.steps.push(step);
    }

    fn finish(mut self) -> Trace {
        let summary = RunSummary::new(&self.completed, self.events.len(), self.time);

        self.log("=== FINAL SUMMARY ===");
        self.log("Every node processed and removed from the rotation queue");
        self.log("");
        let rendered = summary.to_string();
        for line in rendered.lines() {
            self.log(line);
        }

        let step = Step {
            index: self.steps.len(),
            kind: StepKind::Summary,
            logs: std::mem::take(&mut self.logs),
            events: self.events.clone(),
            completed: self.completed_snapshot(),
            time: self.time,
            rotation: Vec::new(),
            idle: self.pending_idle.take(),
            summary: Some(summary),
        };
        self.steps.push(step);

        Trace::new(
            self.quantum,
            self.records.len(),
            RunOutcome::Completed,
            self.steps,
        )
    }
}
