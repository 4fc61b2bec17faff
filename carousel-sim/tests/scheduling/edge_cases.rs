use carousel_sim::{
    check_trace, simulate, ProcessId, ProcessSpec, RunOutcome, SimulationConfig,
    SimulationEngine, SimulationError, StepKind,
};

#[test]
fn test_empty_input_produces_single_step() {
    let trace = simulate(&[], 3).expect("empty input is not an error");

    assert_eq!(trace.outcome(), RunOutcome::NothingToSimulate);
    assert_eq!(trace.len(), 1);
    let only = &trace.steps()[0];
    assert_eq!(only.kind, StepKind::Start);
    assert!(only.events.is_empty());
    assert!(only.completed.is_empty());
    assert!(only.logs.iter().any(|line| line.contains("Nothing to simulate")));
    check_trace(&trace, &[]).expect("trivial trace is consistent");
}

#[test]
fn test_zero_quantum_rejected_before_running() {
    let result = simulate(&[ProcessSpec::new("P1", 0, 3)], 0);
    assert_eq!(result, Err(SimulationError::InvalidQuantum { quantum: 0 }));

    // Validation runs even when there is nothing to simulate.
    assert_eq!(
        simulate(&[], 0),
        Err(SimulationError::InvalidQuantum { quantum: 0 })
    );
}

#[test]
fn test_zero_burst_rejected() {
    let result = simulate(
        &[ProcessSpec::new("P1", 0, 3), ProcessSpec::new("P2", 1, 0)],
        2,
    );
    assert_eq!(
        result,
        Err(SimulationError::InvalidBurst {
            id: ProcessId::from("P2")
        })
    );
}

#[test]
fn test_duplicate_id_rejected() {
    let result = simulate(
        &[
            ProcessSpec::new("A", 0, 1),
            ProcessSpec::new("B", 0, 1),
            ProcessSpec::new("A", 3, 1),
        ],
        2,
    );
    assert_eq!(
        result,
        Err(SimulationError::DuplicateProcessId {
            id: ProcessId::from("A")
        })
    );
}

#[test]
fn test_iteration_cap_reports_limit() {
    let engine = SimulationEngine::new(SimulationConfig::new(2).with_max_iterations(4));
    let input = [ProcessSpec::new("P1", 0, 6), ProcessSpec::new("P2", 0, 6)];

    assert_eq!(
        engine.run(&input),
        Err(SimulationError::IterationLimitExceeded { limit: 4 })
    );

    // Six dispatches fit exactly under a cap of six.
    let engine = SimulationEngine::new(SimulationConfig::new(2).with_max_iterations(6));
    let trace = engine.run(&input).expect("cap is large enough");
    assert_eq!(trace.events().len(), 6);
}

#[test]
fn test_quantum_larger_than_every_burst() {
    let input = [
        ProcessSpec::new("P1", 0, 2),
        ProcessSpec::new("P2", 0, 1),
        ProcessSpec::new("P3", 1, 3),
    ];
    let trace = simulate(&input, 100).expect("valid input");
    check_trace(&trace, &input).expect("invariants hold");

    // Each process runs exactly once, first come first served.
    let order: Vec<&str> = trace.events().iter().map(|e| e.process.as_str()).collect();
    assert_eq!(order, vec!["P1", "P2", "P3"]);
    assert!(trace.events().iter().all(|e| e.completes()));
}

#[test]
fn test_arrival_exactly_at_slice_end_joins_ahead_of_rotated_process() {
    // P3 arrives at 2 when P1's slice ends: it is linked before P1 rotates behind it.
    let input = [
        ProcessSpec::new("P1", 0, 4),
        ProcessSpec::new("P2", 0, 4),
        ProcessSpec::new("P3", 2, 1),
    ];
    let trace = simulate(&input, 2).expect("valid input");
    check_trace(&trace, &input).expect("invariants hold");

    let order: Vec<&str> = trace.events().iter().map(|e| e.process.as_str()).collect();
    assert_eq!(order, vec!["P1", "P2", "P3", "P1", "P2"]);
}

#[test]
fn test_late_first_arrival_idles_from_zero() {
    let input = [ProcessSpec::new("P1", 10, 1)];
    let trace = simulate(&input, 1).expect("valid input");

    let dispatch = trace.step(1).expect("dispatch step");
    assert_eq!(dispatch.idle.map(|gap| (gap.from, gap.to)), Some((0, 10)));
    assert_eq!(trace.completed()[0].turnaround, 1);
    assert_eq!(trace.completed()[0].waiting, 0);
}

#[test]
fn test_earlier_steps_unchanged_by_later_ones() {
    let input = [ProcessSpec::new("P1", 0, 5), ProcessSpec::new("P2", 1, 5)];
    let trace = simulate(&input, 2).expect("valid input");

    let early = trace.step(1).expect("first dispatch").clone();
    assert_eq!(early.events.len(), 1);
    assert!(early.completed.is_empty());

    // Later steps extend, never rewrite.
    for step in trace.iter().skip(2) {
        assert!(step.events.starts_with(&early.events));
        assert!(step.events.len() > early.events.len());
    }
    assert_eq!(trace.step(1), Some(&early));
}

#[test]
fn test_concurrent_runs_are_independent() {
    let input: Vec<ProcessSpec> = (0..6)
        .map(|i| ProcessSpec::new(ProcessId::sequential(i + 1), i as u64, 3 + i as u64))
        .collect();
    let expected = simulate(&input, 2).expect("valid input");

    let engine = SimulationEngine::new(SimulationConfig::new(2));
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| engine.run(&input).expect("valid input")))
            .collect();
        for handle in handles {
            let trace = handle.join().expect("thread finished");
            assert_eq!(trace, expected);
        }
    });
}

#[test]
fn test_clock_overflow_rejected_before_running() {
    assert_eq!(
        simulate(&[ProcessSpec::new("P1", u64::MAX - 1, 5)], 3),
        Err(SimulationError::TimeOverflow {
            id: ProcessId::from("P1"),
        })
    );

    // Bursts that only overflow once summed are caught as well.
    assert_eq!(
        simulate(
            &[
                ProcessSpec::new("P1", 0, u64::MAX / 2 + 1),
                ProcessSpec::new("P2", 0, u64::MAX / 2 + 1),
            ],
            4,
        ),
        Err(SimulationError::TimeOverflow {
            id: ProcessId::from("P2"),
        })
    );

    // Finishing exactly at u64::MAX still fits.
    let trace = simulate(&[ProcessSpec::new("P1", u64::MAX - 5, 5)], 2).expect("fits");
    check_trace(&trace, &[ProcessSpec::new("P1", u64::MAX - 5, 5)]).expect("invariants hold");
    assert_eq!(trace.completed()[0].finish, u64::MAX);
}
