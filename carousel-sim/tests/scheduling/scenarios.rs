use carousel_sim::{
    check_trace, simulate, DispatchEvent, IdleGap, ProcessId, ProcessSpec, StepKind, Trace,
};

fn event(process: &str, start: u64, end: u64, before: u64, after: u64) -> DispatchEvent {
    DispatchEvent {
        process: ProcessId::from(process),
        start,
        end,
        remaining_before: before,
        remaining_after: after,
    }
}

/// `(id, finish, turnaround, waiting)` for each completion, in id order.
fn completions(trace: &Trace) -> Vec<(&str, u64, u64, u64)> {
    trace
        .completed()
        .iter()
        .map(|c| (c.id.as_str(), c.finish, c.turnaround, c.waiting))
        .collect()
}

fn run(input: &[ProcessSpec], quantum: u64) -> Trace {
    let trace = simulate(input, quantum).expect("valid input");
    check_trace(&trace, input).expect("invariants hold");
    trace
}

#[test]
fn test_single_process() {
    let trace = run(&[ProcessSpec::new("P1", 0, 5)], 3);

    assert_eq!(
        trace.events(),
        &[event("P1", 0, 3, 5, 2), event("P1", 3, 5, 2, 0)]
    );
    assert_eq!(completions(&trace), vec![("P1", 5, 5, 0)]);
}

#[test]
fn test_equal_arrivals_rotate_in_input_order() {
    let trace = run(
        &[ProcessSpec::new("P1", 0, 4), ProcessSpec::new("P2", 0, 3)],
        2,
    );

    assert_eq!(
        trace.events(),
        &[
            event("P1", 0, 2, 4, 2),
            event("P2", 2, 4, 3, 1),
            event("P1", 4, 6, 2, 0),
            event("P2", 6, 7, 1, 0),
        ]
    );
    assert_eq!(
        completions(&trace),
        vec![("P1", 6, 6, 2), ("P2", 7, 7, 4)]
    );

    let first = trace.step(1).expect("first dispatch step");
    let rotation: Vec<&str> = first.rotation.iter().map(ProcessId::as_str).collect();
    assert_eq!(rotation, vec!["P2", "P1"]);
}

#[test]
fn test_arrival_during_slice_waits_for_boundary() {
    let trace = run(
        &[ProcessSpec::new("P1", 0, 6), ProcessSpec::new("P2", 2, 2)],
        4,
    );

    assert_eq!(
        trace.events(),
        &[
            event("P1", 0, 4, 6, 2),
            event("P2", 4, 6, 2, 0),
            event("P1", 6, 8, 2, 0),
        ]
    );
    assert_eq!(
        completions(&trace),
        vec![("P1", 8, 8, 2), ("P2", 6, 4, 2)]
    );

    // P2 was admitted after P1's slice, then P1 rotated behind it.
    let first = trace.step(1).expect("first dispatch step");
    assert_eq!(
        first.rotation,
        vec![ProcessId::from("P2"), ProcessId::from("P1")]
    );
    assert!(first
        .logs
        .iter()
        .any(|line| line == "t=4: P2 arrives during execution"));
}

#[test]
fn test_idle_gap_jumps_to_next_arrival() {
    let trace = run(
        &[ProcessSpec::new("P1", 0, 2), ProcessSpec::new("P2", 5, 2)],
        2,
    );

    assert_eq!(
        trace.events(),
        &[event("P1", 0, 2, 2, 0), event("P2", 5, 7, 2, 0)]
    );
    assert_eq!(
        completions(&trace),
        vec![("P1", 2, 2, 0), ("P2", 7, 2, 0)]
    );

    let dispatches: Vec<_> = trace
        .iter()
        .filter(|step| step.kind == StepKind::Dispatch)
        .collect();
    assert_eq!(dispatches.len(), 2);
    assert_eq!(dispatches[0].idle, None);
    assert_eq!(dispatches[1].idle, Some(IdleGap { from: 2, to: 5 }));
}

#[test]
fn test_summary_rows_in_natural_id_order() {
    let input: Vec<ProcessSpec> = (1..=11)
        .rev()
        .map(|n| ProcessSpec::new(ProcessId::sequential(n), 0, 1))
        .collect();
    let trace = run(&input, 1);

    // P11 runs first (input order) but completions list P1 first and P11 last.
    assert_eq!(trace.events()[0].process.as_str(), "P11");
    assert_eq!(trace.completed()[0].id.as_str(), "P1");
    let summary = trace.summary().expect("completed run");
    let ids: Vec<&str> = summary.rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids.first(), Some(&"P1"));
    assert_eq!(ids.get(1), Some(&"P2"));
    assert_eq!(ids.last(), Some(&"P11"));
}

#[test]
fn test_trace_json_round_trip() {
    let trace = run(
        &[ProcessSpec::new("P1", 0, 6), ProcessSpec::new("P2", 2, 2)],
        4,
    );

    let json = trace.to_json().expect("serializable");
    let parsed = Trace::from_json(&json).expect("parsable");
    assert_eq!(parsed, trace);

    let broken = json.replacen("\"steps\":[", "\"steps\":[],\"ignored\":[", 1);
    assert!(Trace::from_json(&broken).is_err());
}
