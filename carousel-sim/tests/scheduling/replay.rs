use carousel_sim::{check_replay, simulate, ProcessSpec, StepKind, Trace};

fn scenario() -> Trace {
    simulate(
        &[
            ProcessSpec::new("P1", 0, 5),
            ProcessSpec::new("P2", 1, 3),
            ProcessSpec::new("P3", 12, 2),
        ],
        2,
    )
    .expect("valid input")
}

#[test]
fn test_forward_walk_visits_every_step_once() {
    let trace = scenario();
    let mut replay = trace.replay();

    let mut kinds = vec![replay.current_step().kind];
    while replay.advance() {
        kinds.push(replay.current_step().kind);
    }

    assert_eq!(kinds.len(), trace.len());
    assert_eq!(kinds.first(), Some(&StepKind::Start));
    assert_eq!(kinds.last(), Some(&StepKind::Summary));
    assert!(kinds[1..kinds.len() - 1]
        .iter()
        .all(|kind| *kind == StepKind::Dispatch));
}

#[test]
fn test_seek_is_idempotent() {
    let trace = scenario();
    let mut replay = trace.replay();

    let target = trace.len() / 2;
    let first = replay.seek(target).clone();
    replay.advance();
    replay.reset();
    let second = replay.seek(target);

    assert_eq!(&first, second);
    check_replay(&trace).expect("replay is stable");
}

#[test]
fn test_progress_reports_partial_statistics() {
    let trace = scenario();
    let mut replay = trace.replay();

    let mut last_completed = 0;
    loop {
        let progress = replay.progress();
        assert_eq!(progress.total, 3);
        assert!(progress.completed >= last_completed);
        assert_eq!(progress.average_turnaround.is_some(), progress.completed > 0);
        last_completed = progress.completed;
        if !replay.advance() {
            break;
        }
    }

    let end = replay.progress();
    assert_eq!(end.completed, 3);
    assert_eq!(end.latest_finish, Some(trace.last_step().time));
}

#[test]
fn test_replays_are_independent() {
    let trace = scenario();
    let mut a = trace.replay();
    let b = trace.replay();

    a.seek(3);
    assert_eq!(a.current_index(), 3);
    assert_eq!(b.current_index(), 0);
}
