use carousel_sim::{
    check_replay, check_trace, get_current_sim_seed, reset_sim_rng, set_sim_seed, Workload,
    WorkloadShape,
};
use std::thread;

fn generate(seed: u64, shape: &WorkloadShape) -> Workload {
    reset_sim_rng();
    set_sim_seed(seed);
    shape.generate()
}

#[test]
fn test_seeded_workloads_satisfy_invariants() {
    let shape = WorkloadShape::default();

    for seed in 0..300 {
        let workload = generate(seed, &shape);
        let trace = workload
            .run()
            .unwrap_or_else(|e| panic!("seed {seed}: {e}"));

        if let Err(violation) = check_trace(&trace, &workload.processes) {
            panic!("seed {seed}: {violation}");
        }
        if let Err(violation) = check_replay(&trace) {
            panic!("seed {seed}: {violation}");
        }
    }
}

#[test]
fn test_same_seed_same_trace() {
    let shape = WorkloadShape {
        processes: 4..12,
        ..WorkloadShape::default()
    };

    let first = generate(2024, &shape).run().expect("valid workload");
    let second = generate(2024, &shape).run().expect("valid workload");
    assert_eq!(first, second);
    assert_eq!(get_current_sim_seed(), 2024);
}

#[test]
fn test_parallel_threads_keep_their_own_seed() {
    let handles: Vec<_> = (0..4u64)
        .map(|seed| {
            thread::spawn(move || {
                let shape = WorkloadShape::default();
                let workload = generate(seed, &shape);
                let trace = workload.run().expect("valid workload");
                (seed, get_current_sim_seed(), workload, trace)
            })
        })
        .collect();

    for handle in handles {
        let (seed, observed, workload, trace) = handle.join().expect("thread finished");
        assert_eq!(seed, observed);

        // The same seed on this thread reproduces what the worker saw.
        let again = generate(seed, &WorkloadShape::default());
        assert_eq!(again, workload);
        assert_eq!(again.run().expect("valid workload"), trace);
    }
}

#[test]
fn test_heavy_workloads() {
    let shape = WorkloadShape {
        processes: 40..60,
        arrival: 0..200,
        burst: 1..40,
        quantum: 1..10,
    };

    for seed in 0..20 {
        let workload = generate(seed, &shape);
        let trace = workload.run().expect("valid workload");
        check_trace(&trace, &workload.processes).expect("invariants hold");
        assert_eq!(trace.completed().len(), workload.processes.len());
    }
}
