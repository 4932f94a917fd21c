//! Dispatch order and timing arithmetic.

use prometheus_sched_sim::core::ProcessState;

use super::{instant_config, run_engine, sealed, timings_of};

#[test]
fn test_priority_beats_arrival() {
    let registry = sealed(&[(0, 0, 5, 2), (1, 1, 3, 1), (2, 2, 4, 1)]);
    let outcome = run_engine(&instant_config(0.0), &registry);

    let p1 = timings_of(&registry, 1);
    assert_eq!((p1.start_time, p1.finish_time, p1.turnaround_time, p1.wait_time), (1, 4, 3, 0));
    let p2 = timings_of(&registry, 2);
    assert_eq!((p2.start_time, p2.finish_time, p2.turnaround_time, p2.wait_time), (4, 8, 6, 2));
    let p0 = timings_of(&registry, 0);
    assert_eq!((p0.start_time, p0.finish_time, p0.turnaround_time, p0.wait_time), (8, 13, 13, 8));
    assert_eq!(outcome.report.clock, 13);
}

#[test]
fn test_idle_cpu_waits_for_arrival() {
    let registry = sealed(&[(0, 10, 2, 1)]);
    let outcome = run_engine(&instant_config(0.0), &registry);

    let p0 = timings_of(&registry, 0);
    assert_eq!((p0.start_time, p0.finish_time, p0.wait_time), (10, 12, 0));
    assert_eq!(outcome.report.clock, 12);
}

#[test]
fn test_equal_keys_dispatch_in_insertion_order() {
    let registry = sealed(&[(7, 0, 2, 3), (3, 0, 2, 3), (5, 0, 2, 3)]);
    run_engine(&instant_config(0.0), &registry);

    assert_eq!(timings_of(&registry, 7).start_time, 0);
    assert_eq!(timings_of(&registry, 3).start_time, 2);
    assert_eq!(timings_of(&registry, 5).start_time, 4);
}

#[test]
fn test_timing_invariants_hold_for_every_process() {
    let processes: Vec<(u32, u64, u64, u8)> = (0..20)
        .map(|i| (i, u64::from(i) * 2, u64::from(i % 5) + 2, u8::try_from(i % 4).unwrap() + 1))
        .collect();
    let registry = sealed(&processes);
    run_engine(&instant_config(0.0), &registry);

    let mut finished = Vec::new();
    for p in registry.processes() {
        assert_eq!(p.state(), ProcessState::Terminated);
        let t = p.timings().unwrap();
        assert!(t.start_time >= p.arrival_time());
        assert_eq!(t.finish_time, t.start_time + p.burst());
        assert_eq!(t.turnaround_time, t.finish_time - p.arrival_time());
        assert_eq!(t.wait_time, t.turnaround_time - p.burst());
        finished.push((t.start_time, t.finish_time));
    }
    // Non-preemptive single CPU: execution intervals never overlap.
    finished.sort_unstable();
    for pair in finished.windows(2) {
        assert!(pair[0].1 <= pair[1].0);
    }
}

#[test]
fn test_snapshots_follow_scheduling_order() {
    let registry = sealed(&[(0, 0, 5, 2), (1, 1, 3, 1), (2, 2, 4, 1)]);
    let outcome = run_engine(&instant_config(0.0), &registry);

    for snapshot in &outcome.table {
        let keys: Vec<_> = snapshot
            .rows
            .iter()
            .map(|r| (r.priority, r.arrival_time))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
    }
}
