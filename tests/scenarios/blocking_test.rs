//! Transient blocking.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use prometheus_sched_sim::config::SimConfig;
use prometheus_sched_sim::core::{
    EngineExit, Process, ProcessId, ProcessRegistry, ProcessState, SchedulingEngine,
    ShutdownSignal,
};
use prometheus_sched_sim::infra::channels;

use super::{instant_config, run_engine, sealed, timings_of};

#[test]
fn test_forced_blocking_terminates_every_process() {
    let registry = sealed(&[(0, 0, 3, 2), (1, 0, 4, 1)]);
    let outcome = run_engine(&instant_config(1.0), &registry);

    assert_eq!(outcome.report.stats.blocked, 2);
    assert_eq!(outcome.report.stats.dispatched, 2);
    assert_eq!(registry.count_in(ProcessState::Terminated), 2);
    // Blocked time is pure wall-clock delay; timings are unaffected.
    assert_eq!(timings_of(&registry, 1).finish_time, 4);
    assert_eq!(timings_of(&registry, 0).finish_time, 7);
}

#[test]
fn test_blocked_state_never_published() {
    let registry = sealed(&[(0, 0, 3, 2), (1, 0, 4, 1), (2, 1, 2, 3)]);
    let outcome = run_engine(&instant_config(1.0), &registry);

    for snapshot in &outcome.table {
        assert!(snapshot
            .rows
            .iter()
            .all(|r| matches!(r.state, ProcessState::New | ProcessState::Terminated)));
    }
}

#[test]
fn test_zero_probability_never_blocks() {
    let registry = sealed(&[(0, 0, 3, 2), (1, 0, 4, 1), (2, 1, 2, 3)]);
    let outcome = run_engine(&instant_config(0.0), &registry);
    assert_eq!(outcome.report.stats.blocked, 0);
}

#[test]
fn test_registry_stays_available_while_blocked() {
    let registry = Arc::new(ProcessRegistry::new());
    registry
        .append(Process::new(ProcessId(0), 0, 2, 1))
        .unwrap();

    let config = SimConfig {
        time_unit_ms: 1000,
        ..instant_config(1.0)
    };
    let (publisher, _table, _timeline) = channels();
    let shutdown = ShutdownSignal::new();
    let engine = SchedulingEngine::new(&config, Arc::clone(&registry), publisher, shutdown.clone());
    let handle = thread::spawn(move || engine.run());

    let deadline = Instant::now() + Duration::from_millis(1500);
    while registry.count_in(ProcessState::Blocked) != 1 {
        assert!(Instant::now() < deadline, "engine never blocked");
        thread::sleep(Duration::from_millis(5));
    }

    // The blocked delay lasts two seconds; the lock must be free throughout.
    let started = Instant::now();
    registry
        .append(Process::new(ProcessId(1), 1, 3, 2))
        .unwrap();
    let sorted = registry.snapshot_and_sort();
    assert!(started.elapsed() < Duration::from_millis(250));
    assert_eq!(sorted.len(), 2);
    assert_eq!(registry.count_in(ProcessState::Blocked), 1);

    shutdown.cancel();
    let report = handle.join().unwrap().unwrap();
    assert_eq!(report.exit, EngineExit::Cancelled);
}
