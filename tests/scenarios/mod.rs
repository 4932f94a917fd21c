//! End-to-end scheduling scenarios driven against a hand-built registry.

mod blocking_test;
mod dispatch_order_test;
mod feed_test;

use std::sync::Arc;

use prometheus_sched_sim::config::SimConfig;
use prometheus_sched_sim::core::{
    EngineReport, Process, ProcessId, ProcessRegistry, SchedulingEngine, ShutdownSignal,
};
use prometheus_sched_sim::infra::{channels, FeedPoll, SnapshotFeed, TableSnapshot, TimelineSnapshot};

/// Configuration with pacing disabled and a fixed seed.
pub fn instant_config(block_probability: f64) -> SimConfig {
    SimConfig {
        time_unit_ms: 0,
        block_probability,
        seed: Some(2024),
        ..SimConfig::default()
    }
}

/// Registry holding `(id, arrival, burst, priority)` tuples, sealed.
pub fn sealed(processes: &[(u32, u64, u64, u8)]) -> Arc<ProcessRegistry> {
    let registry = Arc::new(ProcessRegistry::new());
    for &(id, arrival, burst, priority) in processes {
        registry
            .append(Process::new(ProcessId(id), arrival, burst, priority))
            .unwrap();
    }
    registry.seal();
    registry
}

/// Everything one engine run left behind.
pub struct Outcome {
    pub report: EngineReport,
    pub table: Vec<TableSnapshot>,
    pub timeline: Vec<TimelineSnapshot>,
    pub table_completed: bool,
    pub timeline_completed: bool,
}

/// Run an engine to completion on the current thread and drain both feeds.
pub fn run_engine(config: &SimConfig, registry: &Arc<ProcessRegistry>) -> Outcome {
    let (publisher, table_feed, timeline_feed) = channels();
    let engine = SchedulingEngine::new(
        config,
        Arc::clone(registry),
        publisher,
        ShutdownSignal::new(),
    );
    let report = engine.run().unwrap();
    let (table, table_completed) = drain(&table_feed);
    let (timeline, timeline_completed) = drain(&timeline_feed);
    Outcome {
        report,
        table,
        timeline,
        table_completed,
        timeline_completed,
    }
}

/// Take every queued item; returns the snapshots and whether exactly one
/// sentinel closed the stream.
pub fn drain<T>(feed: &SnapshotFeed<T>) -> (Vec<T>, bool) {
    let mut snapshots = Vec::new();
    let mut sentinels = 0;
    loop {
        match feed.poll() {
            FeedPoll::Snapshot(s) => {
                assert_eq!(sentinels, 0, "snapshot after completion sentinel");
                snapshots.push(s);
            }
            FeedPoll::Complete => sentinels += 1,
            FeedPoll::Empty | FeedPoll::Closed => break,
        }
    }
    assert!(sentinels <= 1, "sentinel delivered {sentinels} times");
    (snapshots, sentinels == 1)
}

/// Timings of `id` in the final registry state.
pub fn timings_of(
    registry: &ProcessRegistry,
    id: u32,
) -> prometheus_sched_sim::core::Timings {
    registry
        .processes()
        .into_iter()
        .find(|p| p.id() == ProcessId(id))
        .and_then(|p| p.timings())
        .unwrap()
}
