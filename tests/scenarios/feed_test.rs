//! Feed ordering and the async receive path.

use std::time::Duration;

use prometheus_sched_sim::core::{Process, ProcessId};
use prometheus_sched_sim::infra::{channels, FeedPoll};

use super::{instant_config, run_engine, sealed};

#[test]
fn test_table_and_timeline_sequences_match() {
    let registry = sealed(&[(0, 0, 2, 2), (1, 0, 3, 1), (2, 4, 1, 1)]);
    let outcome = run_engine(&instant_config(0.5), &registry);

    let table: Vec<u64> = outcome.table.iter().map(|s| s.seq).collect();
    let timeline: Vec<u64> = outcome.timeline.iter().map(|s| s.seq).collect();
    assert_eq!(table, vec![0, 1, 2]);
    assert_eq!(table, timeline);
}

#[test]
fn test_terminated_count_grows_by_one_per_snapshot() {
    let registry = sealed(&[(0, 0, 2, 2), (1, 0, 3, 1), (2, 4, 1, 1), (3, 4, 1, 4)]);
    let outcome = run_engine(&instant_config(0.0), &registry);

    for (i, snapshot) in outcome.timeline.iter().enumerate() {
        let done = snapshot
            .processes
            .iter()
            .filter(|p| p.state().is_terminal())
            .count();
        assert_eq!(done, i + 1);
    }
}

#[test]
fn test_backlog_counts_undrained_snapshots() {
    let (mut publisher, table, timeline) = channels();
    let processes = [Process::new(ProcessId(0), 0, 1, 1)];
    for _ in 0..5 {
        publisher.publish(&processes);
    }
    assert_eq!(table.backlog(), 5);
    assert_eq!(timeline.backlog(), 5);
    let _ = table.poll();
    assert_eq!(table.backlog(), 4);
    assert_eq!(timeline.backlog(), 5);
}

#[tokio::test]
async fn test_recv_async_delivers_in_order() {
    let (mut publisher, table, _timeline) = channels();
    let processes = [Process::new(ProcessId(0), 0, 1, 1)];
    publisher.publish(&processes);
    publisher.publish(&processes);
    publisher.finish();

    let timeout = Duration::from_millis(200);
    assert!(matches!(table.recv_async(timeout).await, FeedPoll::Snapshot(s) if s.seq == 0));
    assert!(matches!(table.recv_async(timeout).await, FeedPoll::Snapshot(s) if s.seq == 1));
    assert_eq!(table.recv_async(timeout).await, FeedPoll::Complete);
    assert_eq!(table.recv_async(timeout).await, FeedPoll::Closed);
}

#[tokio::test]
async fn test_recv_async_times_out_when_idle() {
    let (_publisher, table, _timeline) = channels();
    assert_eq!(
        table.recv_async(Duration::from_millis(10)).await,
        FeedPoll::Empty
    );
}
