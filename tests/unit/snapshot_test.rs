//! Tests for snapshot payload shapes

use prometheus_sched_sim::core::{Process, ProcessId, ProcessState};
use prometheus_sched_sim::infra::{channels, ColumnLayout, FeedPoll, TableSnapshot, TimelineSnapshot};

fn finished(id: u32, arrival: u64, burst: u64, priority: u8, now: u64) -> Process {
    let mut p = Process::new(ProcessId(id), arrival, burst, priority);
    p.dispatch(now).unwrap();
    p.transition(ProcessState::Terminated).unwrap();
    p
}

#[test]
fn test_table_snapshot_preserves_order() {
    let processes = vec![
        finished(1, 1, 3, 1, 0),
        Process::new(ProcessId(2), 2, 4, 1),
        Process::new(ProcessId(0), 0, 5, 2),
    ];
    let snap = TableSnapshot::new(7, &processes);
    assert_eq!(snap.seq, 7);
    let ids: Vec<_> = snap.rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![ProcessId(1), ProcessId(2), ProcessId(0)]);
    assert_eq!(snap.rows[0].finish_time, Some(4));
    assert_eq!(snap.rows[1].start_time, None);
}

#[test]
fn test_both_feeds_carry_same_logical_snapshot() {
    let (mut publisher, table, timeline) = channels();
    let processes = vec![finished(1, 1, 3, 1, 0), Process::new(ProcessId(0), 0, 5, 2)];
    publisher.publish(&processes);

    let FeedPoll::Snapshot(t) = table.poll() else {
        panic!("expected table snapshot");
    };
    let FeedPoll::Snapshot(g) = timeline.poll() else {
        panic!("expected timeline snapshot");
    };
    assert_eq!(t.seq, g.seq);
    let bars = g.bars();
    assert_eq!(bars.len(), t.rows.len());
    for (row, bar) in t.rows.iter().zip(&bars) {
        assert_eq!(bar.start, row.start_time.unwrap_or(0));
        assert_eq!(bar.length, row.burst);
        assert_eq!(bar.end_label, row.finish_time);
    }
}

#[test]
fn test_snapshot_serializes() {
    let snap = TableSnapshot::new(0, &[finished(0, 0, 2, 1, 0)]);
    let json = serde_json::to_string(&snap).unwrap();
    assert!(json.contains("\"state\":\"terminated\""));
    let back: TableSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snap);
}

#[test]
fn test_cells_render_empty_for_unset_timings() {
    let snap = TableSnapshot::new(0, &[Process::new(ProcessId(8), 3, 2, 4)]);
    let cells = snap.rows[0].cells(&ColumnLayout::default());
    assert_eq!(cells[4..8], ["", "", "", ""]);
}

#[test]
fn test_timeline_snapshot_encodes_lifecycle() {
    let snap = TimelineSnapshot::new(3, &[finished(2, 1, 4, 2, 0), Process::new(ProcessId(5), 2, 3, 1)]);
    let json = serde_json::to_value(&snap).unwrap();
    let processes = json["processes"].as_array().unwrap();
    assert_eq!(processes[0]["state"], "terminated");
    assert_eq!(processes[0]["timings"]["finish_time"], 5);
    assert_eq!(processes[1]["state"], "new");
    assert!(processes[1]["timings"].is_null());
}
