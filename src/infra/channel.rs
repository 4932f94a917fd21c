//! Snapshot distribution channels.
//!
//! One unbounded crossbeam channel per consumer surface. Publishing never
//! blocks the engine; consumers drain at their own cadence and see every
//! snapshot in publication order. The completion sentinel is sent by
//! [`SnapshotPublisher::finish`], which consumes the publisher so it can
//! only happen once.

use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use tracing::{debug, trace};

use crate::core::process::Process;
use crate::infra::snapshot::{TableSnapshot, TimelineSnapshot};

/// Item carried by a distribution channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery<T> {
    /// A new snapshot.
    Snapshot(T),
    /// No further snapshots will follow.
    Complete,
}

/// Outcome of a single non-blocking poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedPoll<T> {
    /// The next snapshot in publication order.
    Snapshot(T),
    /// The completion sentinel.
    Complete,
    /// Nothing queued right now.
    Empty,
    /// The publisher went away without sending the sentinel
    /// (cancelled or failed run).
    Closed,
}

impl<T> From<Delivery<T>> for FeedPoll<T> {
    fn from(d: Delivery<T>) -> Self {
        match d {
            Delivery::Snapshot(s) => Self::Snapshot(s),
            Delivery::Complete => Self::Complete,
        }
    }
}

/// Consumer end of a distribution channel.
///
/// Clones share one queue: each item goes to exactly one clone.
#[derive(Debug, Clone)]
pub struct SnapshotFeed<T> {
    rx: Receiver<Delivery<T>>,
}

impl<T> SnapshotFeed<T> {
    /// Take at most one queued item without blocking.
    pub fn poll(&self) -> FeedPoll<T> {
        match self.rx.try_recv() {
            Ok(d) => d.into(),
            Err(TryRecvError::Empty) => FeedPoll::Empty,
            Err(TryRecvError::Disconnected) => FeedPoll::Closed,
        }
    }

    /// Wait up to `timeout` for the next item.
    pub fn recv_timeout(&self, timeout: Duration) -> FeedPoll<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(d) => d.into(),
            Err(RecvTimeoutError::Timeout) => FeedPoll::Empty,
            Err(RecvTimeoutError::Disconnected) => FeedPoll::Closed,
        }
    }

    /// Number of items waiting.
    #[must_use]
    pub fn backlog(&self) -> usize {
        self.rx.len()
    }
}

#[cfg(feature = "tokio-runtime")]
impl<T: Send + 'static> SnapshotFeed<T> {
    /// Wait up to `timeout` for the next item from async code.
    ///
    /// The blocking receive runs on tokio's blocking pool so the caller's
    /// runtime is never stalled.
    pub async fn recv_async(&self, timeout: Duration) -> FeedPoll<T> {
        let rx = self.rx.clone();
        match tokio::task::spawn_blocking(move || rx.recv_timeout(timeout)).await {
            Ok(Ok(d)) => d.into(),
            Ok(Err(RecvTimeoutError::Timeout)) => FeedPoll::Empty,
            Ok(Err(RecvTimeoutError::Disconnected)) | Err(_) => FeedPoll::Closed,
        }
    }
}

/// Producer end of both distribution channels.
pub struct SnapshotPublisher {
    table_tx: Sender<Delivery<TableSnapshot>>,
    timeline_tx: Sender<Delivery<TimelineSnapshot>>,
    next_seq: u64,
}

impl SnapshotPublisher {
    /// Publish one snapshot of `processes` (already in scheduling order) to
    /// both channels. Never blocks. Returns the sequence number used.
    pub fn publish(&mut self, processes: &[Process]) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        // A send only fails once every consumer of that surface is gone.
        if self
            .table_tx
            .send(Delivery::Snapshot(TableSnapshot::new(seq, processes)))
            .is_err()
        {
            debug!(seq, "table feed has no consumers");
        }
        if self
            .timeline_tx
            .send(Delivery::Snapshot(TimelineSnapshot::new(seq, processes)))
            .is_err()
        {
            debug!(seq, "timeline feed has no consumers");
        }
        trace!(seq, processes = processes.len(), "snapshot published");
        seq
    }

    /// Number of snapshots published so far.
    #[must_use]
    pub const fn published(&self) -> u64 {
        self.next_seq
    }

    /// Send the completion sentinel on both channels.
    pub fn finish(self) {
        let _ = self.table_tx.send(Delivery::Complete);
        let _ = self.timeline_tx.send(Delivery::Complete);
        debug!(published = self.next_seq, "completion sentinel sent");
    }
}

/// Create the publisher and the two consumer feeds.
#[must_use]
pub fn channels() -> (
    SnapshotPublisher,
    SnapshotFeed<TableSnapshot>,
    SnapshotFeed<TimelineSnapshot>,
) {
    let (table_tx, table_rx) = unbounded();
    let (timeline_tx, timeline_rx) = unbounded();
    (
        SnapshotPublisher {
            table_tx,
            timeline_tx,
            next_seq: 0,
        },
        SnapshotFeed { rx: table_rx },
        SnapshotFeed { rx: timeline_rx },
    )
}
