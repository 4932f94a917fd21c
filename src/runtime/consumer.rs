//! Fixed-cadence consumer loop over a snapshot feed.
//!
//! Mirrors how a single-threaded UI drains its channel: on every tick it
//! takes at most one queued snapshot, hands it to the consumer, and sleeps
//! for the poll interval. A slow consumer lags but never skips or reorders.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::core::{ShutdownSignal, SimError};
use crate::infra::channel::{FeedPoll, SnapshotFeed};

/// Receiver of snapshots delivered by [`run_poll_loop`].
pub trait SnapshotConsumer<T> {
    /// Redraw from a freshly delivered snapshot.
    fn render(&mut self, snapshot: T);

    /// The completion sentinel arrived; no further snapshots will follow.
    fn complete(&mut self) {}
}

impl<T, F> SnapshotConsumer<T> for F
where
    F: FnMut(T),
{
    fn render(&mut self, snapshot: T) {
        self(snapshot);
    }
}

/// Why a poll loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollExit {
    /// The completion sentinel was delivered.
    Complete,
    /// The publisher vanished without a sentinel.
    Closed,
    /// The loop's own shutdown signal fired.
    Cancelled,
}

/// Drain `feed` one item per `interval` tick until the sentinel arrives,
/// the feed closes, or `shutdown` fires. Returns how the loop ended and how
/// many snapshots were rendered.
pub fn run_poll_loop<T, C>(
    feed: &SnapshotFeed<T>,
    consumer: &mut C,
    interval: Duration,
    shutdown: &ShutdownSignal,
) -> (PollExit, u64)
where
    C: SnapshotConsumer<T> + ?Sized,
{
    let mut rendered = 0;
    loop {
        match feed.poll() {
            FeedPoll::Snapshot(snapshot) => {
                consumer.render(snapshot);
                rendered += 1;
            }
            FeedPoll::Complete => {
                consumer.complete();
                debug!(rendered, "consumer saw completion sentinel");
                return (PollExit::Complete, rendered);
            }
            FeedPoll::Closed => return (PollExit::Closed, rendered),
            FeedPoll::Empty => {}
        }
        if shutdown.sleep(interval) {
            return (PollExit::Cancelled, rendered);
        }
    }
}

/// Run [`run_poll_loop`] on a dedicated, named thread.
///
/// # Errors
///
/// Returns `SimError::Spawn` if the thread cannot be created.
pub fn spawn_consumer<T, C>(
    name: &str,
    feed: SnapshotFeed<T>,
    mut consumer: C,
    interval: Duration,
    shutdown: ShutdownSignal,
) -> Result<JoinHandle<(PollExit, u64)>, SimError>
where
    T: Send + 'static,
    C: SnapshotConsumer<T> + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_owned())
        .spawn(move || run_poll_loop(&feed, &mut consumer, interval, &shutdown))
        .map_err(|e| SimError::Spawn(format!("{name}: {e}")))
}
