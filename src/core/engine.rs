//! Scheduling engine: non-preemptive priority dispatch with transient blocking.
//!
//! Each outer iteration takes a priority-sorted copy of the registry and
//! dispatches every `New` process in that order. Dispatch fixes the
//! process's timings, optionally parks it in `Blocked` for a simulated
//! delay, terminates it, publishes a full snapshot and then waits out the
//! pacing delay. Processes that arrive meanwhile are picked up on the next
//! iteration.
//!
//! The run ends once the registry is sealed and nothing is left in `New`;
//! the completion sentinel is then published exactly once. Every simulated
//! delay is taken with the registry lock released.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SimConfig;
use crate::core::process::{ProcessId, ProcessState};
use crate::core::registry::ProcessRegistry;
use crate::core::signal::ShutdownSignal;
use crate::core::SimError;
use crate::infra::channel::SnapshotPublisher;
use crate::util::clock::SimClock;
use crate::util::rng::{seeded_rng, ENGINE_STREAM};

/// Upper bound on one idle wait; bounds how long a cancellation can go
/// unnoticed while the registry is quiet.
const IDLE_WAIT: Duration = Duration::from_millis(50);

/// Point-in-time engine statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Outer loop iterations, including idle wake-ups.
    pub iterations: u64,
    /// Processes dispatched to completion.
    pub dispatched: u64,
    /// Processes that passed through `Blocked`.
    pub blocked: u64,
    /// Snapshots published (per channel).
    pub snapshots_published: u64,
}

/// Lock-free engine counters, readable from any thread while the engine runs.
#[derive(Debug, Default)]
pub struct EngineCounters {
    iterations: AtomicU64,
    dispatched: AtomicU64,
    blocked: AtomicU64,
    snapshots_published: AtomicU64,
}

impl EngineCounters {
    /// Get a snapshot of current statistics.
    #[must_use]
    pub fn snapshot(&self) -> EngineStats {
        EngineStats {
            iterations: self.iterations.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            blocked: self.blocked.load(Ordering::Relaxed),
            snapshots_published: self.snapshots_published.load(Ordering::Relaxed),
        }
    }
}

/// Why the engine loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineExit {
    /// Every process terminated and the roster was sealed; sentinel sent.
    Quiescent,
    /// Cancellation was requested; no sentinel was sent.
    Cancelled,
}

/// Result of a finished engine run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineReport {
    /// Why the loop returned.
    pub exit: EngineExit,
    /// Simulated clock at exit (the makespan on a quiescent run).
    pub clock: u64,
    /// Final counters.
    pub stats: EngineStats,
}

enum Step {
    Done,
    Cancelled,
}

/// Non-preemptive priority scheduler over a shared [`ProcessRegistry`].
pub struct SchedulingEngine {
    registry: Arc<ProcessRegistry>,
    publisher: SnapshotPublisher,
    shutdown: ShutdownSignal,
    clock: SimClock,
    rng: StdRng,
    block_probability: f64,
    blocked_delay: f64,
    pacing_delay: f64,
    now: u64,
    counters: Arc<EngineCounters>,
}

impl SchedulingEngine {
    /// Engine for `config`, draining `registry` and publishing through `publisher`.
    #[must_use]
    pub fn new(
        config: &SimConfig,
        registry: Arc<ProcessRegistry>,
        publisher: SnapshotPublisher,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            registry,
            publisher,
            shutdown,
            clock: config.clock(),
            rng: seeded_rng(config.seed, ENGINE_STREAM),
            block_probability: config.block_probability,
            blocked_delay: config.blocked_delay,
            pacing_delay: config.pacing_delay,
            now: 0,
            counters: Arc::new(EngineCounters::default()),
        }
    }

    /// Shared handle to the live counters.
    #[must_use]
    pub fn counters(&self) -> Arc<EngineCounters> {
        Arc::clone(&self.counters)
    }

    /// Current simulated time.
    #[must_use]
    pub const fn now(&self) -> u64 {
        self.now
    }

    /// Run until quiescence or cancellation.
    ///
    /// # Errors
    ///
    /// Any invariant violation is fatal: the engine stops immediately and
    /// drops the publisher without a sentinel, so feeds report `Closed`.
    pub fn run(mut self) -> Result<EngineReport, SimError> {
        info!(
            block_probability = self.block_probability,
            unit_ms = u64::try_from(self.clock.unit().as_millis()).unwrap_or(u64::MAX),
            "scheduling engine started"
        );
        let exit = match self.drive() {
            Ok(exit) => exit,
            Err(e) => {
                warn!(error = %e, clock = self.now, "scheduling engine aborted");
                return Err(e);
            }
        };
        let report = EngineReport {
            exit,
            clock: self.now,
            stats: self.counters.snapshot(),
        };
        match exit {
            EngineExit::Quiescent => {
                self.publisher.finish();
                info!(
                    clock = report.clock,
                    dispatched = report.stats.dispatched,
                    blocked = report.stats.blocked,
                    "scheduling engine reached quiescence"
                );
            }
            EngineExit::Cancelled => {
                info!(clock = report.clock, "scheduling engine cancelled");
            }
        }
        Ok(report)
    }

    fn drive(&mut self) -> Result<EngineExit, SimError> {
        loop {
            if self.shutdown.is_cancelled() {
                return Ok(EngineExit::Cancelled);
            }
            self.counters.iterations.fetch_add(1, Ordering::Relaxed);

            let view = self.registry.sorted_view();
            let pending: Vec<ProcessId> = view
                .processes
                .iter()
                .filter(|p| p.state() == ProcessState::New)
                .map(|p| p.id())
                .collect();

            if pending.is_empty() {
                if view.sealed {
                    if !self.registry.is_quiescent() {
                        return Err(SimError::invariant(
                            "no pending work but a process is still running or blocked",
                        ));
                    }
                    return Ok(EngineExit::Quiescent);
                }
                self.registry.wait_for_change(view.generation, IDLE_WAIT);
                continue;
            }

            debug!(pending = pending.len(), clock = self.now, "dispatch round");
            for id in pending {
                if self.shutdown.is_cancelled() {
                    return Ok(EngineExit::Cancelled);
                }
                if let Step::Cancelled = self.step(id)? {
                    return Ok(EngineExit::Cancelled);
                }
            }
        }
    }

    /// Dispatch one process through to `Terminated`, publish, then pace.
    fn step(&mut self, id: ProcessId) -> Result<Step, SimError> {
        let now = self.now;
        let timings = self.registry.update(id, |p| p.dispatch(now))?;
        self.now = timings.finish_time;

        let blocked = self.rng.random::<f64>() < self.block_probability;
        let mut cancelled = false;
        if blocked {
            self.registry
                .update(id, |p| p.transition(ProcessState::Blocked))?;
            self.counters.blocked.fetch_add(1, Ordering::Relaxed);
            debug!(id = %id, "process blocked");
            cancelled = self.shutdown.sleep(self.clock.duration(self.blocked_delay));
        }
        self.registry
            .update(id, |p| p.transition(ProcessState::Terminated))?;
        self.counters.dispatched.fetch_add(1, Ordering::Relaxed);
        info!(
            id = %id,
            start = timings.start_time,
            finish = timings.finish_time,
            turnaround = timings.turnaround_time,
            wait = timings.wait_time,
            blocked,
            "process terminated"
        );

        let seq = self.publisher.publish(&self.registry.snapshot_and_sort());
        self.counters
            .snapshots_published
            .store(self.publisher.published(), Ordering::Relaxed);
        debug!(seq, "snapshot published");

        if cancelled || self.shutdown.sleep(self.clock.duration(self.pacing_delay)) {
            return Ok(Step::Cancelled);
        }
        Ok(Step::Done)
    }
}
