//! Simulation runtime: spawns the generator and engine threads and joins them.
//!
//! The generator and the engine each get a dedicated, named OS thread and
//! share nothing but the registry (`Arc<ProcessRegistry>`) and the
//! cancellation signal. `join` is the barrier that waits for both;
//! `shutdown` cancels first and gives each thread a bounded time to exit.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::config::SimConfig;
use crate::core::{
    ArrivalGenerator, EngineCounters, EngineExit, EngineReport, EngineStats, Process,
    ProcessRegistry, SchedulingEngine, ShutdownSignal, SimError,
};
use crate::infra::channel::{channels, SnapshotFeed};
use crate::infra::snapshot::{TableSnapshot, TimelineSnapshot};

const GENERATOR_THREAD: &str = "sched-arrivals";
const ENGINE_THREAD: &str = "sched-engine";

/// Final report of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Run identifier, also recorded on every log line of the run.
    pub run_id: Uuid,
    /// Why the engine stopped.
    pub exit: EngineExit,
    /// Processes inserted by the generator.
    pub inserted: u32,
    /// Every process, in insertion order, with final state and timings.
    pub processes: Vec<Process>,
    /// Simulated time when the last process finished.
    pub makespan: u64,
    /// Mean wait time over dispatched processes.
    pub average_wait: f64,
    /// Mean turnaround time over dispatched processes.
    pub average_turnaround: f64,
    /// Engine counters at exit.
    pub stats: EngineStats,
}

impl RunSummary {
    fn new(run_id: Uuid, report: EngineReport, inserted: u32, processes: Vec<Process>) -> Self {
        let timings: Vec<_> = processes.iter().filter_map(Process::timings).collect();
        #[allow(clippy::cast_precision_loss)]
        let mean = |total: u64| {
            if timings.is_empty() {
                0.0
            } else {
                total as f64 / timings.len() as f64
            }
        };
        let average_wait = mean(timings.iter().map(|t| t.wait_time).sum());
        let average_turnaround = mean(timings.iter().map(|t| t.turnaround_time).sum());
        Self {
            run_id,
            exit: report.exit,
            inserted,
            processes,
            makespan: report.clock,
            average_wait,
            average_turnaround,
            stats: report.stats,
        }
    }
}

/// A configured, not yet started simulation.
pub struct Simulation {
    run_id: Uuid,
    registry: Arc<ProcessRegistry>,
    shutdown: ShutdownSignal,
    generator: ArrivalGenerator,
    engine: SchedulingEngine,
    table_feed: SnapshotFeed<TableSnapshot>,
    timeline_feed: SnapshotFeed<TimelineSnapshot>,
}

impl Simulation {
    /// Wire a simulation for an already validated `config`.
    pub(crate) fn new(config: &SimConfig) -> Self {
        let run_id = Uuid::new_v4();
        let registry = Arc::new(ProcessRegistry::new());
        let shutdown = ShutdownSignal::new();
        let (publisher, table_feed, timeline_feed) = channels();
        let generator = ArrivalGenerator::new(config, Arc::clone(&registry), shutdown.clone());
        let engine = SchedulingEngine::new(config, Arc::clone(&registry), publisher, shutdown.clone());
        Self {
            run_id,
            registry,
            shutdown,
            generator,
            engine,
            table_feed,
            timeline_feed,
        }
    }

    /// Run identifier.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Consumer end of the table channel.
    #[must_use]
    pub fn table_feed(&self) -> SnapshotFeed<TableSnapshot> {
        self.table_feed.clone()
    }

    /// Consumer end of the timeline channel.
    #[must_use]
    pub fn timeline_feed(&self) -> SnapshotFeed<TimelineSnapshot> {
        self.timeline_feed.clone()
    }

    /// Spawn the generator and engine threads.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Spawn` if either thread cannot be created; a
    /// generator that did start is cancelled and joined first.
    pub fn start(self) -> Result<SimulationHandle, SimError> {
        let Self {
            run_id,
            registry,
            shutdown,
            generator,
            engine,
            table_feed,
            timeline_feed,
        } = self;
        let counters = engine.counters();

        let generator_handle = thread::Builder::new()
            .name(GENERATOR_THREAD.into())
            .spawn(move || {
                let span = info_span!("arrivals", run_id = %run_id);
                let _entered = span.enter();
                generator.run()
            })
            .map_err(|e| SimError::Spawn(format!("{GENERATOR_THREAD}: {e}")))?;

        let engine_handle = match thread::Builder::new()
            .name(ENGINE_THREAD.into())
            .spawn(move || {
                let span = info_span!("engine", run_id = %run_id);
                let _entered = span.enter();
                engine.run()
            }) {
            Ok(handle) => handle,
            Err(e) => {
                shutdown.cancel();
                let _ = generator_handle.join();
                return Err(SimError::Spawn(format!("{ENGINE_THREAD}: {e}")));
            }
        };

        info!(run_id = %run_id, "simulation started");
        Ok(SimulationHandle {
            run_id,
            registry,
            shutdown,
            counters,
            generator: generator_handle,
            engine: engine_handle,
            table_feed,
            timeline_feed,
        })
    }
}

/// A running simulation.
pub struct SimulationHandle {
    run_id: Uuid,
    registry: Arc<ProcessRegistry>,
    shutdown: ShutdownSignal,
    counters: Arc<EngineCounters>,
    generator: JoinHandle<Result<u32, SimError>>,
    engine: JoinHandle<Result<EngineReport, SimError>>,
    table_feed: SnapshotFeed<TableSnapshot>,
    timeline_feed: SnapshotFeed<TimelineSnapshot>,
}

impl SimulationHandle {
    /// Run identifier.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Consumer end of the table channel.
    #[must_use]
    pub fn table_feed(&self) -> SnapshotFeed<TableSnapshot> {
        self.table_feed.clone()
    }

    /// Consumer end of the timeline channel.
    #[must_use]
    pub fn timeline_feed(&self) -> SnapshotFeed<TimelineSnapshot> {
        self.timeline_feed.clone()
    }

    /// Cancellation signal shared with both threads.
    #[must_use]
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Live engine statistics.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        self.counters.snapshot()
    }

    /// Insertion-ordered copy of every process known so far.
    #[must_use]
    pub fn processes(&self) -> Vec<Process> {
        self.registry.processes()
    }

    /// Whether both threads have returned.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.generator.is_finished() && self.engine.is_finished()
    }

    /// Request cancellation without waiting.
    pub fn cancel(&self) {
        self.shutdown.cancel();
    }

    /// Wait for both threads and build the final report.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error of either thread, `ThreadPanicked` if
    /// one panicked, or `Cancelled` if the run was cancelled before
    /// quiescence.
    pub fn join(self) -> Result<RunSummary, SimError> {
        let report = flatten(self.engine.join(), ENGINE_THREAD);
        if report.is_err() {
            // Stop the generator instead of waiting out its remaining roster.
            self.shutdown.cancel();
        }
        let inserted = flatten(self.generator.join(), GENERATOR_THREAD);
        let summary = summarize(self.run_id, &self.registry, inserted, report)?;
        if summary.exit == EngineExit::Cancelled {
            return Err(SimError::Cancelled);
        }
        Ok(summary)
    }

    /// Cancel the run and wait up to `timeout` for each thread.
    ///
    /// Threads that do not exit in time are detached. A run that had
    /// already reached quiescence reports `EngineExit::Quiescent`.
    ///
    /// # Errors
    ///
    /// Returns `JoinTimeout` for a detached thread, otherwise the same
    /// errors as [`join`](Self::join) except `Cancelled`.
    pub fn shutdown(self, timeout: Duration) -> Result<RunSummary, SimError> {
        self.shutdown.cancel();
        info!(run_id = %self.run_id, "shutting down simulation");
        let inserted = join_with_timeout(self.generator, GENERATOR_THREAD, timeout)?;
        let report = join_with_timeout(self.engine, ENGINE_THREAD, timeout)?;
        summarize(self.run_id, &self.registry, inserted, report)
    }
}

fn flatten<T>(joined: thread::Result<Result<T, SimError>>, name: &'static str) -> Result<T, SimError> {
    joined.map_err(|_| SimError::ThreadPanicked(name))?
}

fn summarize(
    run_id: Uuid,
    registry: &ProcessRegistry,
    inserted: Result<u32, SimError>,
    report: Result<EngineReport, SimError>,
) -> Result<RunSummary, SimError> {
    let report = report?;
    let inserted = inserted?;
    let summary = RunSummary::new(run_id, report, inserted, registry.processes());
    info!(
        run_id = %run_id,
        exit = ?summary.exit,
        makespan = summary.makespan,
        average_wait = summary.average_wait,
        average_turnaround = summary.average_turnaround,
        "simulation finished"
    );
    Ok(summary)
}

/// Join `handle`, giving up after `timeout`. Uses a helper thread because
/// `JoinHandle` has no timed join.
fn join_with_timeout<T: Send + 'static>(
    handle: JoinHandle<Result<T, SimError>>,
    name: &'static str,
    timeout: Duration,
) -> Result<Result<T, SimError>, SimError> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let joiner = thread::spawn(move || {
        let _ = tx.send(handle.join());
    });
    match rx.recv_timeout(timeout) {
        Ok(joined) => {
            let _ = joiner.join();
            debug!(thread = name, "thread joined");
            Ok(flatten(joined, name))
        }
        Err(_) => {
            warn!(thread = name, "thread did not exit within timeout - detaching");
            Err(SimError::JoinTimeout(name))
        }
    }
}
