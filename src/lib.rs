//! # Prometheus Scheduling Simulator
//!
//! A concurrent simulation of a non-preemptive, priority-based CPU scheduler
//! whose evolving state is fanned out to independent display surfaces.
//!
//! ## Pipeline
//!
//! ```text
//! ArrivalGenerator ──append──▶ ProcessRegistry ──snapshot_and_sort──▶ SchedulingEngine
//!                                                                         │ publish
//!                                                      ┌──────────────────┴──────────────────┐
//!                                              SnapshotFeed<TableSnapshot>     SnapshotFeed<TimelineSnapshot>
//! ```
//!
//! - **Process Registry**: the only shared mutable state, guarded by one
//!   `parking_lot::Mutex`. Callers only ever receive copies.
//! - **Arrival Generator**: its own OS thread; inserts randomized processes
//!   with arrival jitter, then seals the registry.
//! - **Scheduling Engine**: its own OS thread; dispatches `New` processes in
//!   `(priority, arrival, insertion)` order, computes start / finish /
//!   turnaround / wait, simulates transient blocking and publishes a full
//!   snapshot after every completed process. Stops at quiescence and sends
//!   the completion sentinel exactly once.
//! - **Distribution Channels**: unbounded crossbeam channels; publishing
//!   never blocks and consumers never miss or reorder a snapshot.
//!
//! All simulated delays are taken with the registry lock released.
//!
//! ## Example
//!
//! ```rust,no_run
//! use prometheus_sched_sim::builders::build_simulation;
//! use prometheus_sched_sim::config::SimConfig;
//! use prometheus_sched_sim::infra::FeedPoll;
//!
//! let sim = build_simulation(&SimConfig::default())?;
//! let table = sim.table_feed();
//! let handle = sim.start()?;
//!
//! loop {
//!     match table.recv_timeout(std::time::Duration::from_secs(1)) {
//!         FeedPoll::Snapshot(snapshot) => println!("{} rows", snapshot.rows.len()),
//!         FeedPoll::Complete | FeedPoll::Closed => break,
//!         FeedPoll::Empty => {}
//!     }
//! }
//! let summary = handle.join()?;
//! println!("average wait {:.2}", summary.average_wait);
//! # Ok::<(), prometheus_sched_sim::core::SimError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Process model, registry, generator, engine and errors.
pub mod core;
/// Configuration models for simulation runs.
pub mod config;
/// Builders to construct simulations from configuration.
pub mod builders;
/// Snapshot payloads and distribution channels.
pub mod infra;
/// Thread orchestration and consumer poll loops.
pub mod runtime;
/// Shared utilities.
pub mod util;
