//! Runtime adapters: thread orchestration for a run and consumer poll loops.

pub mod consumer;
pub mod simulation;

pub use consumer::{run_poll_loop, spawn_consumer, PollExit, SnapshotConsumer};
pub use simulation::{RunSummary, Simulation, SimulationHandle};
