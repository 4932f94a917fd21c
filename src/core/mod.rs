//! Core simulation: process model, shared registry, and the two worker loops.

pub mod engine;
pub mod error;
pub mod generator;
pub mod process;
pub mod registry;
pub mod signal;

pub use engine::{EngineCounters, EngineExit, EngineReport, EngineStats, SchedulingEngine};
pub use error::{AppResult, SimError};
pub use generator::ArrivalGenerator;
pub use process::{Process, ProcessId, ProcessState, Timings};
pub use registry::{ProcessRegistry, SortedView};
pub use signal::ShutdownSignal;
