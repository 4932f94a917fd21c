//! Configuration models for simulation runs.

pub mod sim;

pub use sim::{Bounds, SimConfig, ENV_PREFIX};
