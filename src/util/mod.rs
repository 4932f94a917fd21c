//! Shared utilities.

pub mod clock;
pub mod rng;
pub mod telemetry;

pub use clock::SimClock;
pub use rng::seeded_rng;
pub use telemetry::init_tracing;
