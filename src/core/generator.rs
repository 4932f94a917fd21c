//! Arrival generator: injects randomized processes into the registry.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, error, info};

use crate::config::{Bounds, SimConfig};
use crate::core::process::{Process, ProcessId};
use crate::core::registry::ProcessRegistry;
use crate::core::signal::ShutdownSignal;
use crate::core::SimError;
use crate::util::clock::SimClock;
use crate::util::rng::{seeded_rng, ARRIVAL_STREAM};

/// Produces the run's roster, one process at a time, with randomized
/// attributes and arrival jitter.
pub struct ArrivalGenerator {
    registry: Arc<ProcessRegistry>,
    shutdown: ShutdownSignal,
    clock: SimClock,
    rng: StdRng,
    roster_size: u32,
    burst: Bounds<u64>,
    priority: Bounds<u8>,
    arrival_increment: Bounds<u64>,
    inter_arrival_delay: Bounds<f64>,
    next_id: u32,
    next_arrival: u64,
}

impl ArrivalGenerator {
    /// Generator for `config`, feeding `registry`.
    #[must_use]
    pub fn new(config: &SimConfig, registry: Arc<ProcessRegistry>, shutdown: ShutdownSignal) -> Self {
        Self {
            registry,
            shutdown,
            clock: config.clock(),
            rng: seeded_rng(config.seed, ARRIVAL_STREAM),
            roster_size: config.roster_size,
            burst: config.burst,
            priority: config.priority,
            arrival_increment: config.arrival_increment,
            inter_arrival_delay: config.inter_arrival_delay,
            next_id: 0,
            next_arrival: 0,
        }
    }

    /// Whether the roster is exhausted.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.next_id >= self.roster_size
    }

    /// Draw the next process, or `None` once the roster is exhausted.
    ///
    /// The first process arrives at 0; each later one arrives a random
    /// increment after its predecessor.
    pub fn next_process(&mut self) -> Option<Process> {
        if self.is_exhausted() {
            return None;
        }
        let id = ProcessId(self.next_id);
        let burst = self.rng.random_range(self.burst.min..=self.burst.max);
        let priority = self.rng.random_range(self.priority.min..=self.priority.max);
        let process = Process::new(id, self.next_arrival, burst, priority);

        self.next_id += 1;
        let increment = self
            .rng
            .random_range(self.arrival_increment.min..=self.arrival_increment.max);
        self.next_arrival = self.next_arrival.saturating_add(increment);
        Some(process)
    }

    /// Run until the roster is exhausted or cancellation is requested,
    /// then seal the registry. Returns the number of processes inserted.
    ///
    /// The registry lock is only held inside `append`; jitter sleeps happen
    /// outside it.
    ///
    /// # Errors
    ///
    /// Propagates registry invariant violations. The registry is sealed on
    /// every exit path.
    pub fn run(mut self) -> Result<u32, SimError> {
        info!(roster = self.roster_size, "arrival generator started");
        let result = self.produce();
        self.registry.seal();
        match &result {
            Ok(inserted) => info!(inserted, "arrival generator finished"),
            Err(e) => error!(error = %e, "arrival generator failed"),
        }
        result
    }

    fn produce(&mut self) -> Result<u32, SimError> {
        let mut inserted = 0;
        while let Some(process) = self.next_process() {
            if self.shutdown.is_cancelled() {
                debug!("arrival generator cancelled");
                return Ok(inserted);
            }
            debug!(
                id = %process.id(),
                arrival = process.arrival_time(),
                burst = process.burst(),
                priority = process.priority(),
                "process arrived"
            );
            self.registry.append(process)?;
            inserted += 1;

            if self.is_exhausted() {
                break;
            }
            let jitter = self
                .rng
                .random_range(self.inter_arrival_delay.min..=self.inter_arrival_delay.max);
            if self.shutdown.sleep(self.clock.duration(jitter)) {
                debug!("arrival generator cancelled during jitter");
                return Ok(inserted);
            }
        }
        Ok(inserted)
    }
}
