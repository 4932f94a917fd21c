//! Random number sources for the simulation threads.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Independent stream for the arrival generator.
pub const ARRIVAL_STREAM: u64 = 0;
/// Independent stream for the scheduling engine.
pub const ENGINE_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// RNG for `stream`, reproducible when `seed` is set, OS-seeded otherwise.
#[must_use]
pub fn seeded_rng(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ stream),
        None => StdRng::from_os_rng(),
    }
}
