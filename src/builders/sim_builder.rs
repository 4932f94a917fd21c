//! Builders to construct simulations from configuration.

use crate::config::SimConfig;
use crate::core::SimError;
use crate::runtime::Simulation;

/// Validate `cfg` and wire a simulation from it.
///
/// # Errors
///
/// Returns `SimError::InvalidConfig` if validation fails.
pub fn build_simulation(cfg: &SimConfig) -> Result<Simulation, SimError> {
    cfg.validate().map_err(SimError::InvalidConfig)?;
    Ok(Simulation::new(cfg))
}

/// Load configuration from the environment (and `.env`), then build.
///
/// # Errors
///
/// Returns `SimError::InvalidConfig` if a variable fails to parse or the
/// resulting configuration is invalid.
pub fn build_from_env() -> Result<(SimConfig, Simulation), SimError> {
    let cfg = SimConfig::from_env().map_err(SimError::InvalidConfig)?;
    let simulation = build_simulation(&cfg)?;
    Ok((cfg, simulation))
}
