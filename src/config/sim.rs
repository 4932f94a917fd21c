//! Simulation configuration structures.

use std::collections::HashSet;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::infra::snapshot::{Column, ColumnLayout};
use crate::util::clock::SimClock;

/// Prefix of every environment variable read by [`SimConfig::from_env`].
pub const ENV_PREFIX: &str = "SCHED_SIM_";

/// Inclusive range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds<T> {
    /// Lower bound (inclusive).
    pub min: T,
    /// Upper bound (inclusive).
    pub max: T,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    /// Range `[min, max]`.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within the range.
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    fn check(&self, name: &str) -> Result<(), String>
    where
        T: Display,
    {
        if self.min > self.max {
            return Err(format!("{name}: min {} exceeds max {}", self.min, self.max));
        }
        Ok(())
    }
}

/// Root simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of processes the generator creates.
    pub roster_size: u32,
    /// Burst (execution time) range.
    pub burst: Bounds<u64>,
    /// Priority range; lower dispatches first.
    pub priority: Bounds<u8>,
    /// Increment added to the previous arrival time.
    pub arrival_increment: Bounds<u64>,
    /// Generator suspension between insertions, in simulated units.
    pub inter_arrival_delay: Bounds<f64>,
    /// Probability a dispatched process passes through `Blocked`.
    pub block_probability: f64,
    /// Time spent in `Blocked`, in simulated units.
    pub blocked_delay: f64,
    /// Engine suspension after each published snapshot, in simulated units.
    pub pacing_delay: f64,
    /// Consumer poll cadence, in simulated units.
    pub poll_interval: f64,
    /// Wall-clock milliseconds per simulated unit; 0 disables pacing.
    pub time_unit_ms: u64,
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Column order of the table view.
    pub columns: ColumnLayout,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            roster_size: 9,
            burst: Bounds::new(2, 10),
            priority: Bounds::new(1, 4),
            arrival_increment: Bounds::new(1, 3),
            inter_arrival_delay: Bounds::new(1.0, 2.0),
            block_probability: 0.3,
            blocked_delay: 2.0,
            pacing_delay: 2.0,
            poll_interval: 1.0,
            time_unit_ms: 1000,
            seed: None,
            columns: ColumnLayout::default(),
        }
    }
}

impl SimConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        self.burst.check("burst")?;
        if self.burst.min == 0 {
            return Err("burst.min must be greater than 0".into());
        }
        self.priority.check("priority")?;
        self.arrival_increment.check("arrival_increment")?;
        self.inter_arrival_delay.check("inter_arrival_delay")?;
        if !(self.inter_arrival_delay.min.is_finite() && self.inter_arrival_delay.max.is_finite())
            || self.inter_arrival_delay.min < 0.0
        {
            return Err("inter_arrival_delay must be finite and non-negative".into());
        }
        if !(0.0..=1.0).contains(&self.block_probability) {
            return Err("block_probability must be within [0, 1]".into());
        }
        for (name, value) in [
            ("blocked_delay", self.blocked_delay),
            ("pacing_delay", self.pacing_delay),
            ("poll_interval", self.poll_interval),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be finite and non-negative"));
            }
        }
        self.columns.validate()
    }

    /// Parse configuration from a JSON string and validate. Missing fields
    /// take their defaults.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults overridden by `SCHED_SIM_*` environment variables, after
    /// loading a `.env` file if one is present.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each
    /// `SCHED_SIM_*` key, then validated.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        override_from(&get, "ROSTER_SIZE", &mut cfg.roster_size)?;
        override_from(&get, "BURST_MIN", &mut cfg.burst.min)?;
        override_from(&get, "BURST_MAX", &mut cfg.burst.max)?;
        override_from(&get, "PRIORITY_MIN", &mut cfg.priority.min)?;
        override_from(&get, "PRIORITY_MAX", &mut cfg.priority.max)?;
        override_from(&get, "ARRIVAL_INCREMENT_MIN", &mut cfg.arrival_increment.min)?;
        override_from(&get, "ARRIVAL_INCREMENT_MAX", &mut cfg.arrival_increment.max)?;
        override_from(&get, "INTER_ARRIVAL_MIN", &mut cfg.inter_arrival_delay.min)?;
        override_from(&get, "INTER_ARRIVAL_MAX", &mut cfg.inter_arrival_delay.max)?;
        override_from(&get, "BLOCK_PROBABILITY", &mut cfg.block_probability)?;
        override_from(&get, "BLOCKED_DELAY", &mut cfg.blocked_delay)?;
        override_from(&get, "PACING_DELAY", &mut cfg.pacing_delay)?;
        override_from(&get, "POLL_INTERVAL", &mut cfg.poll_interval)?;
        override_from(&get, "TIME_UNIT_MS", &mut cfg.time_unit_ms)?;
        if let Some(raw) = get("SEED") {
            cfg.seed = Some(parse_var("SEED", &raw)?);
        }
        if let Some(raw) = get("COLUMNS") {
            cfg.columns = raw.parse()?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Clock derived from `time_unit_ms`.
    #[must_use]
    pub const fn clock(&self) -> SimClock {
        SimClock::from_millis(self.time_unit_ms)
    }
}

fn override_from<G, T>(get: &G, name: &str, slot: &mut T) -> Result<(), String>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    if let Some(raw) = get(name) {
        *slot = parse_var(name, &raw)?;
    }
    Ok(())
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| format!("{ENV_PREFIX}{name}={raw:?}: {e}"))
}

impl ColumnLayout {
    /// Validate that the layout is non-empty and has no repeated column.
    pub fn validate(&self) -> Result<(), String> {
        if self.columns().is_empty() {
            return Err("columns must not be empty".into());
        }
        let mut seen = HashSet::new();
        for column in self.columns() {
            if !seen.insert(*column) {
                return Err(format!("column `{}` listed twice", column.key()));
            }
        }
        Ok(())
    }
}

impl FromStr for ColumnLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let columns = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Column::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        let layout = Self::new(columns);
        layout.validate()?;
        Ok(layout)
    }
}
