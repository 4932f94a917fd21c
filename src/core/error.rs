//! Error types for simulation components.

use thiserror::Error;

use crate::core::process::ProcessId;

/// Errors produced by simulation components.
#[derive(Debug, Error)]
pub enum SimError {
    /// A scheduling invariant did not hold; the run cannot continue.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    /// A process id was referenced that the registry does not hold.
    #[error("unknown process: {0}")]
    UnknownProcess(ProcessId),
    /// Configuration was rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A simulation thread could not be spawned.
    #[error("failed to spawn thread: {0}")]
    Spawn(String),
    /// A simulation thread panicked before returning.
    #[error("{0} thread panicked")]
    ThreadPanicked(&'static str),
    /// A simulation thread did not exit within the shutdown timeout and was detached.
    #[error("{0} thread did not exit in time")]
    JoinTimeout(&'static str),
    /// The run was cancelled before it reached quiescence.
    #[error("simulation cancelled")]
    Cancelled,
}

impl SimError {
    /// Build an invariant violation from any displayable context.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
