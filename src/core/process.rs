//! Process model: identity, lifecycle state and derived scheduling metrics.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::SimError;

/// Stable process identifier, rendered as `P<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(pub u32);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Lifecycle state of a simulated process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Created, waiting to be dispatched.
    New,
    /// Selected by the engine; timings are fixed.
    Running,
    /// Transiently blocked; always resolves to `Terminated`.
    Blocked,
    /// Finished.
    Terminated,
}

impl ProcessState {
    /// Whether the lifecycle allows moving from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::New, Self::Running)
                | (Self::Running, Self::Blocked | Self::Terminated)
                | (Self::Blocked, Self::Terminated)
        )
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Terminated)
    }

    /// Display label used by the table view.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Running => "Running",
            Self::Blocked => "Blocked",
            Self::Terminated => "Terminated",
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scheduling metrics fixed when a process is first dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timings {
    /// Simulated time the process started executing.
    pub start_time: u64,
    /// Simulated time the process finished executing.
    pub finish_time: u64,
    /// `finish_time - arrival_time`.
    pub turnaround_time: u64,
    /// `turnaround_time - burst`.
    pub wait_time: u64,
}

impl Timings {
    /// Compute timings for a process dispatched when the simulated clock reads `now`.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvariantViolation` if any derived value would be
    /// negative or overflow.
    pub fn compute(now: u64, arrival_time: u64, burst: u64) -> Result<Self, SimError> {
        let start_time = now.max(arrival_time);
        let finish_time = start_time
            .checked_add(burst)
            .ok_or_else(|| SimError::invariant("finish time overflows"))?;
        let turnaround_time = finish_time.checked_sub(arrival_time).ok_or_else(|| {
            SimError::invariant(format!(
                "finish time {finish_time} precedes arrival {arrival_time}"
            ))
        })?;
        let wait_time = turnaround_time.checked_sub(burst).ok_or_else(|| {
            SimError::invariant(format!(
                "turnaround {turnaround_time} shorter than burst {burst}"
            ))
        })?;
        Ok(Self {
            start_time,
            finish_time,
            turnaround_time,
            wait_time,
        })
    }
}

/// A simulated unit of work.
///
/// Serialize-only: a `Process` is built with [`Process::new`] and advanced
/// through [`Process::dispatch`] and [`Process::transition`], never decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Process {
    id: ProcessId,
    arrival_time: u64,
    burst: u64,
    priority: u8,
    state: ProcessState,
    timings: Option<Timings>,
}

impl Process {
    /// Create a process in state `New`.
    #[must_use]
    pub const fn new(id: ProcessId, arrival_time: u64, burst: u64, priority: u8) -> Self {
        Self {
            id,
            arrival_time,
            burst,
            priority,
            state: ProcessState::New,
            timings: None,
        }
    }

    /// Process identifier.
    #[must_use]
    pub const fn id(&self) -> ProcessId {
        self.id
    }

    /// Simulated arrival time.
    #[must_use]
    pub const fn arrival_time(&self) -> u64 {
        self.arrival_time
    }

    /// Total simulated execution time.
    #[must_use]
    pub const fn burst(&self) -> u64 {
        self.burst
    }

    /// Scheduling priority; lower dispatches first.
    #[must_use]
    pub const fn priority(&self) -> u8 {
        self.priority
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ProcessState {
        self.state
    }

    /// Derived timings, present once the process has been dispatched.
    #[must_use]
    pub const fn timings(&self) -> Option<Timings> {
        self.timings
    }

    /// Dispatch the process at simulated time `now`: fixes its timings and
    /// moves it to `Running`. Returns the computed timings.
    ///
    /// # Errors
    ///
    /// Fails if the process is not `New`, timings were already set, or the
    /// derived values break an invariant.
    pub fn dispatch(&mut self, now: u64) -> Result<Timings, SimError> {
        if self.timings.is_some() {
            return Err(SimError::invariant(format!(
                "{} dispatched twice",
                self.id
            )));
        }
        let timings = Timings::compute(now, self.arrival_time, self.burst)?;
        self.transition(ProcessState::Running)?;
        self.timings = Some(timings);
        Ok(timings)
    }

    /// Move to `next`, enforcing the lifecycle.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvariantViolation` for a transition the lifecycle
    /// does not allow.
    pub fn transition(&mut self, next: ProcessState) -> Result<(), SimError> {
        if !self.state.can_transition_to(next) {
            return Err(SimError::invariant(format!(
                "{}: illegal transition {} -> {}",
                self.id, self.state, next
            )));
        }
        self.state = next;
        Ok(())
    }
}
