//! Process registry: the only shared mutable state of a simulation.
//!
//! Every read used for scheduling and every mutation happens under a single
//! `parking_lot::Mutex`. Callers receive copies; the live collection is
//! never exposed. A `Condvar` paired with a generation counter lets an idle
//! engine sleep until the registry changes instead of spinning.

use std::collections::HashSet;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::core::process::{Process, ProcessId, ProcessState};
use crate::core::SimError;

struct Entry {
    /// Insertion sequence; final tie-breaker of the scheduling order.
    seq: u64,
    process: Process,
}

struct RegistryState {
    entries: Vec<Entry>,
    ids: HashSet<ProcessId>,
    next_seq: u64,
    /// Bumped on every append, update and seal.
    generation: u64,
    /// No further appends will arrive.
    sealed: bool,
}

/// Priority-ordered copy of the registry taken under one lock acquisition.
#[derive(Debug, Clone)]
pub struct SortedView {
    /// Processes ordered by `(priority, arrival_time, insertion order)`.
    pub processes: Vec<Process>,
    /// Registry generation at the time of the copy.
    pub generation: u64,
    /// Whether the roster was complete at the time of the copy.
    pub sealed: bool,
}

/// Shared, lock-guarded set of all processes known to a run.
pub struct ProcessRegistry {
    state: Mutex<RegistryState>,
    changed: Condvar,
}

impl Default for ProcessRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRegistry {
    /// Create an empty, unsealed registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                entries: Vec::new(),
                ids: HashSet::new(),
                next_seq: 0,
                generation: 0,
                sealed: false,
            }),
            changed: Condvar::new(),
        }
    }

    /// Insert a new process.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvariantViolation` if the id is already present or
    /// the registry has been sealed.
    pub fn append(&self, process: Process) -> Result<(), SimError> {
        let mut state = self.state.lock();
        if state.sealed {
            return Err(SimError::invariant(format!(
                "append of {} after registry was sealed",
                process.id()
            )));
        }
        if !state.ids.insert(process.id()) {
            return Err(SimError::invariant(format!(
                "duplicate process id {}",
                process.id()
            )));
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.entries.push(Entry { seq, process });
        state.generation += 1;
        drop(state);
        self.changed.notify_all();
        Ok(())
    }

    /// Copy every process and sort by `(priority, arrival_time, insertion order)`.
    #[must_use]
    pub fn snapshot_and_sort(&self) -> Vec<Process> {
        self.sorted_view().processes
    }

    /// Same ordering as [`snapshot_and_sort`](Self::snapshot_and_sort), plus
    /// the generation and seal flag observed under the same lock.
    #[must_use]
    pub fn sorted_view(&self) -> SortedView {
        let state = self.state.lock();
        let mut keyed: Vec<(u8, u64, u64, &Process)> = state
            .entries
            .iter()
            .map(|e| (e.process.priority(), e.process.arrival_time(), e.seq, &e.process))
            .collect();
        // seq is unique, so the key is a strict total order.
        keyed.sort_unstable_by_key(|&(priority, arrival, seq, _)| (priority, arrival, seq));
        SortedView {
            processes: keyed.into_iter().map(|(_, _, _, p)| p.clone()).collect(),
            generation: state.generation,
            sealed: state.sealed,
        }
    }

    /// Insertion-ordered copy, used for final reporting.
    #[must_use]
    pub fn processes(&self) -> Vec<Process> {
        self.state
            .lock()
            .entries
            .iter()
            .map(|e| e.process.clone())
            .collect()
    }

    /// Mutate a single process under the lock.
    ///
    /// `f` must not sleep; it runs inside the critical section.
    ///
    /// # Errors
    ///
    /// Returns `SimError::UnknownProcess` for an id not in the registry, or
    /// whatever error `f` produces.
    pub fn update<F, R>(&self, id: ProcessId, f: F) -> Result<R, SimError>
    where
        F: FnOnce(&mut Process) -> Result<R, SimError>,
    {
        let mut state = self.state.lock();
        let entry = state
            .entries
            .iter_mut()
            .find(|e| e.process.id() == id)
            .ok_or(SimError::UnknownProcess(id))?;
        let out = f(&mut entry.process)?;
        state.generation += 1;
        drop(state);
        self.changed.notify_all();
        Ok(out)
    }

    /// Mark the roster as complete. Idempotent.
    pub fn seal(&self) {
        let mut state = self.state.lock();
        if state.sealed {
            return;
        }
        state.sealed = true;
        state.generation += 1;
        drop(state);
        self.changed.notify_all();
    }

    /// Whether the roster is complete.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.state.lock().sealed
    }

    /// Sealed, and no process can make further progress.
    #[must_use]
    pub fn is_quiescent(&self) -> bool {
        let state = self.state.lock();
        state.sealed && state.entries.iter().all(|e| e.process.state().is_terminal())
    }

    /// Number of processes in `state`.
    #[must_use]
    pub fn count_in(&self, state: ProcessState) -> usize {
        self.state
            .lock()
            .entries
            .iter()
            .filter(|e| e.process.state() == state)
            .count()
    }

    /// Number of processes ever appended.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Whether nothing has been appended yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Block until the generation moves past `seen` or `timeout` elapses.
    /// Returns `true` if a change was observed.
    pub fn wait_for_change(&self, seen: u64, timeout: Duration) -> bool {
        let mut state = self.state.lock();
        if state.generation != seen {
            return true;
        }
        // Spurious wakeups just return early; callers loop anyway.
        let _ = self.changed.wait_for(&mut state, timeout);
        state.generation != seen
    }
}
