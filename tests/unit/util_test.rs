//! Tests for utility functions

use std::time::Duration;

use prometheus_sched_sim::core::{ProcessId, ProcessState};
use prometheus_sched_sim::util::SimClock;

#[test]
fn test_clock_scales_units() {
    let clock = SimClock::from_millis(250);
    assert_eq!(clock.duration(2.0), Duration::from_millis(500));
    assert_eq!(clock.duration(0.5), Duration::from_millis(125));
}

#[test]
fn test_clock_zero_unit_disables_pacing() {
    let clock = SimClock::from_millis(0);
    assert_eq!(clock.duration(2.0), Duration::ZERO);
}

#[test]
fn test_clock_rejects_bad_input() {
    let clock = SimClock::default();
    assert_eq!(clock.duration(-1.0), Duration::ZERO);
    assert_eq!(clock.duration(f64::NAN), Duration::ZERO);
}

#[test]
fn test_process_id_display() {
    assert_eq!(ProcessId(12).to_string(), "P12");
}

#[test]
fn test_state_labels() {
    assert_eq!(ProcessState::New.to_string(), "New");
    assert_eq!(ProcessState::Terminated.to_string(), "Terminated");
    assert!(ProcessState::Terminated.is_terminal());
    assert!(!ProcessState::Blocked.is_terminal());
}
