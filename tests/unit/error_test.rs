//! Tests for error types

use prometheus_sched_sim::core::{ProcessId, SimError};

#[test]
fn test_invariant_violation_error() {
    let err = SimError::invariant("wait time negative");
    assert_eq!(format!("{}", err), "invariant violation: wait time negative");
}

#[test]
fn test_unknown_process_error() {
    let err = SimError::UnknownProcess(ProcessId(4));
    assert_eq!(format!("{}", err), "unknown process: P4");
}

#[test]
fn test_invalid_config_error() {
    let err = SimError::InvalidConfig("roster".to_string());
    assert_eq!(format!("{}", err), "invalid configuration: roster");
}

#[test]
fn test_thread_errors() {
    assert_eq!(
        format!("{}", SimError::ThreadPanicked("sched-engine")),
        "sched-engine thread panicked"
    );
    assert_eq!(
        format!("{}", SimError::JoinTimeout("sched-arrivals")),
        "sched-arrivals thread did not exit in time"
    );
    assert_eq!(format!("{}", SimError::Cancelled), "simulation cancelled");
}

#[test]
fn test_converts_into_anyhow() {
    let app: prometheus_sched_sim::core::AppResult<()> = Err(SimError::Cancelled.into());
    assert_eq!(app.unwrap_err().to_string(), "simulation cancelled");
}
