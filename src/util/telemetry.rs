//! Log output for simulation runs.

/// Install a fmt subscriber filtered by `RUST_LOG`, tagging each line with
/// the emitting thread (`sched-arrivals`, `sched-engine`, consumers).
///
/// Does nothing when the host application already set a subscriber, so
/// embedding code keeps control of its own output. Per-process dispatch
/// lines are logged at `info`; registry waits and publications at `debug`.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_thread_names(true)
        .try_init();
}
