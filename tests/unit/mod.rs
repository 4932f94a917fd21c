//! Unit tests for individual components

mod error_test;
mod snapshot_test;
mod util_test;
