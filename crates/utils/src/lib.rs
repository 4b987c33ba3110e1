//! Shared utilities for pulse
//!
//! Process-level helpers used by the binary and by integration tests.

pub mod tracing;

pub use self::tracing::{init, init_for_tests, replay_span};
