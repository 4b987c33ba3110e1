//! Process entry point for the pulse event core: owns configuration,
//! tracing, and the lifecycle of the normalizer and bus.

pub mod commands;
pub mod console;
mod execute;

pub use commands::{Commands, SummaryFormat};
pub use console::{ConsoleSubscriber, ConsoleVerbosity};
