//! Core domain types, errors, and constants for the `pulse` event core.
//!
//! This crate establishes the data structures shared by the bus, the
//! normalizer and their collaborators.
//!
//! ## Key Components
//!
//! - **`events`**: the [`Event`] record and its closed [`EventPayload`] union,
//!   one variant per producer category (file system, editor, diagnostics,
//!   terminal, AI suggestions).
//! - **`sink`**: the [`BatchSink`] seam through which the normalizer hands
//!   batches to whatever sits downstream, without depending on it.
//! - **`errors`**: the primary `Error` enum and `Result` alias.
//! - **`constants`**: well-known event types, metadata keys and environment
//!   variable names.

pub mod constants;
pub mod errors;
pub mod events;
pub mod sink;
pub mod time;

pub use self::{
    errors::{Error, HandlerError, Result, ResultExt},
    events::{
        Diagnostic, DiagnosticSeverity, DiagnosticsReport, EditorActivity, Event, EventCategory,
        EventPayload, FileChange, Metadata, Position, SuggestionOutcome, SuggestionVerdict,
        TerminalActivity, TextRange,
    },
    sink::BatchSink,
    time::now_millis,
};
