//! Event type definitions

mod category;
mod diagnostics;
mod editor;
mod file;
mod payload;
mod suggestion;
mod terminal;

pub use category::EventCategory;
pub use diagnostics::{Diagnostic, DiagnosticSeverity, DiagnosticsReport};
pub use editor::{EditorActivity, Position, TextRange};
pub use file::FileChange;
pub use payload::EventPayload;
pub use suggestion::{SuggestionOutcome, SuggestionVerdict};
pub use terminal::TerminalActivity;
