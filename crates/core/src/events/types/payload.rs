//! Variant payload carried by every event

use super::{
    DiagnosticsReport, EditorActivity, FileChange, Position, SuggestionOutcome, TerminalActivity,
};
use serde::{Deserialize, Serialize};

/// Closed union of producer payloads, tagged by `kind` on the wire
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    /// No variant-specific fields
    #[default]
    Empty,
    File(FileChange),
    Editor(EditorActivity),
    Diagnostics(DiagnosticsReport),
    Terminal(TerminalActivity),
    Suggestion(SuggestionOutcome),
    /// Producer-defined data the core does not interpret
    Custom {
        #[serde(default)]
        data: serde_json::Value,
    },
}

impl EventPayload {
    /// Document the payload refers to, if any
    pub fn uri(&self) -> Option<&str> {
        match self {
            EventPayload::File(file) => Some(&file.uri),
            EventPayload::Editor(editor) => Some(&editor.uri),
            EventPayload::Diagnostics(report) => Some(&report.uri),
            EventPayload::Suggestion(outcome) => outcome.uri.as_deref(),
            EventPayload::Terminal(_) | EventPayload::Empty | EventPayload::Custom { .. } => None,
        }
    }

    /// Cursor or suggestion position, if any
    pub fn position(&self) -> Option<Position> {
        match self {
            EventPayload::Editor(editor) => editor.position,
            EventPayload::Suggestion(outcome) => outcome.position,
            _ => None,
        }
    }

    /// Identity that is neither a document nor a position (terminal, suggestion)
    pub fn handle(&self) -> Option<&str> {
        match self {
            EventPayload::Terminal(terminal) => Some(&terminal.terminal_id),
            EventPayload::Suggestion(outcome) => Some(&outcome.suggestion_id),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EventPayload::Empty => "empty",
            EventPayload::File(_) => "file",
            EventPayload::Editor(_) => "editor",
            EventPayload::Diagnostics(_) => "diagnostics",
            EventPayload::Terminal(_) => "terminal",
            EventPayload::Suggestion(_) => "suggestion",
            EventPayload::Custom { .. } => "custom",
        }
    }
}

impl From<FileChange> for EventPayload {
    fn from(value: FileChange) -> Self {
        EventPayload::File(value)
    }
}

impl From<EditorActivity> for EventPayload {
    fn from(value: EditorActivity) -> Self {
        EventPayload::Editor(value)
    }
}

impl From<DiagnosticsReport> for EventPayload {
    fn from(value: DiagnosticsReport) -> Self {
        EventPayload::Diagnostics(value)
    }
}

impl From<TerminalActivity> for EventPayload {
    fn from(value: TerminalActivity) -> Self {
        EventPayload::Terminal(value)
    }
}

impl From<SuggestionOutcome> for EventPayload {
    fn from(value: SuggestionOutcome) -> Self {
        EventPayload::Suggestion(value)
    }
}
