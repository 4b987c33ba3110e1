//! Editor activity events

use serde::{Deserialize, Serialize};

/// Zero-based line/character position inside a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

/// Half-open range between two positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

/// Document, cursor and selection activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorActivity {
    /// Document URI
    pub uri: String,
    /// Cursor position, for cursor and pointer events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Active selection, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<TextRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_id: Option<String>,
    /// Document version after an edit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

impl EditorActivity {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            position: None,
            selection: None,
            language_id: None,
            version: None,
        }
    }

    pub fn at(mut self, line: u32, character: u32) -> Self {
        self.position = Some(Position::new(line, character));
        self
    }
}
