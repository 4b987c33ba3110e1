//! Event model shared by producers, the normalizer and the bus.
//!
//! Every signal coming out of the editor becomes an [`Event`]: a small
//! envelope (id, hierarchical type, timestamp, source, open metadata) around a
//! closed [`EventPayload`] union. Producers may leave `id`, `timestamp` and
//! `source` empty; the normalizer fills them in.
//!
//! ## Wire format
//!
//! Events round-trip through serde as flat JSON objects, the payload nested
//! under `payload` and tagged by `kind`:
//!
//! ```text
//! {"type":"editor.cursor.moved","source":"vscode","payload":{"kind":"editor","uri":"file:///a.ts","position":{"line":3,"character":7}}}
//! ```

pub mod types;
pub mod utils;

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use types::*;

/// Open string → value metadata map
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// A single normalized (or raw, pre-normalization) editor event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Opaque unique id; empty until assigned
    #[serde(default)]
    pub id: String,
    /// Hierarchical discriminant, e.g. `fs.file.created`
    #[serde(rename = "type")]
    pub event_type: String,
    /// Epoch milliseconds; zero until assigned
    #[serde(default)]
    pub timestamp: u64,
    /// Producer identifier; empty until assigned
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: Metadata,
    #[serde(default)]
    pub payload: EventPayload,
}

impl Event {
    /// Create a raw event with no id, timestamp or source
    pub fn new(event_type: impl Into<String>, payload: impl Into<EventPayload>) -> Self {
        Self {
            id: String::new(),
            event_type: event_type.into(),
            timestamp: 0,
            source: String::new(),
            metadata: Metadata::new(),
            payload: payload.into(),
        }
    }

    /// Parse a single JSON event, rejecting events without a type
    pub fn from_json(raw: &str) -> Result<Self> {
        let event: Event = serde_json::from_str(raw)?;
        if event.event_type.trim().is_empty() {
            return Err(Error::invalid_event("event type must not be empty"));
        }
        Ok(event)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn category(&self) -> EventCategory {
        EventCategory::from_type(&self.event_type)
    }

    pub fn uri(&self) -> Option<&str> {
        self.payload.uri()
    }

    pub fn position(&self) -> Option<Position> {
        self.payload.position()
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn has_timestamp(&self) -> bool {
        self.timestamp != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    #[test]
    fn test_deserialize_minimal_event() {
        let event: Event = serde_json::from_str(r#"{"type":"fs.file.created"}"#).unwrap();
        assert_eq!(event.event_type, FS_FILE_CREATED);
        assert!(!event.has_id());
        assert!(!event.has_timestamp());
        assert!(event.source.is_empty());
        assert_eq!(event.payload, EventPayload::Empty);
    }

    #[test]
    fn test_deserialize_tagged_payload() {
        let raw = r#"{
            "type": "editor.cursor.moved",
            "source": "vscode",
            "timestamp": 1700000000000,
            "payload": {"kind": "editor", "uri": "file:///a.ts", "position": {"line": 3, "character": 7}}
        }"#;
        let event: Event = serde_json::from_str(raw).unwrap();
        assert_eq!(event.category(), EventCategory::Editor);
        assert_eq!(event.uri(), Some("file:///a.ts"));
        assert_eq!(event.position(), Some(Position::new(3, 7)));
        assert_eq!(event.timestamp, 1_700_000_000_000);
    }

    #[test]
    fn test_from_json_rejects_blank_type() {
        let err = Event::from_json(r#"{"type":"  "}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidEvent { .. }));

        let err = Event::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Json { .. }));

        assert!(Event::from_json(r#"{"type":"fs.file.created"}"#).is_ok());
    }

    #[test]
    fn test_serialize_uses_type_key() {
        let event = Event::new(FS_FILE_DELETED, FileChange::new("file:///gone.rs"))
            .with_id("evt-1")
            .with_timestamp(42);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], FS_FILE_DELETED);
        assert_eq!(json["payload"]["kind"], "file");
        assert!(json.get("metadata").is_none());
    }

    #[test]
    fn test_category_from_type() {
        assert_eq!(EventCategory::from_type("fs.file.created"), EventCategory::FileSystem);
        assert_eq!(EventCategory::from_type("ai.suggestion.accepted"), EventCategory::Suggestion);
        assert_eq!(EventCategory::from_type("terminal"), EventCategory::Terminal);
        assert_eq!(EventCategory::from_type(""), EventCategory::Other);
        assert_eq!(EventCategory::from_type("git.commit"), EventCategory::Other);
    }

    #[test]
    fn test_payload_identity() {
        let terminal = EventPayload::Terminal(TerminalActivity {
            terminal_id: "term-2".to_string(),
            command: Some("cargo fmt".to_string()),
            cwd: None,
            exit_code: Some(0),
        });
        assert_eq!(terminal.handle(), Some("term-2"));
        assert_eq!(terminal.uri(), None);

        let custom = EventPayload::Custom {
            data: serde_json::json!({"anything": true}),
        };
        assert_eq!(custom.uri(), None);
        assert_eq!(custom.position(), None);
        assert_eq!(custom.handle(), None);
    }
}
