//! Event categories derived from the hierarchical type string

use serde::{Deserialize, Serialize};

/// Top-level family of an event type (`fs.file.created` → `FileSystem`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventCategory {
    FileSystem,
    Editor,
    Diagnostics,
    Terminal,
    Suggestion,
    Other,
}

impl EventCategory {
    /// Classify an event type by its first dotted segment
    pub fn from_type(event_type: &str) -> Self {
        match event_type.split('.').next().unwrap_or_default() {
            "fs" => EventCategory::FileSystem,
            "editor" => EventCategory::Editor,
            "diagnostics" => EventCategory::Diagnostics,
            "terminal" => EventCategory::Terminal,
            "ai" => EventCategory::Suggestion,
            _ => EventCategory::Other,
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::FileSystem => write!(f, "fs"),
            EventCategory::Editor => write!(f, "editor"),
            EventCategory::Diagnostics => write!(f, "diagnostics"),
            EventCategory::Terminal => write!(f, "terminal"),
            EventCategory::Suggestion => write!(f, "ai"),
            EventCategory::Other => write!(f, "other"),
        }
    }
}
