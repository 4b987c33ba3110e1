//! File system events

use serde::{Deserialize, Serialize};

/// A file created, changed, deleted or renamed on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Document URI (`file:///...`)
    pub uri: String,
    /// Previous URI for renames
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_uri: Option<String>,
    /// Size after the change, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Language identifier reported by the editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_id: Option<String>,
}

impl FileChange {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            previous_uri: None,
            size_bytes: None,
            language_id: None,
        }
    }
}
