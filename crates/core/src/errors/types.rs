//! Core error type definitions

use std::path::PathBuf;

/// Result type alias for pulse operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by event handlers; contained by the bus, never propagated.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Core error type for pulse operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// File system operations
    #[error("file system {operation} operation failed for '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// A priority value outside LOW/NORMAL/HIGH/CRITICAL
    #[error("unknown subscription priority '{value}'")]
    UnknownPriority { value: String },

    /// An event that cannot be accepted from a producer
    #[error("invalid event: {message}")]
    InvalidEvent { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a file system error with the failing path and operation
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Create an unknown priority error
    pub fn unknown_priority(value: impl ToString) -> Self {
        Error::UnknownPriority {
            value: value.to_string(),
        }
    }

    /// Create an invalid event error
    pub fn invalid_event(message: impl Into<String>) -> Self {
        Error::InvalidEvent {
            message: message.into(),
        }
    }
}
