//! Context helpers for `Result`s converging on [`Error`]

use super::types::{Error, Result};

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Prefix the error with `message`, keeping its variant
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Like [`ResultExt::context`], building the message only on failure
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().prefixed(&message.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().prefixed(&f()))
    }
}

impl Error {
    /// Rewrite the human-readable part of the error as `{context}: {original}`.
    ///
    /// An unknown priority carries only the rejected value, so it becomes a
    /// configuration error describing where the value came from.
    pub fn prefixed(self, context: &str) -> Self {
        match self {
            Error::Configuration { message } => Error::Configuration {
                message: format!("{context}: {message}"),
            },
            Error::Json { message, source } => Error::Json {
                message: format!("{context}: {message}"),
                source,
            },
            Error::FileSystem {
                path,
                operation,
                source,
            } => Error::FileSystem {
                path,
                operation: format!("{context}: {operation}"),
                source,
            },
            Error::InvalidEvent { message } => Error::InvalidEvent {
                message: format!("{context}: {message}"),
            },
            unknown @ Error::UnknownPriority { .. } => Error::Configuration {
                message: format!("{context}: {unknown}"),
            },
        }
    }
}
