//! Common error type definitions.

use std::borrow::Cow;

use strum::{AsRefStr, Display, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// Handlers report failures through this type, and storage or queue
/// backends wrap their native errors in it as the [`Error`] source.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur in hookwire-core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Input validation failed.
    InvalidInput,
    /// A requested record does not exist.
    NotFound,
    /// The record is not in a state that allows the operation.
    Conflict,
    /// A handler name was registered twice.
    DuplicateHandler,
    /// The persistent store failed.
    Storage,
    /// The job substrate failed.
    Queue,
    /// Internal error.
    Internal,
}

impl ErrorKind {
    /// Returns `true` for kinds that a retry of the same operation may resolve.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Storage | Self::Queue)
    }
}

/// A structured error type for hookwire-core operations.
#[must_use]
#[derive(Debug, Error)]
#[error("[{kind}]{}", .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional error message.
    pub message: Option<Cow<'static, str>>,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Creates a new error from a source error.
    pub fn from_source(kind: ErrorKind, source: impl Into<BoxedError>) -> Self {
        Self {
            kind,
            message: None,
            source: Some(source.into()),
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Creates a new invalid input error.
    pub fn invalid_input(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidInput).with_message(message)
    }

    /// Creates a new not found error.
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound).with_message(message)
    }

    /// Creates a new conflict error.
    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Conflict).with_message(message)
    }

    /// Creates a new storage error wrapping the backend failure.
    pub fn storage(source: impl Into<BoxedError>) -> Self {
        Self::from_source(ErrorKind::Storage, source)
    }

    /// Creates a new queue error wrapping the substrate failure.
    pub fn queue(source: impl Into<BoxedError>) -> Self {
        Self::from_source(ErrorKind::Queue, source)
    }

    /// Creates a new internal error.
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Internal).with_message(message)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::from_source(ErrorKind::Internal, error).with_message("JSON (de)serialization failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = Error::not_found("delivery 42 not found");
        assert_eq!(error.to_string(), "[not_found]: delivery 42 not found");

        let error = Error::new(ErrorKind::Storage);
        assert_eq!(error.to_string(), "[storage]");
    }

    #[test]
    fn test_error_source() {
        let io = std::io::Error::other("connection reset");
        let error = Error::storage(io).with_message("failed to load subscription");

        assert_eq!(error.kind(), ErrorKind::Storage);
        assert_eq!(error.message(), Some("failed to load subscription"));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_transient_kinds() {
        assert!(ErrorKind::Storage.is_transient());
        assert!(ErrorKind::Queue.is_transient());
        assert!(!ErrorKind::NotFound.is_transient());
        assert!(!ErrorKind::DuplicateHandler.is_transient());
    }
}
