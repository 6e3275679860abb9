//! Common error type definitions.

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// Used as the source slot of [`Error`], so any underlying decode or
/// serialization failure can be attached without widening the public type.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Message returned to callers in place of any internal error detail.
const INTERNAL_PUBLIC_MESSAGE: &str = "internal server error";

/// Categories of errors that can occur while paginating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The request was malformed: bad page token, negative page size,
    /// unknown sort or filter field, malformed sort specification.
    InvalidInput,
    /// A server-side defect: token serialization failed, or a record type
    /// does not expose a field its own field map advertises.
    InternalError,
}

/// A structured error type for keyset operations.
#[derive(Debug, Error)]
#[error("{kind:?}{}", message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
#[must_use = "errors should be handled or propagated"]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional error message.
    pub message: Option<String>,
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

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Creates a new invalid input error.
    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput)
    }

    /// Creates a new internal error.
    pub fn internal_error() -> Self {
        Self::new(ErrorKind::InternalError)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    /// Returns whether the error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidInput)
    }

    /// Returns the message that may be shown to an external caller.
    ///
    /// Invalid input errors surface their own message. Internal errors
    /// always collapse to a fixed text so field and type names stay
    /// server-side.
    pub fn public_message(&self) -> &str {
        match self.kind {
            ErrorKind::InvalidInput => self.message.as_deref().unwrap_or("invalid input"),
            ErrorKind::InternalError => INTERNAL_PUBLIC_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let error = Error::invalid_input().with_message("bad sort");
        assert_eq!(error.to_string(), "InvalidInput: bad sort");

        let error = Error::internal_error();
        assert_eq!(error.to_string(), "InternalError");
    }

    #[test]
    fn kind_str_is_snake_case() {
        assert_eq!(Error::invalid_input().kind_str(), "invalid_input");
        assert_eq!(Error::internal_error().kind_str(), "internal_error");
    }

    #[test]
    fn internal_errors_do_not_leak() {
        let error = Error::internal_error().with_message("cannot sort by field \"secret\"");
        assert!(!error.is_client_error());
        assert_eq!(error.public_message(), "internal server error");
    }

    #[test]
    fn invalid_input_surfaces_message() {
        let error = Error::invalid_input().with_message("invalid page token");
        assert!(error.is_client_error());
        assert_eq!(error.public_message(), "invalid page token");
    }

    #[test]
    fn source_is_preserved() {
        let source = std::io::Error::other("boom");
        let error = Error::invalid_input().with_source(source);
        assert!(error.source().is_some());
    }
}
