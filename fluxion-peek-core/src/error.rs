// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error model shared by every signal of the peek protocol.
//!
//! A [`FluxionError`] is a plain value: a closed [`ErrorKind`], a message, an
//! optional boxed cause and an ordered list of suppressed secondary errors.
//! Chaining is therefore explicit and reproducible instead of depending on a
//! runtime's built-in suppression machinery.
//!
//! # Examples
//!
//! ```
//! use fluxion_peek_core::{ErrorKind, FluxionError};
//!
//! let original = FluxionError::illegal_argument("fromOnNext");
//! let replacement = FluxionError::illegal_state("fromOnError")
//!     .with_cause(original.clone())
//!     .with_suppressed(original.clone());
//!
//! assert_eq!(replacement.kind(), ErrorKind::IllegalState);
//! assert_eq!(replacement.cause(), Some(&original));
//! assert_eq!(replacement.suppressed(), &[original]);
//! ```

use core::fmt;

/// Closed classification of every error the protocol can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A caller passed an argument the operation cannot accept.
    IllegalArgument,
    /// An operation was attempted in a state that forbids it.
    IllegalState,
    /// A publisher was constructed without a source.
    NullSource,
    /// Generic runtime failure raised by user code or a producer.
    Runtime,
    /// Error signalled by a stream producer.
    Stream,
    /// Error marked to escape the pipeline instead of terminating it.
    Bubbling,
    /// Allocation failure.
    OutOfMemory,
    /// Stack exhaustion.
    StackOverflow,
    /// Failure to resolve or link code.
    Linkage,
    /// Failure of code verification.
    Verification,
}

impl ErrorKind {
    /// Returns `true` for unrecoverable conditions that must never be caught,
    /// wrapped or chained.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(
            self,
            Self::OutOfMemory | Self::StackOverflow | Self::Linkage | Self::Verification
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::IllegalArgument => "Illegal argument",
            Self::IllegalState => "Illegal state",
            Self::NullSource => "Null source",
            Self::Runtime => "Runtime error",
            Self::Stream => "Stream processing error",
            Self::Bubbling => "Bubbling error",
            Self::OutOfMemory => "Out of memory",
            Self::StackOverflow => "Stack overflow",
            Self::Linkage => "Linkage error",
            Self::Verification => "Verification error",
        };
        f.write_str(name)
    }
}

/// Root error type for all Fluxion peek operations.
///
/// The `cause` forms a chain readable through [`std::error::Error::source`];
/// `suppressed` records secondary errors that accompanied this one without
/// replacing it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FluxionError {
    kind: ErrorKind,
    message: String,
    #[source]
    cause: Option<Box<FluxionError>>,
    suppressed: Vec<FluxionError>,
}

impl FluxionError {
    /// Create an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
            suppressed: Vec::new(),
        }
    }

    /// Create an [`ErrorKind::IllegalArgument`] error
    pub fn illegal_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IllegalArgument, message)
    }

    /// Create an [`ErrorKind::IllegalState`] error
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IllegalState, message)
    }

    /// Create an [`ErrorKind::Runtime`] error
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Runtime, message)
    }

    /// Create a stream processing error with the given context
    pub fn stream_error(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Stream, context)
    }

    /// Create the error reported when a publisher is built without a source.
    pub fn null_source() -> Self {
        Self::new(ErrorKind::NullSource, "source publisher must not be null")
    }

    /// Wrap an arbitrary user error as a runtime error, keeping its message.
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::runtime(error.to_string())
    }

    /// Mark `error` as escaping: operators rethrow it to their caller instead
    /// of turning it into a terminal signal.
    ///
    /// Bubbling an already bubbling error returns it unchanged.
    #[must_use]
    pub fn bubble(error: FluxionError) -> Self {
        if error.is_bubbling() {
            return error;
        }
        let message = error.message.clone();
        Self::new(ErrorKind::Bubbling, message).with_cause(error)
    }

    /// Set the cause of this error, replacing any previous cause.
    #[must_use]
    pub fn with_cause(mut self, cause: FluxionError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Append `other` to the suppressed list.
    ///
    /// Errors are values without identity, so an error equal to `self` counts
    /// as the same error and is not appended. A callback that rethrows a copy
    /// of the error it received therefore leaves the suppressed list
    /// unchanged.
    #[must_use]
    pub fn with_suppressed(mut self, other: FluxionError) -> Self {
        if other != self {
            self.suppressed.push(other);
        }
        self
    }

    /// The classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The message without the kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The direct cause, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&FluxionError> {
        self.cause.as_deref()
    }

    /// Secondary errors recorded alongside this one, in insertion order.
    #[must_use]
    pub fn suppressed(&self) -> &[FluxionError] {
        &self.suppressed
    }

    /// Returns `true` if this error is fatal (see [`ErrorKind::is_fatal`]).
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    /// Returns `true` if this error was marked with [`FluxionError::bubble`].
    #[must_use]
    pub const fn is_bubbling(&self) -> bool {
        matches!(self.kind, ErrorKind::Bubbling)
    }

    /// Returns `true` if this error must be rethrown to the caller rather than
    /// delivered downstream: it is either fatal or bubbling.
    #[must_use]
    pub const fn is_escaping(&self) -> bool {
        self.is_fatal() || self.is_bubbling()
    }

    /// Pass recoverable errors through and reject escaping ones.
    ///
    /// # Errors
    /// Returns `Err(self)` when [`is_escaping`](Self::is_escaping) holds, so the
    /// caller can rethrow it with `?`.
    pub fn ensure_recoverable(self) -> Result<Self> {
        if self.is_escaping() {
            Err(self)
        } else {
            Ok(self)
        }
    }

    /// Strip a bubbling wrapper and return the error it carries.
    ///
    /// Any other error is returned unchanged.
    #[must_use]
    pub fn unwrap_bubble(self) -> Self {
        match (self.kind, self.cause) {
            (ErrorKind::Bubbling, Some(cause)) => *cause,
            (kind, cause) => Self {
                kind,
                message: self.message,
                cause,
                suppressed: self.suppressed,
            },
        }
    }
}

/// Specialized Result type for Fluxion peek operations
pub type Result<T> = std::result::Result<T, FluxionError>;
