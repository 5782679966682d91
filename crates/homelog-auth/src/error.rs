//! Access control error types and utilities.
//!
//! Every fallible operation in this crate returns [`Error`], a structured error
//! carrying an [`ErrorKind`] for pattern matching, a human-readable message and
//! an optional source. Permission checks never produce an [`Error`]: absence of
//! permission is a plain `false`.

use std::borrow::Cow;
use std::error::Error as StdError;

use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Type alias for boxed errors that are Send + Sync.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for access control operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur while loading or holding access state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The backend was unreachable or answered with a failure.
    Fetch,
    /// A principal query named both or neither of user and role.
    InvalidPrincipal,
    /// A token was corrupt, unverifiable or already expired.
    TokenDecode,
    /// The access level catalog violated its invariants.
    InvalidCatalog,
    /// Persisted token state could not be read or written.
    Storage,
    /// Configuration values were rejected.
    Config,
    /// Internal failure, such as a missing async runtime.
    Internal,
}

impl ErrorKind {
    /// Returns true if the caller should treat this error as "no session".
    #[must_use]
    pub const fn is_anonymous(self) -> bool {
        matches!(self, Self::TokenDecode)
    }
}

/// Access control error with structured information.
#[must_use]
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct Error {
    /// The error category.
    kind: ErrorKind,
    /// Human-readable error message.
    message: Cow<'static, str>,
    /// Additional context, e.g. the endpoint or storage key involved.
    context: Option<Cow<'static, str>>,
    /// Optional underlying error that caused this error.
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    /// Creates a new [`Error`].
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: None,
            source: None,
        }
    }

    /// Attaches a source error to this error.
    #[inline]
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches additional context to this error.
    #[inline]
    pub fn with_context(mut self, context: impl Into<Cow<'static, str>>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Returns the error kind.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the attached context, if any.
    #[must_use]
    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Creates a new fetch error.
    #[inline]
    pub fn fetch(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Fetch, message)
    }

    /// Creates a new invalid principal error.
    #[inline]
    pub fn invalid_principal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidPrincipal, message)
    }

    /// Creates a new token decode error.
    #[inline]
    pub fn token_decode(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::TokenDecode, message)
    }

    /// Creates a new invalid catalog error.
    #[inline]
    pub fn invalid_catalog(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidCatalog, message)
    }

    /// Creates a new storage error.
    #[inline]
    pub fn storage(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Creates a new configuration error.
    #[inline]
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Creates a new internal error.
    #[inline]
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::storage("I/O operation failed").with_source(error)
    }
}
