//! Anonymization error types.

use thiserror::Error;

/// Anonymization result type.
pub type AnonymizeResult<T> = Result<T, AnonymizeError>;

/// Anonymization errors.
#[derive(Error, Debug)]
pub enum AnonymizeError {
    /// A detection pattern failed to compile or carried an invalid confidence.
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern source.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The external detection backend failed or returned unusable output.
    #[error("Detection backend '{backend}' failed: {message}")]
    Backend {
        /// Backend name.
        backend: String,
        /// Failure description.
        message: String,
    },

    /// No backend is registered under the requested selector.
    #[error("Unknown detection backend: {0}")]
    UnknownBackend(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Report serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AnonymizeError {
    /// Creates a pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Creates a backend error.
    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Returns the error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPattern { .. } => "ANON_INVALID_PATTERN",
            Self::Backend { .. } => "ANON_BACKEND_ERROR",
            Self::UnknownBackend(_) => "ANON_UNKNOWN_BACKEND",
            Self::InvalidConfig(_) => "ANON_INVALID_CONFIG",
            Self::Io(_) => "ANON_IO_ERROR",
            Self::Serialization(_) => "ANON_SERIALIZATION_ERROR",
        }
    }

    /// Returns true if the error is recoverable.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Backend { .. } | Self::Io(_))
    }
}

impl From<regex::Error> for AnonymizeError {
    fn from(e: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: String::new(),
            reason: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for AnonymizeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for AnonymizeError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
