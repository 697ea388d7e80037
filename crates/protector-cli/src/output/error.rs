//! CLI error types and handling.

use std::process::ExitCode;

use colored::Colorize;
use protector_anonymize::AnonymizeError;

/// CLI error type.
#[derive(Debug)]
pub struct CliError {
    /// Error kind.
    pub kind: ErrorKind,
    /// Error message.
    pub message: String,
    /// Underlying cause.
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// Error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Configuration error.
    Config,
    /// Validation error, also used when `check` finds PII.
    Validation,
    /// IO error.
    Io,
    /// Output/formatting error.
    Output,
    /// Detection backend failure.
    Backend,
    /// Internal error.
    Internal,
}

impl CliError {
    /// Creates a new CLI error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a new CLI error with a cause.
    pub fn with_cause<E>(kind: ErrorKind, message: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            kind,
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Creates an output error.
    pub fn output(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Output, message)
    }

    /// Returns the numeric exit status for this error.
    pub fn exit_status(&self) -> u8 {
        match self.kind {
            ErrorKind::Config => 2,
            ErrorKind::Validation => 4,
            ErrorKind::Io => 5,
            ErrorKind::Output => 6,
            ErrorKind::Backend => 7,
            ErrorKind::Internal => 255,
        }
    }

    /// Returns the exit code for this error.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref cause) = self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(|e| e.as_ref() as _)
    }
}

impl From<AnonymizeError> for CliError {
    fn from(error: AnonymizeError) -> Self {
        let (kind, message) = match &error {
            AnonymizeError::InvalidPattern { .. } => (ErrorKind::Config, "Invalid pattern"),
            AnonymizeError::InvalidConfig(_) => (ErrorKind::Config, "Invalid engine configuration"),
            AnonymizeError::UnknownBackend(_) => (ErrorKind::Config, "Backend not available"),
            AnonymizeError::Backend { .. } => (ErrorKind::Backend, "Detection failed"),
            AnonymizeError::Io(_) => (ErrorKind::Io, "File access failed"),
            AnonymizeError::Serialization(_) => (ErrorKind::Output, "Report export failed"),
        };

        Self::with_cause(kind, message, error)
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        Self::with_cause(ErrorKind::Io, "IO error", error)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        Self::with_cause(ErrorKind::Output, "JSON error", error)
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(error: toml::ser::Error) -> Self {
        Self::with_cause(ErrorKind::Internal, "Failed to render configuration", error)
    }
}

impl From<config::ConfigError> for CliError {
    fn from(error: config::ConfigError) -> Self {
        Self::with_cause(ErrorKind::Config, "Configuration error", error)
    }
}

/// Prints an error to stderr.
pub fn print_error(error: &CliError) {
    let prefix = match error.kind {
        ErrorKind::Config => "Configuration error",
        ErrorKind::Validation => "Validation error",
        ErrorKind::Io => "IO error",
        ErrorKind::Output => "Output error",
        ErrorKind::Backend => "Backend error",
        ErrorKind::Internal => "Internal error",
    };

    eprintln!("{}: {}", prefix.red().bold(), error.message);

    if let Some(ref cause) = error.cause {
        eprintln!("  {}: {}", "Caused by".dimmed(), cause);
    }

    match error.kind {
        ErrorKind::Config => {
            eprintln!();
            eprintln!("{}", "Hint: Make sure your configuration is valid. Run:".dimmed());
            eprintln!("{}", "  protector config show".dimmed());
        }
        ErrorKind::Backend => {
            eprintln!();
            eprintln!("{}", "Hint: Retry, or run without the external backend:".dimmed());
            eprintln!("{}", "  export PROTECTOR_USE_EXTERNAL_BACKEND=false".dimmed());
        }
        _ => {}
    }
}
