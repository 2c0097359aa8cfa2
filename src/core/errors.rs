//! Error types for the plagiscan library.
//!
//! The similarity core (normalization, fingerprinting, scoring) is total and
//! never produces these errors. They are raised by the collaborators around
//! it: the content store, the submission ledger, configuration loading and
//! the orchestration layer that validates requests before the core runs.

use std::io;
use std::str::Utf8Error;
use std::string::FromUtf8Error;

use thiserror::Error;

/// Main result type for plagiscan operations.
pub type Result<T> = std::result::Result<T, PlagiarismError>;

/// Coarse classification used by boundary layers to pick a user-facing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced file, submission or report does not exist.
    NotFound,
    /// A collaborator could not deliver usable content or metadata.
    UpstreamFailure,
    /// The caller supplied something that must be rejected before analysis.
    InvalidInput,
    /// Anything else: I/O on our own state, serialization, bugs.
    Internal,
}

/// Error type for all plagiscan operations.
#[derive(Error, Debug)]
pub enum PlagiarismError {
    /// I/O errors on state owned by this process
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: Option<String>,
    },

    /// Input rejected before it reaches the similarity core
    #[error("Validation error: {message}")]
    Validation {
        /// Error description
        message: String,
        /// Field or input that failed validation
        field: Option<String>,
    },

    /// Referenced record does not exist
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Record kind (`file`, `submission`, `report`)
        kind: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// A collaborator returned nothing usable
    #[error("{collaborator} failure: {message}")]
    Upstream {
        /// Which collaborator failed (`content store`, `ledger`)
        collaborator: &'static str,
        /// Error description
        message: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data type being serialized
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal {
        /// Error description
        message: String,
        /// Additional context
        context: Option<String>,
    },
}

impl PlagiarismError {
    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new validation error naming the offending field
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a not-found error for a record kind
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create an upstream failure for a collaborator
    pub fn upstream(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self::Upstream {
            collaborator,
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: None,
        }
    }

    /// Add context to an existing error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        match &mut self {
            Self::Internal { context: ctx, .. } => {
                *ctx = Some(context.into());
            }
            Self::Io { message, .. } | Self::Upstream { message, .. } => {
                *message = format!("{}: {}", context.into(), message);
            }
            _ => {}
        }
        self
    }

    /// Classify this error for the boundary layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Upstream { .. } => ErrorKind::UpstreamFailure,
            Self::Validation { .. } => ErrorKind::InvalidInput,
            Self::Io { .. }
            | Self::Config { .. }
            | Self::Serialization { .. }
            | Self::Internal { .. } => ErrorKind::Internal,
        }
    }
}

impl From<io::Error> for PlagiarismError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for PlagiarismError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            data_type: Some("JSON".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for PlagiarismError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<Utf8Error> for PlagiarismError {
    fn from(err: Utf8Error) -> Self {
        Self::validation_field(format!("content is not valid UTF-8: {err}"), "content")
    }
}

impl From<FromUtf8Error> for PlagiarismError {
    fn from(err: FromUtf8Error) -> Self {
        err.utf8_error().into()
    }
}

/// Result extension trait for adding context to errors
pub trait PlagiarismResultExt<T> {
    /// Add context to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Add static context to an error result
    fn context(self, msg: &'static str) -> Result<T>;
}

impl<T, E> PlagiarismResultExt<T> for std::result::Result<T, E>
where
    E: Into<PlagiarismError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }

    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| e.into().with_context(msg))
    }
}
