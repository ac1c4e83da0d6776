//! Error types for the specification engine.
//!
//! Errors are layered the same way for every backend: evaluation errors
//! describe a problem with the Specification itself (or with the caller
//! abandoning it), backend errors describe a problem with the store that
//! executed it. "No matching rows" is never an error.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all repository and evaluator operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Errors raised while interpreting a Specification.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// Backend-specific errors.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl StorageError {
    /// Returns the evaluation error, if this is one.
    pub fn as_evaluation(&self) -> Option<&EvaluationError> {
        match self {
            StorageError::Evaluation(err) => Some(err),
            StorageError::Backend(_) => None,
        }
    }

    /// Returns true if the operation was abandoned because of a cancellation signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StorageError::Evaluation(EvaluationError::Cancelled))
    }
}

/// Errors related to evaluating a Specification.
#[derive(Error, Debug)]
pub enum EvaluationError {
    /// `skip` or `take` is negative. Never clamped.
    #[error("invalid paging: {parameter} must be non-negative, got {value}")]
    InvalidPaging { parameter: &'static str, value: i64 },

    /// A criterion, ordering key or include cannot be expressed in the backend's native query form.
    #[error("expression not supported by {backend_name}: {expression}")]
    UnsupportedExpression {
        backend_name: String,
        expression: String,
    },

    /// A projected fetch was requested on a Specification without a projection.
    #[error("specification has no projection")]
    MissingProjection,

    /// The caller cancelled the evaluation before it completed.
    #[error("evaluation cancelled")]
    Cancelled,
}

/// Errors originating from the storage backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution error.
    #[error("query execution failed: {message}")]
    QueryError { message: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },

    /// Schema migration error.
    #[error("schema migration failed: {message}")]
    MigrationError { message: String },
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Backend(BackendError::SerializationError {
            message: err.to_string(),
        })
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Backend(BackendError::Internal {
            backend_name: "sqlite".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        })
    }
}

#[cfg(feature = "sqlite")]
impl From<r2d2::Error> for StorageError {
    fn from(err: r2d2::Error) -> Self {
        StorageError::Backend(BackendError::ConnectionFailed {
            backend_name: "sqlite".to_string(),
            message: err.to_string(),
        })
    }
}
