//! Store error types
//!
//! Error codes:
//! - FOLIO_VALIDATION: empty or unsafe collection/resource name, bad config
//! - FOLIO_NOT_FOUND: resource or collection directory absent
//! - FOLIO_IO_ERROR: directory creation, open, write, rename failures
//! - FOLIO_SERIALIZATION_FAILED: value could not be encoded as JSON
//! - FOLIO_DESERIALIZATION_FAILED: stored bytes are not the expected JSON
//! - FOLIO_INTERNAL: poisoned lock registry

use std::io;

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by every store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize record {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to deserialize record {path}: {source}")]
    Deserialization {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Maps `ErrorKind::NotFound` to [`StoreError::NotFound`], anything else to `Io`.
    pub fn from_io_at(what: impl Into<String>, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound(what.into())
        } else {
            Self::io(what, source)
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Validation(_) => "FOLIO_VALIDATION",
            StoreError::NotFound(_) => "FOLIO_NOT_FOUND",
            StoreError::Io { .. } => "FOLIO_IO_ERROR",
            StoreError::Serialization { .. } => "FOLIO_SERIALIZATION_FAILED",
            StoreError::Deserialization { .. } => "FOLIO_DESERIALIZATION_FAILED",
            StoreError::Internal(_) => "FOLIO_INTERNAL",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
