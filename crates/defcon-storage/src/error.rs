//! Storage error types for the defcon storage abstraction layer.

use std::fmt;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The record data was rejected by store validation.
    #[error("Invalid record: {message}")]
    InvalidRecord {
        /// Description of why the record is invalid.
        message: String,
    },

    /// A uniqueness or referential constraint was violated.
    #[error("Constraint violation: {message}")]
    Conflict {
        /// Description of the violated constraint.
        message: String,
    },

    /// Failed to connect to the storage backend.
    #[error("Connection error: {message}")]
    ConnectionError {
        /// Description of the connection error.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `InvalidRecord` error.
    #[must_use]
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Creates a new `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a new `ConnectionError` error.
    #[must_use]
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a validation error.
    #[must_use]
    pub fn is_invalid_record(&self) -> bool {
        matches!(self, Self::InvalidRecord { .. })
    }

    /// Returns the error category, recorded as the `category` field when a
    /// failed run is logged.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRecord { .. } => ErrorCategory::Validation,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::ConnectionError { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of storage errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Validation error.
    Validation,
    /// Constraint violation.
    Conflict,
    /// Infrastructure/connection error.
    Infrastructure,
    /// Internal error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Conflict => write!(f, "conflict"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::invalid_record("name must be a string");
        assert_eq!(err.to_string(), "Invalid record: name must be a string");

        let err = StorageError::conflict("duplicate key");
        assert_eq!(err.to_string(), "Constraint violation: duplicate key");

        let err = StorageError::connection_error("refused");
        assert_eq!(err.to_string(), "Connection error: refused");
    }

    #[test]
    fn test_error_predicates() {
        assert!(StorageError::invalid_record("bad").is_invalid_record());
        assert!(!StorageError::internal("boom").is_invalid_record());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            StorageError::invalid_record("x").category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            StorageError::conflict("x").category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            StorageError::connection_error("refused").category(),
            ErrorCategory::Infrastructure
        );
        assert_eq!(StorageError::internal("x").category().to_string(), "internal");
    }
}
