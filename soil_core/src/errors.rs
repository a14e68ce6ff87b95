//! # Error Types
//!
//! Structured error types for soil_core. Calculators reject bad input with
//! one of two families of error:
//!
//! - **Input errors** (`InvalidInput`, `MissingField`): a form field is absent
//!   or does not hold a finite number.
//! - **Domain errors** (`DomainError`): the value parsed, but violates a
//!   physical constraint (e.g. liquid limit at or below plastic limit).
//!
//! Store and file failures form a third family that the presentation layer
//! reports with a generic message.
//!
//! ## Example
//!
//! ```rust
//! use soil_core::errors::{CalcError, CalcResult, ErrorKind};
//!
//! fn check_limits(ll: f64, pl: f64) -> CalcResult<()> {
//!     if ll <= pl {
//!         return Err(CalcError::domain(
//!             "liquid_limit",
//!             "Liquid limit must be greater than plastic limit",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! let err = check_limits(20.0, 25.0).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Domain);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for soil_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculations and feedback storage.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// A field holds something that is not a finite number
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing or blank
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// A numeric value violates a physical constraint
    #[error("Invalid value for '{field}': {reason}")]
    DomainError { field: String, reason: String },

    /// The feedback store rejected an insert or query
    #[error("Store error: {operation} - {reason}")]
    StoreError { operation: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

/// Coarse error family used to pick a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Absent or non-numeric input
    Input,
    /// Numeric input outside its physical range
    Domain,
    /// Persistence failure (store, file, serialization)
    Store,
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a DomainError
    pub fn domain(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::DomainError {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a StoreError
    pub fn store(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::StoreError {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        CalcError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Error family for presentation.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::InvalidInput { .. } | CalcError::MissingField { .. } => ErrorKind::Input,
            CalcError::DomainError { .. } => ErrorKind::Domain,
            CalcError::StoreError { .. }
            | CalcError::FileError { .. }
            | CalcError::FileLocked { .. }
            | CalcError::SerializationError { .. }
            | CalcError::VersionMismatch { .. } => ErrorKind::Store,
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::DomainError { .. } => "DOMAIN_ERROR",
            CalcError::StoreError { .. } => "STORE_ERROR",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::FileLocked { .. } => "FILE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("wet_mass", "abc", "Not a number");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_field("test").error_code(), "MISSING_FIELD");
        assert_eq!(CalcError::domain("total_mass", "must be positive").error_code(), "DOMAIN_ERROR");
        assert_eq!(CalcError::store("insert", "offline").error_code(), "STORE_ERROR");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(CalcError::missing_field("x").kind(), ErrorKind::Input);
        assert_eq!(CalcError::invalid_input("x", "y", "z").kind(), ErrorKind::Input);
        assert_eq!(CalcError::domain("x", "y").kind(), ErrorKind::Domain);
        assert_eq!(
            CalcError::SerializationError { reason: "bad".into() }.kind(),
            ErrorKind::Store
        );
    }
}
