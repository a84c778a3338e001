//! Error types for errortodos.
//!
//! This module defines all error types used throughout the errortodos crate.
//! Domain failures (validation, credentials, missing records, rejected
//! uploads) sit alongside the storage and configuration failures that can
//! surface from the layers underneath.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for errortodos operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Domain Errors ===
    /// A required field was missing or a form rule was violated.
    #[error("{field}: {message}")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
        /// User-facing description of the problem.
        message: String,
    },

    /// An account with this email is already registered.
    #[error("Email already exists")]
    EmailTaken,

    /// The email/password pair did not match any account.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No record exists with the given id.
    #[error("no error todo with id {id}")]
    NotFound {
        /// The id that was looked up.
        id: String,
    },

    /// A candidate image attachment was refused.
    #[error("upload rejected: {reason}")]
    UploadRejected {
        /// Why the upload was refused.
        reason: String,
    },

    /// The operation requires a signed-in account.
    #[error("not signed in")]
    NotSignedIn,

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A persisted entry could not be decoded.
    #[error("stored entry '{key}' is corrupt: {source}")]
    CorruptEntry {
        /// Storage key of the entry.
        key: &'static str,
        /// The decoding error.
        #[source]
        source: serde_json::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for errortodos operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error for a field.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a new not-found error.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a new upload rejection.
    #[must_use]
    pub fn upload_rejected(reason: impl Into<String>) -> Self {
        Self::UploadRejected {
            reason: reason.into(),
        }
    }

    /// Check if this error is a validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error indicates a missing record.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error is something the user caused and can correct,
    /// as opposed to a storage or configuration fault.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::EmailTaken
                | Self::InvalidCredentials
                | Self::NotFound { .. }
                | Self::UploadRejected { .. }
                | Self::NotSignedIn
        )
    }
}
