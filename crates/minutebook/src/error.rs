//! Error types for minutebook.
//!
//! This module defines all error types used throughout the minutebook crate.
//! Storage, authorization and validation failures surface to callers; layout
//! and assist failures are contained where they happen and only reach this
//! type when the whole operation has to fail.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for minutebook operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Workflow Errors ===
    /// A required field is missing or a value has the wrong shape.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Name of the offending field.
        field: String,
        /// Description of the violation.
        message: String,
    },

    /// The caller's role does not allow the requested transition.
    #[error("not authorized: {message}")]
    Authorization {
        /// Description of the refused action.
        message: String,
    },

    /// No caller identity was supplied for a mutating operation.
    #[error("authentication required")]
    Unauthenticated,

    /// The record's current status does not allow the requested change.
    #[error("cannot change a record in status '{from}': {message}")]
    InvalidTransition {
        /// Status the record is currently in.
        from: String,
        /// Description of the refused change.
        message: String,
    },

    /// A record with the given id does not exist.
    #[error("minutes record {id} not found")]
    NotFound {
        /// The id that was looked up.
        id: i64,
    },

    // === Rendering Errors ===
    /// Document rendering failed.
    #[error("render error: {0}")]
    Render(String),

    /// An embedded image could not be decoded.
    #[error("failed to decode {what} image: {message}")]
    ImageDecode {
        /// Which image failed (watermark, chairman signature, ...).
        what: String,
        /// Description of the decoding failure.
        message: String,
    },

    // === Assist Errors ===
    /// The external text-improvement service failed or answered badly.
    #[error("text-improvement service error: {0}")]
    ExternalService(String),

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

    /// A stored collection could not be encoded or decoded.
    #[error("failed to decode stored {collection}: {message}")]
    Codec {
        /// Name of the collection column.
        collection: &'static str,
        /// Description of what went wrong.
        message: String,
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

    // === Generic Errors ===
    /// An operation timed out.
    #[error("operation timed out: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
    },

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for minutebook operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                operation: "text-improvement request".to_string(),
            }
        } else {
            Self::ExternalService(err.to_string())
        }
    }
}

impl Error {
    /// Create a new validation error for the named field.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new authorization error.
    #[must_use]
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    /// Create a new render error.
    #[must_use]
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Create an image decode error.
    #[must_use]
    pub fn image_decode(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ImageDecode {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Create a new external service error.
    #[must_use]
    pub fn external(message: impl Into<String>) -> Self {
        Self::ExternalService(message.into())
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error is a role/permission refusal.
    #[must_use]
    pub fn is_authorization_error(&self) -> bool {
        matches!(self, Self::Authorization { .. } | Self::Unauthenticated)
    }

    /// Check if this error is a validation failure.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error means the record does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Unauthenticated;
        assert_eq!(err.to_string(), "authentication required");

        let err = Error::render("bad stream");
        assert_eq!(err.to_string(), "render error: bad stream");
    }

    #[test]
    fn test_validation_error() {
        let err = Error::validation("title", "must not be empty");
        assert!(err.is_validation_error());
        assert_eq!(err.to_string(), "invalid title: must not be empty");
    }

    #[test]
    fn test_is_authorization_error() {
        assert!(Error::authorization("only the chairman can approve").is_authorization_error());
        assert!(Error::Unauthenticated.is_authorization_error());
        assert!(!Error::internal("x").is_authorization_error());
    }

    #[test]
    fn test_not_found() {
        let err = Error::NotFound { id: 7 };
        assert!(err.is_not_found());
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = Error::InvalidTransition {
            from: "approved".to_string(),
            message: "approved minutes are final".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("approved"));
        assert!(msg.contains("final"));
    }

    #[test]
    fn test_image_decode_display() {
        let err = Error::image_decode("watermark", "unsupported format");
        let msg = err.to_string();
        assert!(msg.contains("watermark"));
        assert!(msg.contains("unsupported format"));
    }

    #[test]
    fn test_external_error() {
        let err = Error::external("status 502");
        assert_eq!(err.to_string(), "text-improvement service error: status 502");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_codec_error_display() {
        let err = Error::Codec {
            collection: "agenda_items",
            message: "unsupported version 9".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("agenda_items"));
        assert!(msg.contains("version 9"));
    }

    #[test]
    fn test_timeout_error_display() {
        let err = Error::Timeout {
            operation: "text-improvement request".to_string(),
        };
        assert!(err.to_string().contains("text-improvement"));
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }
}
