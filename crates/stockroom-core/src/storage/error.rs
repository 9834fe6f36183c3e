//! Storage error handling
//!
//! Two layers of errors:
//! - [`ProviderError`]: raw key-value slot failures, classified by I/O kind
//! - [`StoreError`]: everything a record store operation can report
//!
//! Validation and format errors are ordinary rejections. Corruption and
//! persistence failures put data at risk and are reported separately by
//! [`StoreError::is_integrity_risk`].

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::RecordId;
use crate::validation::ValidationErrors;

/// Errors raised by a persistence provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error(
        "Disk full or quota exceeded while writing to '{path}'. Free up disk space and try again."
    )]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read a slot
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write a slot
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Provider cannot take writes right now (in-memory providers, tests)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    /// Create a write-side error from an I/O error with path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => ProviderError::PermissionDenied {
                path,
                source: error,
            },
            _ if is_disk_full_error(&error) => ProviderError::DiskFull {
                path,
                source: error,
            },
            _ => ProviderError::WriteError {
                path,
                source: error,
            },
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Errors that can occur during record store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// One or more fields of a candidate failed validation
    #[error("{0}")]
    Validation(ValidationErrors),

    /// A position no longer exists in the collection
    #[error("Position {position} is out of range (collection has {len} records)")]
    IndexOutOfRange { position: usize, len: usize },

    /// No record carries this id
    #[error("No record with id '{id}'")]
    NotFound { id: RecordId },

    /// Imported document has the wrong shape
    #[error("Invalid import file: {details}")]
    ImportFormat { details: String },

    /// The persisted slot could not be parsed
    #[error("Stored data in slot '{key}' is corrupted: {details}")]
    CorruptStore { key: String, details: String },

    /// The provider rejected a write; the in-memory change was kept
    #[error("Changes to '{key}' could not be saved: {source}")]
    PersistenceUnavailable {
        key: String,
        #[source]
        source: ProviderError,
    },

    /// Records could not be serialized
    #[error("Failed to encode records: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    /// True for errors that mean stored data may be lost or stale
    pub fn is_integrity_risk(&self) -> bool {
        matches!(
            self,
            StoreError::CorruptStore { .. } | StoreError::PersistenceUnavailable { .. }
        )
    }

    /// Check if the user can fix this error by changing their input
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StoreError::Validation(_)
                | StoreError::ImportFormat { .. }
                | StoreError::PersistenceUnavailable { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::Validation(_) => Some("Fix the listed fields and submit again."),
            StoreError::ImportFormat { .. } => {
                Some("The import file must be a JSON array of records.")
            }
            StoreError::CorruptStore { .. } => {
                Some("A backup of the unreadable data was kept next to the original slot. The store was started empty.")
            }
            StoreError::PersistenceUnavailable { source, .. } => match source {
                ProviderError::DiskFull { .. } => Some("Free up disk space and try again."),
                ProviderError::PermissionDenied { .. } => {
                    Some("Check file and directory permissions for the data directory.")
                }
                _ => Some("Your change is held in memory only. Retry once storage is available."),
            },
            _ => None,
        }
    }

    /// Field-level failures, if this is a validation error
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            StoreError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;
