//! Core error types for the Assetbook workspace.
//!
//! Each subsystem owns a focused error enum (`WorkbookSyncError`,
//! `WorkbookError`, `QuoteError`). They are folded into the root [`Error`]
//! here so callers can propagate everything with `?`.

use thiserror::Error;

use crate::quotes::QuoteError;
use crate::sync::WorkbookSyncError;
use crate::workbook::WorkbookError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the asset tracker.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Workbook sync failed: {0}")]
    Sync(#[from] WorkbookSyncError),

    #[error("Workbook I/O failed: {0}")]
    Workbook(#[from] WorkbookError),

    #[error("Price lookup failed: {0}")]
    Quote(#[from] QuoteError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Persistence failed: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Failed to load configuration: {0}")]
    ConfigIO(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Failures while backing up or committing files to disk.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The backup copy could not be created or verified.
    #[error("Backup of {path} failed: {message}")]
    BackupFailed { path: String, message: String },

    /// Writing or renaming the temporary file failed.
    #[error("Atomic write to {path} failed: {message}")]
    CommitFailed { path: String, message: String },
}

impl PersistenceError {
    pub fn backup_failed(path: &std::path::Path, message: impl Into<String>) -> Self {
        Self::BackupFailed {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    pub fn commit_failed(path: &std::path::Path, message: impl Into<String>) -> Self {
        Self::CommitFailed {
            path: path.display().to_string(),
            message: message.into(),
        }
    }
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),
}
