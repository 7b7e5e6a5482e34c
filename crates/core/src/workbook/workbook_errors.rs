//! Workbook codec error types.

use thiserror::Error;

/// Errors raised while decoding or encoding a workbook file.
#[derive(Error, Debug)]
pub enum WorkbookError {
    /// The file could not be parsed as a workbook.
    #[error("{0}")]
    Read(String),

    /// The in-memory workbook could not be serialized.
    #[error("{0}")]
    Encode(String),

    /// A cell reference was not valid A1 notation.
    #[error("Invalid cell reference: {0}")]
    InvalidCellRef(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
