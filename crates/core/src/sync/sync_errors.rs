//! Workbook synchronization error types.
//!
//! Every variant aborts the whole sync before anything reaches disk. The
//! messages name the sheet, date, and numeric gap involved so the workbook
//! can be repaired by hand.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the schema validator, integrity checker, and writer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkbookSyncError {
    #[error("Workbook not found: {0}")]
    WorkbookNotFound(String),

    #[error("Workbook missing required sheets: {0:?}")]
    MissingSheets(Vec<String>),

    /// A required column is missing from a sheet's header row.
    #[error("{sheet} missing required columns: {missing:?}")]
    Schema { sheet: String, missing: Vec<String> },

    #[error("No holding updates were provided")]
    NoHoldingUpdates,

    /// Update symbols with no matching Holdings row.
    #[error("Holdings symbols not found in sheet: {0:?}")]
    UnknownSymbol(Vec<String>),

    #[error("{0} has no usable rows")]
    EmptyDaily(String),

    /// A date cell that could not be normalized to `YYYY-MM-DD`.
    #[error("{sheet} row {row} has an unparseable date: '{value}'")]
    InvalidDate {
        sheet: String,
        row: u32,
        value: String,
    },

    #[error("Daily has duplicate date: {0}")]
    DuplicateDate(String),

    #[error("Daily dates are not monotonic: {current} follows {previous}")]
    OutOfOrder { previous: String, current: String },

    #[error("Daily total mismatch on {date}: parts sum to {parts} vs total {total} (gap {gap})")]
    TotalMismatch {
        date: String,
        parts: Decimal,
        total: Decimal,
        gap: Decimal,
    },

    #[error("Daily nav must be positive on {date} (got {nav})")]
    InvalidNav { date: String, nav: Decimal },

    /// The last Daily row has a zero total so no NAV ratio can be derived.
    #[error("Cannot derive nav ratio from last Daily row ({date}: total {total})")]
    UndefinedNavRatio { date: String, total: Decimal },

    #[error("Sync date {sync_date} is older than Daily last date {last_date}")]
    StaleDate {
        sync_date: String,
        last_date: String,
    },

    /// Chart no longer mirrors Daily; `detail` describes the first divergence.
    #[error("Chart rows do not match Daily date/nav timeline: {detail}")]
    CrossSheetMismatch { detail: String },
}

impl WorkbookSyncError {
    pub fn schema(sheet: impl Into<String>, missing: Vec<String>) -> Self {
        Self::Schema {
            sheet: sheet.into(),
            missing,
        }
    }

    pub fn cross_sheet(detail: impl Into<String>) -> Self {
        Self::CrossSheetMismatch {
            detail: detail.into(),
        }
    }
}
