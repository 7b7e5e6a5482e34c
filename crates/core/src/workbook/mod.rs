//! Workbook module - in-memory spreadsheet value and its XLSX codec.

mod workbook_errors;
mod workbook_model;
pub mod xlsx;

pub use workbook_errors::WorkbookError;
pub use workbook_model::*;
pub use xlsx::{read_workbook, read_workbook_from_bytes, write_workbook_to_buffer};
