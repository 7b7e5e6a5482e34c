//! Workbook synchronizer: schema validation, tolerant reading, integrity
//! checks, sheet writers, and backup-plus-atomic persistence.

mod chart_writer;
mod daily_writer;
mod exec_writer;
mod holdings_writer;
mod sync_errors;
mod sync_model;
mod sync_service;

pub mod integrity;
pub mod normalizer;
pub mod persistence;
pub mod schema;

pub use chart_writer::rebuild_chart;
pub use daily_writer::{nav_ratio, write_daily};
pub use exec_writer::{find_label_cell, write_exec};
pub use holdings_writer::write_holdings;
pub use sync_errors::WorkbookSyncError;
pub use sync_model::*;
pub use sync_service::{apply_sync, audit_workbook, WorkbookSyncService, WorkbookSyncServiceTrait};
