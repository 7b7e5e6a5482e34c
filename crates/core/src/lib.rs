//! Assetbook Core - workbook synchronization and dashboard generation.
//!
//! This crate owns the asset-tracking workbook: it validates the sheet
//! schema, reads rows tolerantly, checks Daily integrity and commits each
//! sync transactionally. Portfolio valuation, price lookups, the dashboard
//! payload and the advisor briefing are built on top of it.

pub mod advisor;
pub mod constants;
pub mod dashboard;
pub mod errors;
pub mod portfolio;
pub mod quotes;
pub mod sync;
pub mod utils;
pub mod workbook;

// Re-export the synchronizer entry points
pub use sync::{WorkbookSyncService, WorkbookSyncServiceTrait};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
