//! Workbook synchronization service.
//!
//! All mutation happens on an in-memory [`Workbook`]. The file on disk only
//! changes at the final rename, after every check has passed and a verified
//! backup exists.

use chrono::Local;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use super::chart_writer::rebuild_chart;
use super::daily_writer::write_daily;
use super::exec_writer::write_exec;
use super::holdings_writer::write_holdings;
use super::integrity::{read_chart_points, validate_chart_matches_daily, validate_daily_integrity};
use super::normalizer::{read_daily_rows, read_holdings_rows};
use super::persistence::{commit_workbook, create_backup};
use super::schema::{require_sheets, ChartColumns, DailyColumns, HoldingsColumns};
use super::{AuditReport, DailyRow, SyncMetadata, SyncRequest, WorkbookSyncError};
use crate::constants::{CHART_SHEET, DAILY_SHEET, EXEC_SHEET, HOLDINGS_SHEET};
use crate::errors::Result;
use crate::workbook::{read_workbook_from_bytes, write_workbook_to_buffer, Sheet, Workbook};

/// Operations on one workbook file.
pub trait WorkbookSyncServiceTrait: Send + Sync {
    /// Applies a sync and persists it. Nothing on disk changes on failure.
    fn sync(&self, request: &SyncRequest) -> Result<SyncMetadata>;

    /// Read-only schema, integrity and Chart/Daily check.
    fn audit(&self) -> Result<AuditReport>;

    /// Loads the workbook without modifying it.
    fn load(&self) -> Result<Workbook>;

    fn workbook_path(&self) -> &Path;
}

fn sheet<'a>(workbook: &'a Workbook, name: &str) -> std::result::Result<&'a Sheet, WorkbookSyncError> {
    workbook
        .sheet(name)
        .ok_or_else(|| WorkbookSyncError::MissingSheets(vec![name.to_string()]))
}

fn sheet_mut<'a>(
    workbook: &'a mut Workbook,
    name: &str,
) -> std::result::Result<&'a mut Sheet, WorkbookSyncError> {
    workbook
        .sheet_mut(name)
        .ok_or_else(|| WorkbookSyncError::MissingSheets(vec![name.to_string()]))
}

/// Runs every in-memory step of a sync: Holdings, Daily, Chart, Exec, then
/// the Chart/Daily cross-check. Returns the final Daily rows.
pub fn apply_sync(
    workbook: &mut Workbook,
    request: &SyncRequest,
) -> std::result::Result<Vec<DailyRow>, WorkbookSyncError> {
    require_sheets(workbook)?;

    let updated = write_holdings(
        sheet_mut(workbook, HOLDINGS_SHEET)?,
        request.sync_time,
        &request.holding_updates,
    )?;
    info!("Holdings updated ({} rows)", updated);

    let daily_rows = write_daily(sheet_mut(workbook, DAILY_SHEET)?, request)?;
    info!("Daily updated ({} rows)", daily_rows.len());

    rebuild_chart(sheet_mut(workbook, CHART_SHEET)?, &daily_rows)?;
    if let Some(target) = write_exec(sheet_mut(workbook, EXEC_SHEET)?, request.sync_time) {
        debug!("Exec labelled timestamp written to {}", target);
    }

    validate_chart_matches_daily(sheet(workbook, CHART_SHEET)?, &daily_rows)?;
    Ok(daily_rows)
}

/// Read-only audit of an in-memory workbook.
pub fn audit_workbook(workbook: &Workbook) -> std::result::Result<AuditReport, WorkbookSyncError> {
    require_sheets(workbook)?;

    let holdings = sheet(workbook, HOLDINGS_SHEET)?;
    let holdings_count = read_holdings_rows(holdings, &HoldingsColumns::resolve(holdings)?).len();

    let daily = sheet(workbook, DAILY_SHEET)?;
    let rows = read_daily_rows(daily, &DailyColumns::resolve(daily)?)?;
    validate_daily_integrity(&rows)?;

    let chart = sheet(workbook, CHART_SHEET)?;
    validate_chart_matches_daily(chart, &rows)?;
    let chart_count = read_chart_points(chart, &ChartColumns::resolve(chart)?).len();

    let (first, last) = match (rows.first(), rows.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(WorkbookSyncError::EmptyDaily(DAILY_SHEET.to_string())),
    };
    Ok(AuditReport {
        daily_count: rows.len(),
        first_date: first.date.clone(),
        last_date: last.date.clone(),
        last_total_usd: last.total_usd,
        last_nav: last.nav,
        chart_count,
        holdings_count,
    })
}

/// Synchronizer bound to a workbook path.
pub struct WorkbookSyncService {
    workbook_path: PathBuf,
}

impl WorkbookSyncService {
    pub fn new(workbook_path: impl Into<PathBuf>) -> Self {
        Self {
            workbook_path: workbook_path.into(),
        }
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        if !self.workbook_path.is_file() {
            return Err(WorkbookSyncError::WorkbookNotFound(
                self.workbook_path.display().to_string(),
            )
            .into());
        }
        Ok(fs::read(&self.workbook_path)?)
    }
}

impl WorkbookSyncServiceTrait for WorkbookSyncService {
    fn sync(&self, request: &SyncRequest) -> Result<SyncMetadata> {
        let path = self.workbook_path.as_path();
        info!(
            "Syncing workbook {} at {}",
            path.display(),
            request.sync_time.format("%Y-%m-%d %H:%M:%S")
        );

        let original = self.read_bytes()?;
        let mut workbook = read_workbook_from_bytes(original.clone())?;
        let daily_rows = apply_sync(&mut workbook, request)?;
        let encoded = write_workbook_to_buffer(&workbook)?;

        let backup_path = create_backup(path, &original, Local::now().naive_local())?;
        commit_workbook(path, &encoded)?;

        let last_daily_date = daily_rows
            .last()
            .map(|row| row.date.clone())
            .unwrap_or_default();
        info!(
            "Workbook sync complete: {} Daily rows through {}",
            daily_rows.len(),
            last_daily_date
        );
        Ok(SyncMetadata {
            backup_path,
            last_daily_date,
            daily_count: daily_rows.len(),
        })
    }

    fn audit(&self) -> Result<AuditReport> {
        let workbook = self.load()?;
        let report = audit_workbook(&workbook)?;
        info!(
            "Audit passed for {}: {} Daily rows ({} to {})",
            self.workbook_path.display(),
            report.daily_count,
            report.first_date,
            report.last_date
        );
        Ok(report)
    }

    fn load(&self) -> Result<Workbook> {
        let bytes = self.read_bytes()?;
        Ok(read_workbook_from_bytes(bytes)?)
    }

    fn workbook_path(&self) -> &Path {
        &self.workbook_path
    }
}
