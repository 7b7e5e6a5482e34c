//! Chart mirror rebuild.

use log::debug;

use super::daily_writer::decimal_cell;
use super::normalizer::last_non_empty_row;
use super::schema::ChartColumns;
use super::{DailyRow, WorkbookSyncError};
use crate::constants::{DEFAULT_NAV_FORMAT, FIRST_DATA_ROW, GENERAL_FORMAT, NAV_PRECISION};
use crate::workbook::Sheet;

/// Clears every Chart data row and rewrites one `(date, nav)` row per Daily
/// row, in Daily order.
pub fn rebuild_chart(sheet: &mut Sheet, daily: &[DailyRow]) -> Result<(), WorkbookSyncError> {
    let cols = ChartColumns::resolve(sheet)?;
    let date_fmt = sheet
        .number_format(FIRST_DATA_ROW, cols.date)
        .unwrap_or(GENERAL_FORMAT)
        .to_string();
    let nav_fmt = sheet
        .number_format(FIRST_DATA_ROW, cols.nav)
        .unwrap_or(DEFAULT_NAV_FORMAT)
        .to_string();

    let last_row = last_non_empty_row(sheet, cols.date);
    for row in FIRST_DATA_ROW..=last_row {
        sheet.clear_value(row, cols.date);
        sheet.clear_value(row, cols.nav);
    }

    for (row, item) in (FIRST_DATA_ROW..).zip(daily) {
        sheet.write(row, cols.date, item.date.as_str(), &date_fmt);
        sheet.write(
            row,
            cols.nav,
            decimal_cell(item.nav.round_dp(NAV_PRECISION)),
            &nav_fmt,
        );
    }
    debug!(
        "Rebuilt Chart with {} rows (cleared {})",
        daily.len(),
        last_row.saturating_sub(FIRST_DATA_ROW - 1)
    );
    Ok(())
}
