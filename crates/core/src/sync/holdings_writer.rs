//! In-place update of existing Holdings rows.

use chrono::NaiveDateTime;
use log::debug;
use std::collections::{HashMap, HashSet};

use super::daily_writer::decimal_cell;
use super::schema::HoldingsColumns;
use super::{normalize_symbol, HoldingUpdate, WorkbookSyncError};
use crate::constants::{DEFAULT_MONEY_FORMAT, FIRST_DATA_ROW, GENERAL_FORMAT};
use crate::utils::time_utils::timestamp_format;
use crate::workbook::Sheet;

/// Overwrites timestamp, quantity, price and market value on every row whose
/// symbol has an update. Rows are never inserted or removed; an update for a
/// symbol with no row is an error. Returns the number of rows written.
pub fn write_holdings(
    sheet: &mut Sheet,
    sync_time: NaiveDateTime,
    updates: &[HoldingUpdate],
) -> Result<usize, WorkbookSyncError> {
    let cols = HoldingsColumns::resolve(sheet)?;

    let by_symbol: HashMap<String, &HoldingUpdate> = updates
        .iter()
        .map(|u| (u.normalized_symbol(), u))
        .filter(|(symbol, _)| !symbol.is_empty())
        .collect();
    if by_symbol.is_empty() {
        return Err(WorkbookSyncError::NoHoldingUpdates);
    }

    let format_of = |col: u32, default: &str| {
        sheet
            .number_format(FIRST_DATA_ROW, col)
            .unwrap_or(default)
            .to_string()
    };
    let ts_fmt = timestamp_format(sheet.number_format(FIRST_DATA_ROW, cols.timestamp));
    let qty_fmt = format_of(cols.quantity, GENERAL_FORMAT);
    let price_fmt = format_of(cols.price_usd, DEFAULT_MONEY_FORMAT);
    let mv_fmt = format_of(cols.market_value_usd, DEFAULT_MONEY_FORMAT);

    let mut updated: HashSet<String> = HashSet::new();
    let mut rows_written = 0;
    for row in FIRST_DATA_ROW..=sheet.max_row() {
        let symbol = normalize_symbol(&sheet.value(row, cols.symbol).to_string());
        let Some(update) = by_symbol.get(&symbol) else {
            continue;
        };

        sheet.write(row, cols.timestamp, sync_time, &ts_fmt);
        sheet.write(row, cols.quantity, decimal_cell(update.quantity), &qty_fmt);
        sheet.write(row, cols.price_usd, decimal_cell(update.price_usd), &price_fmt);
        sheet.write(
            row,
            cols.market_value_usd,
            decimal_cell(update.market_value_usd),
            &mv_fmt,
        );
        debug!("Updated Holdings row {} ({})", row, symbol);
        updated.insert(symbol);
        rows_written += 1;
    }

    let mut missing: Vec<String> = by_symbol
        .keys()
        .filter(|symbol| !updated.contains(*symbol))
        .cloned()
        .collect();
    if !missing.is_empty() {
        missing.sort();
        return Err(WorkbookSyncError::UnknownSymbol(missing));
    }
    Ok(rows_written)
}
