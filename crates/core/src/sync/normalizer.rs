//! Tolerant cell parsing.
//!
//! Nothing in here fails on malformed cells: numbers degrade to zero and
//! dates to a sentinel string. Rejecting bad data is the integrity checker's
//! job, never this module's.

use chrono::NaiveDate;
use log::debug;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use super::schema::{DailyColumns, HoldingsColumns};
use super::{normalize_symbol, DailyRow, HoldingRow, WorkbookSyncError};
use crate::constants::{FIRST_DATA_ROW, SERIAL_DATE_MAX, SERIAL_DATE_MIN};
use crate::utils::time_utils::serial_to_datetime;
use crate::workbook::{CellValue, Sheet};

const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '¥'];

/// Coerces a cell to a float. Numeric text may carry thousands separators and
/// a leading currency symbol; anything else unparsable becomes `0.0`.
pub fn coerce_number(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(n) if n.is_finite() => *n,
        CellValue::Bool(true) => 1.0,
        CellValue::Text(text) => parse_numeric_text(text).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn parse_numeric_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    let cleaned: String = unsigned
        .trim_start_matches(&CURRENCY_SYMBOLS[..])
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let parsed: f64 = cleaned.parse().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    Some(if negative { -parsed } else { parsed })
}

/// Converts a cell float to a decimal amount, `0` when not representable.
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

pub fn coerce_decimal(value: &CellValue) -> Decimal {
    to_decimal(coerce_number(value))
}

/// Parses a date from a native datetime, a plausible serial number, or text
/// starting with `YYYY-MM-DD` (a trailing time component is ignored).
pub fn coerce_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Number(n) if (SERIAL_DATE_MIN..=SERIAL_DATE_MAX).contains(n) => {
            serial_to_datetime(*n).map(|dt| dt.date())
        }
        CellValue::Text(text) => {
            let token = first_token(text)?;
            NaiveDate::parse_from_str(token, "%Y-%m-%d").ok()
        }
        _ => None,
    }
}

fn first_token(text: &str) -> Option<&str> {
    text.split_whitespace().next()
}

/// `YYYY-MM-DD` for parseable dates. Otherwise the first token of the raw
/// text, or `""` for blank cells; both are sentinels the integrity checker
/// rejects or skips.
pub fn normalize_date_str(value: &CellValue) -> String {
    if let Some(date) = coerce_date(value) {
        return date.format("%Y-%m-%d").to_string();
    }
    if value.is_blank() {
        return String::new();
    }
    let text = value.to_string();
    first_token(&text).unwrap_or_default().to_string()
}

/// Last row whose cell in `col` is not blank, scanning up from the sheet's
/// reported extent. Returns the header row when no data row qualifies.
pub fn last_non_empty_row(sheet: &Sheet, col: u32) -> u32 {
    (FIRST_DATA_ROW..=sheet.max_row())
        .rev()
        .find(|row| !sheet.value(*row, col).is_blank())
        .unwrap_or(FIRST_DATA_ROW - 1)
}

/// Reads the Daily sheet into typed rows. Rows with a blank date are skipped;
/// a sheet with no remaining rows is an error.
pub fn read_daily_rows(
    sheet: &Sheet,
    cols: &DailyColumns,
) -> Result<Vec<DailyRow>, WorkbookSyncError> {
    let last_row = last_non_empty_row(sheet, cols.date);
    let mut rows = Vec::new();

    for row in FIRST_DATA_ROW..=last_row {
        let date = normalize_date_str(sheet.value(row, cols.date));
        if date.is_empty() {
            debug!("Skipping {} row {} with blank date", sheet.name, row);
            continue;
        }
        rows.push(DailyRow {
            row_idx: row,
            date,
            cash_usd: coerce_decimal(sheet.value(row, cols.cash_usd)),
            gold_usd: coerce_decimal(sheet.value(row, cols.gold_usd)),
            stocks_usd: coerce_decimal(sheet.value(row, cols.stocks_usd)),
            total_usd: coerce_decimal(sheet.value(row, cols.total_usd)),
            nav: coerce_decimal(sheet.value(row, cols.nav)),
            note: sheet.value(row, cols.note).to_string(),
        });
    }

    if rows.is_empty() {
        return Err(WorkbookSyncError::EmptyDaily(sheet.name.clone()));
    }
    Ok(rows)
}

/// Reads every Holdings row that carries a symbol.
pub fn read_holdings_rows(sheet: &Sheet, cols: &HoldingsColumns) -> Vec<HoldingRow> {
    (FIRST_DATA_ROW..=sheet.max_row())
        .filter_map(|row| {
            let symbol = normalize_symbol(&sheet.value(row, cols.symbol).to_string());
            if symbol.is_empty() {
                return None;
            }
            Some(HoldingRow {
                row_idx: row,
                symbol,
                quantity: coerce_decimal(sheet.value(row, cols.quantity)),
                price_usd: coerce_decimal(sheet.value(row, cols.price_usd)),
                market_value_usd: coerce_decimal(sheet.value(row, cols.market_value_usd)),
            })
        })
        .collect()
}
