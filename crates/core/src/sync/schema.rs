//! Schema validation: required sheets and header columns.
//!
//! Header names are matched case-insensitively after trimming; column order
//! within a sheet does not matter.

use std::collections::HashMap;

use super::WorkbookSyncError;
use crate::constants::{
    CHART_COLUMNS, DAILY_COLUMNS, HEADER_ROW, HOLDINGS_COLUMNS, REQUIRED_SHEETS,
};
use crate::workbook::{Sheet, Workbook};

type Result<T> = std::result::Result<T, WorkbookSyncError>;

/// Maps each normalized header name to its 1-indexed column.
pub fn header_map(sheet: &Sheet, header_row: u32) -> HashMap<String, u32> {
    let mut mapping = HashMap::new();
    for col in 1..=sheet.max_column() {
        let key = sheet.value(header_row, col).to_string().trim().to_lowercase();
        if !key.is_empty() {
            mapping.insert(key, col);
        }
    }
    mapping
}

/// Resolves `required` column names to their indices, in the order given.
///
/// Fails with [`WorkbookSyncError::Schema`] listing every missing column.
pub fn require_columns<const N: usize>(sheet: &Sheet, required: &[&str; N]) -> Result<[u32; N]> {
    let mapping = header_map(sheet, HEADER_ROW);
    let mut resolved = [0u32; N];
    let mut missing = Vec::new();

    for (slot, name) in resolved.iter_mut().zip(required.iter()) {
        match mapping.get(&name.trim().to_lowercase()) {
            Some(col) => *slot = *col,
            None => missing.push(name.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(resolved)
    } else {
        Err(WorkbookSyncError::schema(sheet.name.as_str(), missing))
    }
}

/// Fails when any of the four sheets the synchronizer owns is absent.
pub fn require_sheets(workbook: &Workbook) -> Result<()> {
    let missing = workbook.missing_sheets(&REQUIRED_SHEETS);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(WorkbookSyncError::MissingSheets(missing))
    }
}

/// Column indices of the Holdings sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldingsColumns {
    pub timestamp: u32,
    pub symbol: u32,
    pub quantity: u32,
    pub price_usd: u32,
    pub market_value_usd: u32,
}

impl HoldingsColumns {
    pub fn resolve(sheet: &Sheet) -> Result<Self> {
        let [timestamp, symbol, quantity, price_usd, market_value_usd] =
            require_columns(sheet, &HOLDINGS_COLUMNS)?;
        Ok(Self {
            timestamp,
            symbol,
            quantity,
            price_usd,
            market_value_usd,
        })
    }
}

/// Column indices of the Daily sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyColumns {
    pub date: u32,
    pub cash_usd: u32,
    pub gold_usd: u32,
    pub stocks_usd: u32,
    pub total_usd: u32,
    pub nav: u32,
    pub note: u32,
}

impl DailyColumns {
    pub fn resolve(sheet: &Sheet) -> Result<Self> {
        let [date, cash_usd, gold_usd, stocks_usd, total_usd, nav, note] =
            require_columns(sheet, &DAILY_COLUMNS)?;
        Ok(Self {
            date,
            cash_usd,
            gold_usd,
            stocks_usd,
            total_usd,
            nav,
            note,
        })
    }
}

/// Column indices of the Chart sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartColumns {
    pub date: u32,
    pub nav: u32,
}

impl ChartColumns {
    pub fn resolve(sheet: &Sheet) -> Result<Self> {
        let [date, nav] = require_columns(sheet, &CHART_COLUMNS)?;
        Ok(Self { date, nav })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet_with_headers(name: &str, headers: &[&str]) -> Sheet {
        let mut sheet = Sheet::new(name);
        for (idx, header) in headers.iter().enumerate() {
            sheet.set_value(HEADER_ROW, idx as u32 + 1, *header);
        }
        sheet
    }

    #[test]
    fn test_headers_match_case_insensitively_after_trim() {
        let sheet = sheet_with_headers("Chart", &["  NAV ", "Date"]);
        let cols = ChartColumns::resolve(&sheet).unwrap();
        assert_eq!(cols, ChartColumns { date: 2, nav: 1 });
    }

    #[test]
    fn test_missing_columns_are_all_reported() {
        let sheet = sheet_with_headers("Daily", &["date", "cash_usd", "total_usd", "note"]);
        let err = DailyColumns::resolve(&sheet).unwrap_err();
        assert_eq!(
            err,
            WorkbookSyncError::Schema {
                sheet: "Daily".to_string(),
                missing: vec![
                    "gold_usd".to_string(),
                    "stocks_usd".to_string(),
                    "nav".to_string()
                ],
            }
        );
    }

    #[test]
    fn test_blank_headers_are_ignored() {
        let mut sheet = sheet_with_headers(
            "Holdings",
            &["timestamp", "", "symbol", "quantity", "price_usd", "market_value_usd"],
        );
        sheet.set_value(HEADER_ROW, 2, "   ");
        let cols = HoldingsColumns::resolve(&sheet).unwrap();
        assert_eq!(cols.symbol, 3);
        assert_eq!(cols.market_value_usd, 6);
        assert!(!header_map(&sheet, HEADER_ROW).contains_key(""));
    }

    #[test]
    fn test_require_sheets() {
        let mut wb = Workbook::new();
        for name in ["Holdings", "Daily", "Chart"] {
            wb.add_sheet(Sheet::new(name));
        }
        assert_eq!(
            require_sheets(&wb).unwrap_err(),
            WorkbookSyncError::MissingSheets(vec!["Exec".to_string()])
        );
        wb.add_sheet(Sheet::new("Exec"));
        assert!(require_sheets(&wb).is_ok());
    }
}
