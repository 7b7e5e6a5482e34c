use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::workbook::CellRef;

/// Sheet holding one row per tracked position
pub const HOLDINGS_SHEET: &str = "Holdings";

/// Sheet holding one row per calendar date
pub const DAILY_SHEET: &str = "Daily";

/// Derived (date, nav) mirror of the Daily sheet
pub const CHART_SHEET: &str = "Chart";

/// Free-form summary sheet
pub const EXEC_SHEET: &str = "Exec";

/// Every sheet a workbook must contain before it can be synced
pub const REQUIRED_SHEETS: [&str; 4] = [HOLDINGS_SHEET, DAILY_SHEET, CHART_SHEET, EXEC_SHEET];

pub const HOLDINGS_COLUMNS: [&str; 5] = [
    "timestamp",
    "symbol",
    "quantity",
    "price_usd",
    "market_value_usd",
];

pub const DAILY_COLUMNS: [&str; 7] = [
    "date",
    "cash_usd",
    "gold_usd",
    "stocks_usd",
    "total_usd",
    "nav",
    "note",
];

pub const CHART_COLUMNS: [&str; 2] = ["date", "nav"];

/// Header row index (1-based) shared by every tabular sheet
pub const HEADER_ROW: u32 = 1;

/// First data row (1-based)
pub const FIRST_DATA_ROW: u32 = 2;

/// Maximum accepted gap between a Daily total and the sum of its parts
pub const TOTAL_TOLERANCE: Decimal = dec!(0.05);

/// Decimal places kept for money amounts
pub const MONEY_PRECISION: u32 = 2;

/// Decimal places kept for NAV values
pub const NAV_PRECISION: u32 = 4;

/// Decimal places kept for derived unit prices
pub const PRICE_PRECISION: u32 = 4;

/// Note tag for rows written from fresh broker totals
pub const NOTE_BROKER_SYNC: &str = "broker-sync";

/// Note tag for synthetic gap-filling rows
pub const NOTE_CARRY: &str = "carry";

/// Fixed Exec cell receiving the sync timestamp
pub const EXEC_TIMESTAMP_CELL: CellRef = CellRef::new(2, 2);

/// Label whose right-hand neighbour also receives the sync timestamp
pub const EXEC_TIMESTAMP_LABEL: &str = "更新时间";

/// Rows scanned for the Exec label
pub const EXEC_SCAN_MAX_ROWS: u32 = 40;

/// Columns scanned for the Exec label
pub const EXEC_SCAN_MAX_COLUMNS: u32 = 20;

/// Subdirectory (next to the workbook) receiving timestamped backups
pub const BACKUP_DIR_NAME: &str = "backups";

/// Number formats applied when the sheet has no existing format to copy
pub const DEFAULT_DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
pub const DEFAULT_MONEY_FORMAT: &str = "#,##0.00";
pub const DEFAULT_NAV_FORMAT: &str = "0.00";
pub const GENERAL_FORMAT: &str = "General";

/// Serial-date window treated as a plausible spreadsheet date (1982..2064)
pub const SERIAL_DATE_MIN: f64 = 30000.0;
pub const SERIAL_DATE_MAX: f64 = 60000.0;
