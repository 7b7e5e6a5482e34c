//! Daily history update: same-day overwrite or gap-free append.

use chrono::NaiveDate;
use log::{debug, info};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::integrity::{parse_row_date, validate_daily_integrity};
use super::normalizer::read_daily_rows;
use super::schema::DailyColumns;
use super::{AssetCategory, DailyRow, SyncRequest, WorkbookSyncError};
use crate::constants::{
    DEFAULT_MONEY_FORMAT, DEFAULT_NAV_FORMAT, FIRST_DATA_ROW, GENERAL_FORMAT, MONEY_PRECISION,
    NAV_PRECISION, NOTE_BROKER_SYNC, NOTE_CARRY,
};
use crate::utils::time_utils::get_days_strictly_between;
use crate::workbook::{CellValue, Sheet};

type Result<T> = std::result::Result<T, WorkbookSyncError>;

/// Cell value for a decimal amount.
pub(crate) fn decimal_cell(value: Decimal) -> CellValue {
    CellValue::Number(value.to_f64().unwrap_or_default())
}

/// Display formats of the first data row, reapplied to every written row.
#[derive(Debug, Clone)]
struct DailyFormats {
    date: String,
    cash: String,
    gold: String,
    stocks: String,
    total: String,
    nav: String,
    note: String,
}

impl DailyFormats {
    fn capture(sheet: &Sheet, cols: &DailyColumns) -> Self {
        let format_of = |col: u32, default: &str| {
            sheet
                .number_format(FIRST_DATA_ROW, col)
                .unwrap_or(default)
                .to_string()
        };
        Self {
            date: format_of(cols.date, GENERAL_FORMAT),
            cash: format_of(cols.cash_usd, DEFAULT_MONEY_FORMAT),
            gold: format_of(cols.gold_usd, DEFAULT_MONEY_FORMAT),
            stocks: format_of(cols.stocks_usd, DEFAULT_MONEY_FORMAT),
            total: format_of(cols.total_usd, DEFAULT_MONEY_FORMAT),
            nav: format_of(cols.nav, DEFAULT_NAV_FORMAT),
            note: format_of(cols.note, GENERAL_FORMAT),
        }
    }
}

/// Amounts written to one Daily row.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DailyAmounts {
    cash_usd: Decimal,
    gold_usd: Decimal,
    stocks_usd: Decimal,
    total_usd: Decimal,
    nav: Decimal,
}

struct DailyWriter<'a> {
    sheet: &'a mut Sheet,
    cols: DailyColumns,
    formats: DailyFormats,
}

impl DailyWriter<'_> {
    fn write_row(&mut self, row: u32, date: NaiveDate, amounts: &DailyAmounts, note: &str) {
        let f = &self.formats;
        let c = &self.cols;
        let money = |v: Decimal| decimal_cell(v.round_dp(MONEY_PRECISION));

        self.sheet
            .write(row, c.date, date.format("%Y-%m-%d").to_string(), &f.date);
        self.sheet.write(row, c.cash_usd, money(amounts.cash_usd), &f.cash);
        self.sheet.write(row, c.gold_usd, money(amounts.gold_usd), &f.gold);
        self.sheet
            .write(row, c.stocks_usd, money(amounts.stocks_usd), &f.stocks);
        self.sheet
            .write(row, c.total_usd, money(amounts.total_usd), &f.total);
        self.sheet.write(
            row,
            c.nav,
            decimal_cell(amounts.nav.round_dp(NAV_PRECISION)),
            &f.nav,
        );
        self.sheet.write(row, c.note, note, &f.note);
        debug!("Wrote Daily row {} ({}, {})", row, date, note);
    }
}

/// `last.nav / last.total_usd`, the factor turning a USD total into a NAV.
pub fn nav_ratio(last: &DailyRow) -> Result<Decimal> {
    let undefined = || WorkbookSyncError::UndefinedNavRatio {
        date: last.date.clone(),
        total: last.total_usd,
    };
    if last.total_usd <= Decimal::ZERO {
        return Err(undefined());
    }
    let ratio = last.nav.checked_div(last.total_usd).ok_or_else(undefined)?;
    if ratio <= Decimal::ZERO {
        return Err(undefined());
    }
    Ok(ratio)
}

/// Brings the Daily sheet up to `request.sync_time`'s date.
///
/// - Same date as the last row: that row is overwritten with the fresh totals.
/// - Later date: one `carry` row per missing calendar day repeats the last
///   totals, then a `broker-sync` row holds the fresh totals.
/// - Earlier date: rejected.
///
/// NAVs come from the last row's NAV/total ratio. Date cells are rewritten in
/// canonical form and the whole history is re-audited before returning the
/// refreshed rows.
pub fn write_daily(sheet: &mut Sheet, request: &SyncRequest) -> Result<Vec<DailyRow>> {
    let cols = DailyColumns::resolve(sheet)?;
    let formats = DailyFormats::capture(sheet, &cols);

    let rows = read_daily_rows(sheet, &cols)?;
    validate_daily_integrity(&rows)?;
    let last = rows
        .last()
        .ok_or_else(|| WorkbookSyncError::EmptyDaily(sheet.name.clone()))?;
    let last_date = parse_row_date(last)?;
    let ratio = nav_ratio(last)?;

    let target_date = request.sync_time.date();
    if target_date < last_date {
        return Err(WorkbookSyncError::StaleDate {
            sync_date: target_date.format("%Y-%m-%d").to_string(),
            last_date: last.date.clone(),
        });
    }

    let current = DailyAmounts {
        cash_usd: request.category_total(AssetCategory::Cash),
        gold_usd: request.category_total(AssetCategory::Gold),
        stocks_usd: request.category_total(AssetCategory::Stocks),
        total_usd: request.total_balance,
        nav: (request.total_balance * ratio).round_dp(NAV_PRECISION),
    };
    let last_row_idx = last.row_idx;

    let mut writer = DailyWriter {
        sheet,
        cols,
        formats,
    };

    if target_date == last_date {
        info!("Overwriting Daily row for {}", target_date);
        writer.write_row(last_row_idx, target_date, &current, NOTE_BROKER_SYNC);
    } else {
        let carry = DailyAmounts {
            cash_usd: last.cash_usd,
            gold_usd: last.gold_usd,
            stocks_usd: last.stocks_usd,
            total_usd: last.total_usd,
            nav: (last.total_usd * ratio).round_dp(NAV_PRECISION),
        };
        let gap_days = get_days_strictly_between(last_date, target_date);
        info!(
            "Appending Daily rows for {} ({} carry-forward)",
            target_date,
            gap_days.len()
        );

        let mut next_row = last_row_idx + 1;
        for day in gap_days {
            writer.write_row(next_row, day, &carry, NOTE_CARRY);
            next_row += 1;
        }
        writer.write_row(next_row, target_date, &current, NOTE_BROKER_SYNC);
    }

    let DailyWriter {
        sheet,
        cols,
        formats,
    } = writer;
    let refreshed = read_daily_rows(sheet, &cols)?;
    for row in &refreshed {
        sheet.write(row.row_idx, cols.date, row.date.as_str(), &formats.date);
    }
    validate_daily_integrity(&refreshed)?;
    Ok(refreshed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::GroupedTotals;
    use chrono::NaiveDateTime;
    use rust_decimal_macros::dec;

    const HEADERS: [&str; 7] = [
        "date",
        "cash_usd",
        "gold_usd",
        "stocks_usd",
        "total_usd",
        "nav",
        "note",
    ];

    fn daily_sheet(rows: &[(&str, [f64; 5])]) -> Sheet {
        let mut sheet = Sheet::new("Daily");
        for (idx, header) in HEADERS.iter().enumerate() {
            sheet.set_value(1, idx as u32 + 1, *header);
        }
        for (offset, (date, values)) in rows.iter().enumerate() {
            let row = offset as u32 + 2;
            sheet.set_value(row, 1, *date);
            for (idx, value) in values.iter().enumerate() {
                sheet.set_value(row, idx as u32 + 2, *value);
            }
            sheet.set_value(row, 7, "broker-sync");
        }
        sheet
    }

    fn request(at: &str, cash: Decimal, gold: Decimal, stocks: Decimal) -> SyncRequest {
        let mut grouped = GroupedTotals::new();
        grouped.insert(AssetCategory::Cash, cash);
        grouped.insert(AssetCategory::Gold, gold);
        grouped.insert(AssetCategory::Stocks, stocks);
        SyncRequest {
            sync_time: NaiveDateTime::parse_from_str(at, "%Y-%m-%d %H:%M:%S").unwrap(),
            holding_updates: Vec::new(),
            grouped_totals: grouped,
            total_balance: cash + gold + stocks,
        }
    }

    fn feb_21() -> Sheet {
        daily_sheet(&[
            ("2026-02-20", [571.73, 1450.00, 3200.00, 5221.73, 1.2533]),
            ("2026-02-21", [571.73, 1455.79, 3221.95, 5249.47, 1.26]),
        ])
    }

    #[test]
    fn test_gap_fill_scenario() {
        let mut sheet = feb_21();
        let req = request(
            "2026-02-23 18:00:00",
            dec!(571.73),
            dec!(1410.13),
            dec!(3220.98),
        );

        let rows = write_daily(&mut sheet, &req).unwrap();
        assert_eq!(rows.len(), 4);

        let carry = &rows[2];
        assert_eq!(carry.date, "2026-02-22");
        assert_eq!(carry.total_usd, dec!(5249.47));
        assert_eq!(carry.nav, dec!(1.26));
        assert_eq!(carry.note, "carry");

        let fresh = &rows[3];
        assert_eq!(fresh.date, "2026-02-23");
        assert_eq!(fresh.gold_usd, dec!(1410.13));
        assert_eq!(fresh.total_usd, dec!(5202.84));
        assert_eq!(fresh.nav, dec!(1.2488));
        assert_eq!(fresh.note, "broker-sync");
        assert_eq!(fresh.row_idx, 5);
    }

    #[test]
    fn test_same_day_overwrites_last_row() {
        let mut sheet = feb_21();
        let req = request(
            "2026-02-21 20:00:00",
            dec!(600.00),
            dec!(1455.79),
            dec!(3221.95),
        );

        let rows = write_daily(&mut sheet, &req).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].cash_usd, dec!(600.00));
        assert_eq!(rows[1].total_usd, dec!(5277.74));
        // 5277.74 * 1.26 / 5249.47
        assert_eq!(rows[1].nav, dec!(1.2668));
        assert_eq!(rows[1].note, "broker-sync");
    }

    #[test]
    fn test_stale_date_is_rejected_without_mutation() {
        let mut sheet = feb_21();
        let before = sheet.clone();
        let req = request("2026-02-20 10:00:00", dec!(1), dec!(1), dec!(1));

        assert_eq!(
            write_daily(&mut sheet, &req).unwrap_err(),
            WorkbookSyncError::StaleDate {
                sync_date: "2026-02-20".to_string(),
                last_date: "2026-02-21".to_string(),
            }
        );
        assert_eq!(sheet, before);
    }

    #[test]
    fn test_zero_total_has_no_nav_ratio() {
        let mut sheet = daily_sheet(&[("2026-02-21", [0.0, 0.0, 0.0, 0.0, 1.0])]);
        let req = request("2026-02-22 10:00:00", dec!(1), dec!(1), dec!(1));
        assert!(matches!(
            write_daily(&mut sheet, &req).unwrap_err(),
            WorkbookSyncError::UndefinedNavRatio { .. }
        ));
    }

    #[test]
    fn test_serial_dates_are_canonicalized() {
        let mut sheet = daily_sheet(&[("2026-02-21", [571.73, 1455.79, 3221.95, 5249.47, 1.26])]);
        sheet.set_value(2, 1, 46074.0);
        let req = request(
            "2026-02-22 10:00:00",
            dec!(571.73),
            dec!(1455.79),
            dec!(3221.95),
        );

        write_daily(&mut sheet, &req).unwrap();
        assert_eq!(sheet.value(2, 1), &CellValue::from("2026-02-21"));
        assert_eq!(sheet.value(3, 1), &CellValue::from("2026-02-22"));
    }

    #[test]
    fn test_inconsistent_fresh_totals_fail_post_write_audit() {
        let mut sheet = feb_21();
        let mut req = request(
            "2026-02-22 10:00:00",
            dec!(571.73),
            dec!(1455.79),
            dec!(3221.95),
        );
        req.total_balance = dec!(9999.99);

        assert!(matches!(
            write_daily(&mut sheet, &req).unwrap_err(),
            WorkbookSyncError::TotalMismatch { date, .. } if date == "2026-02-22"
        ));
    }
}
