//! Strict invariants over the Daily history and its Chart mirror.
//!
//! Runs before the Daily sheet is touched and again after every write, so
//! any violation aborts the sync while the changes are still in memory.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashSet;

use super::normalizer::{coerce_decimal, last_non_empty_row, normalize_date_str};
use super::schema::ChartColumns;
use super::{ChartPoint, DailyRow, WorkbookSyncError};
use crate::constants::{
    DAILY_SHEET, FIRST_DATA_ROW, MONEY_PRECISION, NAV_PRECISION, TOTAL_TOLERANCE,
};
use crate::workbook::Sheet;

type Result<T> = std::result::Result<T, WorkbookSyncError>;

/// Parses a row's normalized date, rejecting the sentinel the reader emits
/// for unparseable cells.
pub fn parse_row_date(row: &DailyRow) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|_| {
        WorkbookSyncError::InvalidDate {
            sheet: DAILY_SHEET.to_string(),
            row: row.row_idx,
            value: row.date.clone(),
        }
    })
}

/// Checks, per row and in order: unique date, parseable and non-decreasing
/// date, parts summing to the total within tolerance, positive NAV.
pub fn validate_daily_integrity(rows: &[DailyRow]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(rows.len());
    let mut previous: Option<(NaiveDate, &str)> = None;

    for row in rows {
        if !seen.insert(row.date.as_str()) {
            return Err(WorkbookSyncError::DuplicateDate(row.date.clone()));
        }

        let date = parse_row_date(row)?;
        if let Some((prev_date, prev_str)) = previous {
            if date < prev_date {
                return Err(WorkbookSyncError::OutOfOrder {
                    previous: prev_str.to_string(),
                    current: row.date.clone(),
                });
            }
        }
        previous = Some((date, row.date.as_str()));

        let parts = row.parts_total().round_dp(MONEY_PRECISION);
        let total = row.total_usd.round_dp(MONEY_PRECISION);
        let gap = (parts - total).abs();
        if gap > TOTAL_TOLERANCE {
            return Err(WorkbookSyncError::TotalMismatch {
                date: row.date.clone(),
                parts,
                total,
                gap,
            });
        }

        if row.nav <= Decimal::ZERO {
            return Err(WorkbookSyncError::InvalidNav {
                date: row.date.clone(),
                nav: row.nav,
            });
        }
    }
    Ok(())
}

/// Reads the Chart sheet's `(date, nav)` pairs, NAV rounded to 4 places.
/// Rows with a blank date are skipped.
pub fn read_chart_points(sheet: &Sheet, cols: &ChartColumns) -> Vec<ChartPoint> {
    let last_row = last_non_empty_row(sheet, cols.date);
    (FIRST_DATA_ROW..=last_row)
        .filter_map(|row| {
            let date = normalize_date_str(sheet.value(row, cols.date));
            if date.is_empty() {
                return None;
            }
            let nav = coerce_decimal(sheet.value(row, cols.nav)).round_dp(NAV_PRECISION);
            Some(ChartPoint { date, nav })
        })
        .collect()
}

/// Fails unless the Chart sheet mirrors `daily` pointwise and in order.
pub fn validate_chart_matches_daily(chart: &Sheet, daily: &[DailyRow]) -> Result<()> {
    let cols = ChartColumns::resolve(chart)?;
    let chart_points = read_chart_points(chart, &cols);
    let daily_points: Vec<ChartPoint> = daily.iter().map(DailyRow::chart_point).collect();

    if chart_points == daily_points {
        return Ok(());
    }

    let detail = match chart_points
        .iter()
        .zip(daily_points.iter())
        .position(|(c, d)| c != d)
    {
        Some(idx) => format!(
            "position {}: chart ({}, {}) vs daily ({}, {})",
            idx + 1,
            chart_points[idx].date,
            chart_points[idx].nav,
            daily_points[idx].date,
            daily_points[idx].nav
        ),
        None => format!(
            "chart has {} rows, daily has {}",
            chart_points.len(),
            daily_points.len()
        ),
    };
    Err(WorkbookSyncError::cross_sheet(detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(idx: u32, date: &str, parts: [Decimal; 3], total: Decimal, nav: Decimal) -> DailyRow {
        DailyRow {
            row_idx: idx,
            date: date.to_string(),
            cash_usd: parts[0],
            gold_usd: parts[1],
            stocks_usd: parts[2],
            total_usd: total,
            nav,
            note: String::new(),
        }
    }

    fn valid_rows() -> Vec<DailyRow> {
        vec![
            row(
                2,
                "2026-02-20",
                [dec!(571.73), dec!(1450.00), dec!(3200.00)],
                dec!(5221.73),
                dec!(1.2533),
            ),
            row(
                3,
                "2026-02-21",
                [dec!(571.73), dec!(1455.79), dec!(3221.95)],
                dec!(5249.47),
                dec!(1.26),
            ),
        ]
    }

    #[test]
    fn test_valid_history_passes() {
        assert!(validate_daily_integrity(&valid_rows()).is_ok());
    }

    #[test]
    fn test_duplicate_date() {
        let mut rows = valid_rows();
        rows[1].date = "2026-02-20".to_string();
        assert_eq!(
            validate_daily_integrity(&rows).unwrap_err(),
            WorkbookSyncError::DuplicateDate("2026-02-20".to_string())
        );
    }

    #[test]
    fn test_out_of_order() {
        let mut rows = valid_rows();
        rows[1].date = "2026-02-19".to_string();
        assert_eq!(
            validate_daily_integrity(&rows).unwrap_err(),
            WorkbookSyncError::OutOfOrder {
                previous: "2026-02-20".to_string(),
                current: "2026-02-19".to_string(),
            }
        );
    }

    #[test]
    fn test_unparseable_date_is_rejected() {
        let mut rows = valid_rows();
        rows[0].date = "20/02/2026".to_string();
        assert_eq!(
            validate_daily_integrity(&rows).unwrap_err(),
            WorkbookSyncError::InvalidDate {
                sheet: "Daily".to_string(),
                row: 2,
                value: "20/02/2026".to_string(),
            }
        );
    }

    #[test]
    fn test_total_tolerance_boundary() {
        let mut rows = valid_rows();
        rows[1].total_usd = dec!(5249.52);
        assert!(validate_daily_integrity(&rows).is_ok());

        rows[1].total_usd = dec!(5249.53);
        assert_eq!(
            validate_daily_integrity(&rows).unwrap_err(),
            WorkbookSyncError::TotalMismatch {
                date: "2026-02-21".to_string(),
                parts: dec!(5249.47),
                total: dec!(5249.53),
                gap: dec!(0.06),
            }
        );
    }

    #[test]
    fn test_non_positive_nav() {
        let mut rows = valid_rows();
        rows[0].nav = Decimal::ZERO;
        assert!(matches!(
            validate_daily_integrity(&rows).unwrap_err(),
            WorkbookSyncError::InvalidNav { date, .. } if date == "2026-02-20"
        ));
    }

    fn chart_sheet(points: &[(&str, f64)]) -> Sheet {
        let mut sheet = Sheet::new("Chart");
        sheet.set_value(1, 1, "date");
        sheet.set_value(1, 2, "nav");
        for (idx, (date, nav)) in points.iter().enumerate() {
            sheet.set_value(idx as u32 + 2, 1, *date);
            sheet.set_value(idx as u32 + 2, 2, *nav);
        }
        sheet
    }

    #[test]
    fn test_chart_mirror_matches() {
        let chart = chart_sheet(&[("2026-02-20", 1.2533), ("2026-02-21", 1.26)]);
        assert!(validate_chart_matches_daily(&chart, &valid_rows()).is_ok());
    }

    #[test]
    fn test_chart_divergence_is_described() {
        let chart = chart_sheet(&[("2026-02-20", 1.2533), ("2026-02-21", 1.25)]);
        let err = validate_chart_matches_daily(&chart, &valid_rows()).unwrap_err();
        assert_eq!(
            err,
            WorkbookSyncError::cross_sheet(
                "position 2: chart (2026-02-21, 1.25) vs daily (2026-02-21, 1.26)"
            )
        );

        let short = chart_sheet(&[("2026-02-20", 1.2533)]);
        let err = validate_chart_matches_daily(&short, &valid_rows()).unwrap_err();
        assert_eq!(
            err,
            WorkbookSyncError::cross_sheet("chart has 1 rows, daily has 2")
        );
    }
}
