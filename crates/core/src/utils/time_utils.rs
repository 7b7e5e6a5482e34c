use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::constants::DEFAULT_DATETIME_FORMAT;

/// Epoch of the 1900 date system as spreadsheets actually count it
/// (day 0 lands on 1899-12-30 because of the 1900 leap-year bug).
pub fn spreadsheet_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Converts a spreadsheet serial number (days plus day fraction) to a timestamp.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let millis = (serial * 86_400_000.0).round() as i64;
    spreadsheet_epoch().checked_add_signed(Duration::milliseconds(millis))
}

/// Converts a timestamp to a spreadsheet serial number.
pub fn datetime_to_serial(value: NaiveDateTime) -> f64 {
    let delta = value - spreadsheet_epoch();
    delta.num_milliseconds() as f64 / 86_400_000.0
}

/// Display format for a cell receiving a sync timestamp: the existing format
/// when it shows a time of day, otherwise [`DEFAULT_DATETIME_FORMAT`].
pub fn timestamp_format(existing: Option<&str>) -> String {
    match existing {
        Some(format) if shows_time_of_day(format) => format.to_string(),
        _ => DEFAULT_DATETIME_FORMAT.to_string(),
    }
}

fn shows_time_of_day(format: &str) -> bool {
    // Quoted literals never count as format tokens.
    format
        .split('"')
        .step_by(2)
        .any(|part| part.contains(['h', 'H']))
}

/// Every date strictly between `start` and `end`.
pub fn get_days_strictly_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    match (start.succ_opt(), end.pred_opt()) {
        (Some(first), Some(last)) => get_days_between(first, last),
        _ => Vec::new(),
    }
}

pub fn get_days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(current);
        if let Some(next) = current.succ_opt() {
            current = next;
        } else {
            break;
        }
    }
    days
}
