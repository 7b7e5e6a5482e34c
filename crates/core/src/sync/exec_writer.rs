//! Exec summary timestamp.

use chrono::NaiveDateTime;
use log::debug;

use crate::constants::{
    EXEC_SCAN_MAX_COLUMNS, EXEC_SCAN_MAX_ROWS, EXEC_TIMESTAMP_CELL, EXEC_TIMESTAMP_LABEL,
};
use crate::utils::time_utils::timestamp_format;
use crate::workbook::{CellRef, Sheet};

/// First cell (row-major) within the scan window whose trimmed text equals
/// `label`.
pub fn find_label_cell(sheet: &Sheet, label: &str) -> Option<CellRef> {
    let max_row = sheet.max_row().min(EXEC_SCAN_MAX_ROWS);
    let max_col = sheet.max_column().min(EXEC_SCAN_MAX_COLUMNS);
    (1..=max_row)
        .flat_map(|row| (1..=max_col).map(move |col| CellRef::new(row, col)))
        .find(|addr| {
            sheet
                .value(addr.row, addr.col)
                .as_text()
                .is_some_and(|text| text.trim() == label)
        })
}

/// Writes `sync_time` to the fixed summary cell and, when the label is
/// present, to the cell right of it. Returns the labelled target, if any.
pub fn write_exec(sheet: &mut Sheet, sync_time: NaiveDateTime) -> Option<CellRef> {
    let fixed = EXEC_TIMESTAMP_CELL;
    let fixed_fmt = timestamp_format(sheet.number_format(fixed.row, fixed.col));
    sheet.write(fixed.row, fixed.col, sync_time, &fixed_fmt);

    let label = find_label_cell(sheet, EXEC_TIMESTAMP_LABEL)?;
    let target = CellRef::new(label.row, label.col + 1);
    let target_fmt = match sheet.number_format(target.row, target.col) {
        Some(format) => timestamp_format(Some(format)),
        None => fixed_fmt,
    };
    sheet.write(target.row, target.col, sync_time, &target_fmt);
    debug!("Exec label found at {}, timestamp written to {}", label, target);
    Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_DATETIME_FORMAT;
    use crate::workbook::CellValue;
    use chrono::NaiveDate;

    fn sync_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 23)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_fixed_cell_and_label_neighbour() {
        let mut sheet = Sheet::new("Exec");
        sheet.set_value(1, 1, "Summary");
        sheet.set_value(5, 3, " 更新时间 ");
        sheet.write(5, 4, "old", "yyyy/mm/dd hh:mm");

        let target = write_exec(&mut sheet, sync_time());

        assert_eq!(target, Some(CellRef::new(5, 4)));
        assert_eq!(sheet.value(2, 2), &CellValue::DateTime(sync_time()));
        assert_eq!(sheet.number_format(2, 2), Some(DEFAULT_DATETIME_FORMAT));
        assert_eq!(sheet.value(5, 4), &CellValue::DateTime(sync_time()));
        assert_eq!(sheet.number_format(5, 4), Some("yyyy/mm/dd hh:mm"));
    }

    #[test]
    fn test_missing_label_is_not_an_error() {
        let mut sheet = Sheet::new("Exec");
        sheet.write(2, 2, CellValue::Empty, "yyyy-mm-dd hh:mm");
        assert_eq!(write_exec(&mut sheet, sync_time()), None);
        assert_eq!(sheet.number_format(2, 2), Some("yyyy-mm-dd hh:mm"));
    }

    #[test]
    fn test_label_outside_scan_window_is_ignored() {
        let mut sheet = Sheet::new("Exec");
        sheet.set_value(41, 1, "更新时间");
        sheet.set_value(1, 21, "更新时间");
        assert_eq!(find_label_cell(&sheet, "更新时间"), None);

        sheet.set_value(40, 20, "更新时间");
        assert_eq!(find_label_cell(&sheet, "更新时间"), Some(CellRef::new(40, 20)));
    }
}
