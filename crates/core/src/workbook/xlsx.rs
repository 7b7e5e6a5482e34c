//! XLSX codec for the in-memory [`Workbook`].
//!
//! Reading goes through `calamine`, writing through `rust_xlsxwriter`.
//! Number formats survive a write; on read only date-typed cells get a
//! format back (calamine does not expose the others). Formulas are read next
//! to their cached results and written back with those results attached.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use log::debug;
use rust_xlsxwriter::{Format, Formula, Workbook as XlsxWorkbook, Worksheet};

use super::{Cell, CellRef, CellValue, Sheet, Workbook, WorkbookError};
use crate::constants::DEFAULT_DATETIME_FORMAT;
use crate::utils::time_utils::{datetime_to_serial, serial_to_datetime};

const DATE_ONLY_FORMAT: &str = "yyyy-mm-dd";

/// Loads an `.xlsx` file from disk.
pub fn read_workbook(path: &Path) -> Result<Workbook, WorkbookError> {
    let bytes = std::fs::read(path)?;
    read_workbook_from_bytes(bytes)
}

/// Decodes an `.xlsx` package already held in memory.
pub fn read_workbook_from_bytes(bytes: Vec<u8>) -> Result<Workbook, WorkbookError> {
    let mut xlsx: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| WorkbookError::Read(format!("Failed to open workbook: {}", e)))?;

    let sheet_names: Vec<String> = xlsx.sheet_names().to_vec();
    let mut workbook = Workbook::new();

    for sheet_name in &sheet_names {
        let range = xlsx.worksheet_range(sheet_name).map_err(|e| {
            WorkbookError::Read(format!("Failed to read sheet '{}': {}", sheet_name, e))
        })?;

        let mut sheet = Sheet::new(sheet_name.as_str());
        // Ranges start at the first used cell, not necessarily A1.
        let (row_offset, col_offset) = range.start().unwrap_or((0, 0));

        for (row_idx, col_idx, data) in range.used_cells() {
            let row = row_offset + row_idx as u32 + 1;
            let col = col_offset + col_idx as u32 + 1;
            if let Some(cell) = decode_cell(data) {
                if let Some(format) = cell.number_format {
                    sheet.write(row, col, cell.value, &format);
                } else {
                    sheet.set_value(row, col, cell.value);
                }
            }
        }

        // Not every sheet part has formulas; a failed lookup leaves the values as read.
        if let Ok(formulas) = xlsx.worksheet_formula(sheet_name) {
            let (row_offset, col_offset) = formulas.start().unwrap_or((0, 0));
            for (row_idx, col_idx, formula) in formulas.used_cells() {
                if formula.trim().is_empty() {
                    continue;
                }
                let row = row_offset + row_idx as u32 + 1;
                let col = col_offset + col_idx as u32 + 1;
                let cached = sheet.value(row, col).clone();
                sheet.set_formula(row, col, formula, cached);
            }
        }

        debug!(
            "Read sheet '{}' ({} rows x {} columns)",
            sheet_name,
            sheet.max_row(),
            sheet.max_column()
        );
        workbook.add_sheet(sheet);
    }

    Ok(workbook)
}

fn decode_cell(data: &Data) -> Option<Cell> {
    let (value, number_format) = match data {
        Data::Empty => return None,
        Data::String(s) => (CellValue::Text(s.clone()), None),
        Data::Float(n) => (CellValue::Number(*n), None),
        Data::Int(n) => (CellValue::Number(*n as f64), None),
        Data::Bool(b) => (CellValue::Bool(*b), None),
        Data::Error(e) => (CellValue::Text(e.to_string()), None),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            match serial_to_datetime(serial) {
                Some(value) => {
                    let format = if serial.fract().abs() > 0.0001 {
                        DEFAULT_DATETIME_FORMAT
                    } else {
                        DATE_ONLY_FORMAT
                    };
                    (CellValue::DateTime(value), Some(format.to_string()))
                }
                None => (CellValue::Number(serial), None),
            }
        }
        Data::DateTimeIso(s) => match chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        {
            Ok(value) => (
                CellValue::DateTime(value),
                Some(DEFAULT_DATETIME_FORMAT.to_string()),
            ),
            Err(_) => (CellValue::Text(s.clone()), None),
        },
        Data::DurationIso(s) => (CellValue::Text(s.clone()), None),
    };
    Some(Cell {
        value,
        number_format,
        formula: None,
    })
}

/// Encodes the workbook as an `.xlsx` package.
pub fn write_workbook_to_buffer(workbook: &Workbook) -> Result<Vec<u8>, WorkbookError> {
    let mut xlsx_workbook = XlsxWorkbook::new();

    for sheet in workbook.sheets() {
        let worksheet = xlsx_workbook
            .add_worksheet()
            .set_name(&sheet.name)
            .map_err(|e| {
                WorkbookError::Encode(format!("Failed to create sheet '{}': {}", sheet.name, e))
            })?;
        write_sheet_cells(sheet, worksheet)?;
    }

    xlsx_workbook
        .save_to_buffer()
        .map_err(|e| WorkbookError::Encode(format!("Failed to encode workbook: {}", e)))
}

fn write_sheet_cells(sheet: &Sheet, worksheet: &mut Worksheet) -> Result<(), WorkbookError> {
    for (addr, cell) in sheet.cells() {
        let (row, col) = zero_based(addr)?;
        let format = cell
            .number_format
            .as_deref()
            .map(|f| Format::new().set_num_format(f));
        let cell_error = |e: rust_xlsxwriter::XlsxError| {
            WorkbookError::Encode(format!("Failed to write {}!{}: {}", sheet.name, addr, e))
        };

        if let Some(formula) = cell.formula.as_deref() {
            let formula = formula_with_result(formula, &cell.value);
            match &format {
                Some(format) => worksheet.write_formula_with_format(row, col, formula, format),
                None => worksheet.write_formula(row, col, formula),
            }
            .map_err(cell_error)?;
            continue;
        }

        match (&cell.value, &format) {
            (CellValue::Empty, Some(format)) => {
                worksheet.write_blank(row, col, format).map_err(cell_error)?;
            }
            (CellValue::Empty, None) => {}
            (CellValue::Number(n), Some(format)) => {
                worksheet
                    .write_number_with_format(row, col, *n, format)
                    .map_err(cell_error)?;
            }
            (CellValue::Number(n), None) => {
                worksheet.write_number(row, col, *n).map_err(cell_error)?;
            }
            (CellValue::Text(s), Some(format)) => {
                worksheet
                    .write_string_with_format(row, col, s.as_str(), format)
                    .map_err(cell_error)?;
            }
            (CellValue::Text(s), None) => {
                worksheet.write_string(row, col, s.as_str()).map_err(cell_error)?;
            }
            (CellValue::Bool(b), Some(format)) => {
                worksheet
                    .write_boolean_with_format(row, col, *b, format)
                    .map_err(cell_error)?;
            }
            (CellValue::Bool(b), None) => {
                worksheet.write_boolean(row, col, *b).map_err(cell_error)?;
            }
            (CellValue::DateTime(dt), format) => {
                // Dates always need a date format or they read back as plain numbers.
                let format = format
                    .clone()
                    .unwrap_or_else(|| Format::new().set_num_format(DEFAULT_DATETIME_FORMAT));
                worksheet
                    .write_number_with_format(row, col, datetime_to_serial(*dt), &format)
                    .map_err(cell_error)?;
            }
        }
    }
    Ok(())
}

fn formula_with_result(formula: &str, cached: &CellValue) -> Formula {
    let result = match cached {
        CellValue::Empty => return Formula::new(formula),
        CellValue::DateTime(dt) => datetime_to_serial(*dt).to_string(),
        other => other.to_string(),
    };
    Formula::new(formula).set_result(result)
}

fn zero_based(addr: &CellRef) -> Result<(u32, u16), WorkbookError> {
    let col = u16::try_from(addr.col.saturating_sub(1))
        .map_err(|_| WorkbookError::InvalidCellRef(addr.to_string()))?;
    Ok((addr.row.saturating_sub(1), col))
}
