//! In-memory workbook value.
//!
//! The synchronizer loads the whole workbook into this structure, mutates it,
//! and only touches disk again through the atomic commit. Rows and columns are
//! **1-indexed** so header/data row arithmetic reads the same as the sheet.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::WorkbookError;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// True for empty cells and cells holding only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text content if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

/// A cell: its value plus the display format it carries.
///
/// Formula cells keep the formula text (without the leading `=`) next to the
/// last calculated result, which stays in `value` so readers see a plain value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub value: CellValue,
    #[serde(default)]
    pub number_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

/// A 1-indexed cell address.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse an A1-style reference such as `B2` or `$AA$10`.
    pub fn parse(a1: &str) -> Result<Self, WorkbookError> {
        let invalid = || WorkbookError::InvalidCellRef(a1.to_string());
        let s = a1.trim().replace('$', "");
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (letters, digits) = s.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
            col = col
                .checked_mul(26)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(invalid)?;
        }
        let row: u32 = digits.parse().map_err(|_| invalid())?;
        if row == 0 {
            return Err(invalid());
        }
        Ok(Self { row, col })
    }

    /// Column letters for a 1-indexed column (1 = A, 27 = AA).
    pub fn column_name(col: u32) -> String {
        let mut name = String::new();
        let mut n = col;
        while n > 0 {
            let rem = (n - 1) % 26;
            name.insert(0, (b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        name
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::column_name(self.col), self.row)
    }
}

/// One worksheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    cells: BTreeMap<CellRef, Cell>,
}

static EMPTY_VALUE: CellValue = CellValue::Empty;

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    /// Highest row holding a cell record. Cleared cells still count, the way
    /// spreadsheets keep reporting a formatted-but-empty trailing row.
    pub fn max_row(&self) -> u32 {
        self.cells.keys().map(|r| r.row).max().unwrap_or(0)
    }

    pub fn max_column(&self) -> u32 {
        self.cells.keys().map(|r| r.col).max().unwrap_or(0)
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&CellRef::new(row, col))
    }

    pub fn value(&self, row: u32, col: u32) -> &CellValue {
        self.cell(row, col)
            .map(|c| &c.value)
            .unwrap_or(&EMPTY_VALUE)
    }

    pub fn number_format(&self, row: u32, col: u32) -> Option<&str> {
        self.cell(row, col).and_then(|c| c.number_format.as_deref())
    }

    pub fn formula(&self, row: u32, col: u32) -> Option<&str> {
        self.cell(row, col).and_then(|c| c.formula.as_deref())
    }

    /// Stores a literal value. Any formula in the cell is replaced.
    pub fn set_value(&mut self, row: u32, col: u32, value: impl Into<CellValue>) {
        let cell = self.cells.entry(CellRef::new(row, col)).or_default();
        cell.value = value.into();
        cell.formula = None;
    }

    /// Writes a literal value and its display format in one step.
    pub fn write(&mut self, row: u32, col: u32, value: impl Into<CellValue>, format: &str) {
        let cell = self.cells.entry(CellRef::new(row, col)).or_default();
        cell.value = value.into();
        cell.number_format = Some(format.to_string());
        cell.formula = None;
    }

    /// Stores a formula together with its last calculated result.
    pub fn set_formula(
        &mut self,
        row: u32,
        col: u32,
        formula: &str,
        cached: impl Into<CellValue>,
    ) {
        let formula = formula.trim();
        let cell = self.cells.entry(CellRef::new(row, col)).or_default();
        cell.value = cached.into();
        cell.formula = Some(formula.strip_prefix('=').unwrap_or(formula).to_string());
    }

    /// Empties a cell's value while keeping the cell (and its format) in place.
    pub fn clear_value(&mut self, row: u32, col: u32) {
        if let Some(cell) = self.cells.get_mut(&CellRef::new(row, col)) {
            cell.value = CellValue::Empty;
            cell.formula = None;
        }
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (&CellRef, &Cell)> {
        self.cells.iter()
    }
}

/// A workbook: an ordered list of uniquely named sheets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sheet, replacing any existing sheet with the same name.
    pub fn add_sheet(&mut self, sheet: Sheet) {
        if let Some(existing) = self.sheets.iter_mut().find(|s| s.name == sheet.name) {
            *existing = sheet;
        } else {
            self.sheets.push(sheet);
        }
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    /// Names from `required` that are not present, in the order given.
    pub fn missing_sheets(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| self.sheet(name).is_none())
            .map(|name| name.to_string())
            .collect()
    }
}
