//! In-memory workbook of named sheets.
//!
//! Cells are addressed by zero-based `(row, column)`; [`cell_ref`] and
//! [`absolute_ref`] turn those into A1 references for formulas.

use chrono::NaiveDate;
use dcfgen_data::Value;
use serde::Serialize;

/// Content of one cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Cell {
    /// Nothing
    #[default]
    Empty,
    /// Number
    Number(f64),
    /// Text
    Text(String),
    /// Calendar date
    Date(NaiveDate),
    /// Formula with the value the model computed for it
    Formula {
        /// Formula text, starting with `=`
        formula: String,
        /// Cached result, `None` when the model could not compute it
        value: Option<f64>,
    },
}

impl Cell {
    /// Text cell.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Formula cell with a cached value.
    pub fn formula(formula: impl Into<String>, value: Option<f64>) -> Self {
        Self::Formula {
            formula: formula.into(),
            value,
        }
    }

    /// True for [`Cell::Empty`].
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Numeric value, including the cached value of a formula.
    pub const fn number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Formula { value, .. } => *value,
            _ => None,
        }
    }

    /// Rendering used in CSV output. Formulas are written as their text.
    pub fn to_csv_field(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::Formula { formula, .. } => formula.clone(),
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<Option<f64>> for Cell {
    fn from(n: Option<f64>) -> Self {
        n.map_or(Self::Empty, Self::Number)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => Self::Number(n),
            Value::Date(d) => Self::Date(d),
            Value::Text(s) if s.is_empty() => Self::Empty,
            Value::Text(s) => Self::Text(s),
        }
    }
}

impl From<Option<Value>> for Cell {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Self::Empty, Self::from)
    }
}

/// A named grid of cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Create an empty sheet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Sheet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rows, each only as long as its last written cell.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Write a cell, growing the grid as needed.
    pub fn set(&mut self, row: usize, col: usize, cell: impl Into<Cell>) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize_with(col + 1, Cell::default);
        }
        cells[col] = cell.into();
    }

    /// Write consecutive cells of one row starting at `col`.
    pub fn set_row<I, C>(&mut self, row: usize, col: usize, cells: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        for (offset, cell) in cells.into_iter().enumerate() {
            self.set(row, col + offset, cell);
        }
    }

    /// Cell at `(row, col)`, `None` outside the written area.
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row)?.get(col)
    }

    /// Cell by A1 reference, e.g. `"B7"`.
    pub fn get_ref(&self, reference: &str) -> Option<&Cell> {
        let (row, col) = parse_ref(reference)?;
        self.get(row, col)
    }
}

/// An ordered collection of sheets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create an empty workbook.
    pub const fn new() -> Self {
        Self { sheets: Vec::new() }
    }

    /// Add a sheet, replacing any sheet with the same name in place.
    pub fn add_sheet(&mut self, sheet: Sheet) {
        match self.sheets.iter_mut().find(|s| s.name == sheet.name) {
            Some(existing) => *existing = sheet,
            None => self.sheets.push(sheet),
        }
    }

    /// Sheets in insertion order.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Number of sheets.
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// True when no sheet has been added.
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// Spreadsheet column name of a zero-based index: 0 is `A`, 26 is `AA`.
pub fn column_name(index: usize) -> String {
    let mut n = index + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Relative A1 reference of a zero-based cell position.
pub fn cell_ref(row: usize, col: usize) -> String {
    format!("{}{}", column_name(col), row + 1)
}

/// Absolute A1 reference, e.g. `$B$14`.
pub fn absolute_ref(row: usize, col: usize) -> String {
    format!("${}${}", column_name(col), row + 1)
}

fn parse_ref(reference: &str) -> Option<(usize, usize)> {
    let reference = reference.replace('$', "");
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_uppercase()) {
        return None;
    }
    let col = letters
        .bytes()
        .fold(0usize, |acc, b| acc * 26 + usize::from(b - b'A' + 1));
    let row: usize = digits.parse().ok()?;
    Some((row.checked_sub(1)?, col - 1))
}
