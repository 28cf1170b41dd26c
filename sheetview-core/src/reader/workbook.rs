//! Workbook data structures

use super::parser_utils::{encode_cell, parse_cell_range};
use super::styles::RawStyle;
use serde::Serialize;
use std::fmt;

/// Represents a decoded workbook
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    /// Sheets in declaration order
    pub sheets: Vec<Sheet>,
    /// Cell formats referenced by `Cell::style_ref`
    pub styles: Vec<RawStyle>,
}

impl Workbook {
    /// The sheet shown by the viewer
    pub fn first_sheet(&self) -> Option<&Sheet> {
        self.sheets.first()
    }

    /// Get a sheet by name
    pub fn get_sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Get all sheet names
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Raw formatting of a cell; dangling style references count as unstyled
    pub fn style_of(&self, cell: &Cell) -> Option<&RawStyle> {
        cell.style_ref.and_then(|idx| self.styles.get(idx))
    }
}

/// Rectangular bounds of a sheet, 0-based and inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl CellRange {
    pub fn new(start: (u32, u32), end: (u32, u32)) -> Self {
        Self {
            start_row: start.0.min(end.0),
            start_col: start.1.min(end.1),
            end_row: start.0.max(end.0),
            end_col: start.1.max(end.1),
        }
    }

    /// The single cell `A1`
    pub fn single_cell() -> Self {
        Self::new((0, 0), (0, 0))
    }

    /// Parse an A1-style range ("A1:C5" or "B2")
    pub fn parse(reference: &str) -> Option<Self> {
        parse_cell_range(reference.trim())
            .map(|(sr, sc, er, ec)| Self::new((sr, sc), (er, ec)))
    }

    pub fn row_count(&self) -> usize {
        (self.end_row - self.start_row) as usize + 1
    }

    pub fn col_count(&self) -> usize {
        (self.end_col - self.start_col) as usize + 1
    }

    pub fn cell_count(&self) -> usize {
        self.row_count() * self.col_count()
    }

    /// Number of coordinates, computed without overflowing on full-sheet ranges
    pub fn area(&self) -> u64 {
        (u64::from(self.end_row - self.start_row) + 1) * (u64::from(self.end_col - self.start_col) + 1)
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.start_row..=self.end_row).contains(&row)
            && (self.start_col..=self.end_col).contains(&col)
    }

    /// Every coordinate in row-major order
    pub fn coordinates(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.start_row..=self.end_row)
            .flat_map(move |row| (self.start_col..=self.end_col).map(move |col| (row, col)))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = encode_cell(self.start_row, self.start_col);
        if self.start_row == self.end_row && self.start_col == self.end_col {
            write!(f, "{}", start)
        } else {
            write!(f, "{}:{}", start, encode_cell(self.end_row, self.end_col))
        }
    }
}

/// Represents a worksheet with one cell per coordinate of its range
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub range: CellRange,
    /// Row-major, `range.cell_count()` entries
    pub cells: Vec<Cell>,
}

impl Sheet {
    /// A sheet whose every cell is an empty, unstyled placeholder
    pub fn blank(name: impl Into<String>, range: CellRange) -> Self {
        let cells = range
            .coordinates()
            .map(|(row, col)| Cell::placeholder(row, col))
            .collect();
        Self {
            name: name.into(),
            range,
            cells,
        }
    }

    /// Get the cell at an absolute position
    pub fn get_cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.index_of(row, col).and_then(|idx| self.cells.get(idx))
    }

    pub(crate) fn get_cell_mut(&mut self, row: u32, col: u32) -> Option<&mut Cell> {
        self.index_of(row, col).and_then(move |idx| self.cells.get_mut(idx))
    }

    /// Rows of the range, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.range.col_count())
    }

    fn index_of(&self, row: u32, col: u32) -> Option<usize> {
        if !self.range.contains(row, col) {
            return None;
        }
        let rel_row = (row - self.range.start_row) as usize;
        let rel_col = (col - self.range.start_col) as usize;
        Some(rel_row * self.range.col_count() + rel_col)
    }
}

/// Represents a single cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
    pub value: CellValue,
    /// Index into `Workbook::styles`
    pub style_ref: Option<usize>,
}

impl Cell {
    pub fn placeholder(row: u32, col: u32) -> Self {
        Self {
            row,
            col,
            value: CellValue::Empty,
            style_ref: None,
        }
    }

    /// A1-style reference of this cell
    pub fn reference(&self) -> String {
        encode_cell(self.row, self.col)
    }
}

/// Cell value types
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Number(_))
    }

    /// Text shown in the grid
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
        }
    }
}

/// Locale-free shortest representation of a number (`3`, `0.1`, `1e+21`)
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let abs = n.abs();
    if (1e-6..1e21).contains(&abs) {
        return n.to_string();
    }

    let exp = format!("{:e}", n);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
        _ => exp,
    }
}
