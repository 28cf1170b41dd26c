//! Turning a decoded workbook into a styled grid

use serde::Serialize;

use crate::config::{ColorConfig, RenderConfig};
use crate::reader::{CellRange, Sheet, Workbook};
use crate::style::{StyleRecord, StyleResolver};

pub mod html;

pub use html::{escape_html, render_page};

/// One displayed cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCell {
    pub row: u32,
    pub col: u32,
    pub reference: String,
    pub text: String,
    pub style: StyleRecord,
    /// Explicit fill, otherwise the zebra stripe of the row
    pub background: String,
}

/// The displayed sheet, one row per range row
#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub sheet_name: String,
    pub range: CellRange,
    pub rows: Vec<Vec<GridCell>>,
    /// Sheets that are decoded but not displayed
    pub other_sheets: Vec<String>,
}

impl TableView {
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn get(&self, row: u32, col: u32) -> Option<&GridCell> {
        if !self.range.contains(row, col) {
            return None;
        }
        self.rows
            .get((row - self.range.start_row) as usize)
            .and_then(|cells| cells.get((col - self.range.start_col) as usize))
    }
}

/// Renders the first sheet of a workbook
#[derive(Debug, Clone)]
pub struct GridRenderer {
    config: RenderConfig,
    resolver: StyleResolver,
}

impl Default for GridRenderer {
    fn default() -> Self {
        Self::new(&RenderConfig::default(), &ColorConfig::default())
    }
}

impl GridRenderer {
    pub fn new(render: &RenderConfig, colors: &ColorConfig) -> Self {
        Self {
            config: render.clone(),
            resolver: StyleResolver::new(colors),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// `None` only for a workbook without sheets
    pub fn render(&self, workbook: &Workbook) -> Option<TableView> {
        let sheet = workbook.first_sheet()?;
        let other_sheets = workbook
            .sheets
            .iter()
            .skip(1)
            .map(|s| s.name.clone())
            .collect();

        Some(TableView {
            sheet_name: sheet.name.clone(),
            range: sheet.range,
            rows: self.render_rows(workbook, sheet),
            other_sheets,
        })
    }

    fn render_rows(&self, workbook: &Workbook, sheet: &Sheet) -> Vec<Vec<GridCell>> {
        sheet
            .rows()
            .enumerate()
            .map(|(displayed_row, cells)| {
                let stripe = if displayed_row % 2 == 0 {
                    &self.config.zebra_even
                } else {
                    &self.config.zebra_odd
                };

                cells
                    .iter()
                    .map(|cell| {
                        let style = self.resolver.resolve(workbook.style_of(cell), &cell.value);
                        let background = style
                            .background_color
                            .clone()
                            .unwrap_or_else(|| stripe.clone());
                        GridCell {
                            row: cell.row,
                            col: cell.col,
                            reference: cell.reference(),
                            text: cell.value.display_text(),
                            style,
                            background,
                        }
                    })
                    .collect()
            })
            .collect()
    }
}
