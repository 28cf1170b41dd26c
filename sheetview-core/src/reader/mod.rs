//! Spreadsheet decoder: cell values through calamine, cell formats through the raw XLSX parts

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use std::io::Cursor;
use zip::ZipArchive;

use crate::error::ParseError;

pub mod parser_utils;
pub mod styles;
pub mod workbook;
pub mod xml_parser;

pub use styles::RawStyle;
pub use workbook::{Cell, CellRange, CellValue, Sheet, Workbook};
use xml_parser::SheetLayout;

/// Grid size a sheet may expand to when no limit is configured
pub const DEFAULT_MAX_CELLS: usize = 1_000_000;

/// Decode an in-memory spreadsheet into a workbook model.
///
/// Every sheet gets one cell per coordinate of its declared range. Missing
/// or unreadable formatting leaves cells unstyled rather than failing.
pub fn parse(bytes: &[u8]) -> Result<Workbook, ParseError> {
    parse_with_limit(bytes, DEFAULT_MAX_CELLS)
}

/// Like [`parse`], with no sheet allowed to expand past `max_cells` cells.
///
/// A declared dimension over the limit is replaced by the bounds of the
/// cells that actually hold values; a sheet still too large after that is
/// an error.
pub fn parse_with_limit(bytes: &[u8], max_cells: usize) -> Result<Workbook, ParseError> {
    let mut excel = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ParseError::UnrecognizedContainer(e.to_string()))?;

    let sheet_names = excel.sheet_names();
    if sheet_names.is_empty() {
        return Err(ParseError::NoSheets);
    }

    // Formatting is only available for Office Open XML packages
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .ok()
        .and_then(|mut archive| xml_parser::is_xlsx_package(&mut archive).then_some(archive));

    let styles = match archive.as_mut() {
        Some(archive) => xml_parser::read_cell_formats(archive).unwrap_or_else(|e| {
            log::warn!("ignoring cell formats: {:#}", e);
            Vec::new()
        }),
        None => Vec::new(),
    };

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for name in &sheet_names {
        let values = excel.worksheet_range(name).map_err(|e| ParseError::Sheet {
            sheet: name.clone(),
            message: e.to_string(),
        })?;

        let layout = match archive.as_mut() {
            Some(archive) => read_layout(archive, name),
            None => SheetLayout::default(),
        };

        sheets.push(build_sheet(name, &values, &layout, max_cells)?);
    }

    log::debug!(
        "decoded {} sheet(s) and {} cell format(s)",
        sheets.len(),
        styles.len()
    );

    Ok(Workbook { sheets, styles })
}

fn read_layout(archive: &mut ZipArchive<Cursor<&[u8]>>, sheet_name: &str) -> SheetLayout {
    let layout = xml_parser::get_xlsx_sheet_path(archive, sheet_name)
        .and_then(|path| xml_parser::read_sheet_layout(archive, &path));
    match layout {
        Ok(layout) => layout,
        Err(e) => {
            log::warn!("sheet '{}' has no readable layout: {:#}", sheet_name, e);
            SheetLayout::default()
        }
    }
}

fn build_sheet(
    name: &str,
    values: &Range<Data>,
    layout: &SheetLayout,
    max_cells: usize,
) -> Result<Sheet, ParseError> {
    let occupied = match (values.start(), values.end()) {
        (Some(start), Some(end)) => Some(CellRange::new(start, end)),
        _ => None,
    };
    let limit = max_cells as u64;

    let range = match layout.dimension {
        Some(declared) if declared.area() > limit => {
            log::warn!(
                "sheet '{}' declares {} ({} cells); using the occupied range",
                name,
                declared,
                declared.area()
            );
            occupied.unwrap_or_else(CellRange::single_cell)
        }
        Some(declared) => declared,
        None => occupied.unwrap_or_else(CellRange::single_cell),
    };
    if range.area() > limit {
        return Err(ParseError::RangeTooLarge {
            sheet: name.to_string(),
            cells: range.area(),
            limit: max_cells,
        });
    }

    let mut sheet = Sheet::blank(name, range);
    for (row, col) in range.coordinates() {
        let Some(cell) = sheet.get_cell_mut(row, col) else {
            continue;
        };
        if let Some(data) = values.get_value((row, col)) {
            cell.value = convert_value(data);
        }
        cell.style_ref = layout.style_refs.get(&(row, col)).copied();
    }
    Ok(sheet)
}

fn convert_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => CellValue::Text(e.to_string()),
        Data::Empty => CellValue::Empty,
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    #[test]
    fn test_convert_value() {
        assert_eq!(convert_value(&Data::Int(4)), CellValue::Number(4.0));
        assert_eq!(convert_value(&Data::Float(2.5)), CellValue::Number(2.5));
        assert_eq!(
            convert_value(&Data::Bool(true)),
            CellValue::Text("TRUE".to_string())
        );
        assert_eq!(
            convert_value(&Data::Error(CellErrorType::Div0)),
            CellValue::Text("#DIV/0!".to_string())
        );
        assert_eq!(convert_value(&Data::Empty), CellValue::Empty);
    }

    #[test]
    fn test_plain_text_is_not_a_workbook() {
        let err = parse(b"name,amount\nrent,1200\n").unwrap_err();
        assert!(matches!(err, ParseError::UnrecognizedContainer(_)));
    }

    #[test]
    fn test_build_sheet_prefers_declared_dimension() {
        let mut values: Range<Data> = Range::new((1, 1), (1, 2));
        values.set_value((1, 1), Data::String("x".into()));
        values.set_value((1, 2), Data::Float(3.0));

        let mut layout = SheetLayout {
            dimension: CellRange::parse("A1:C2"),
            ..Default::default()
        };
        layout.style_refs.insert((1, 2), 4);

        let sheet = build_sheet("Data", &values, &layout, DEFAULT_MAX_CELLS).unwrap();
        assert_eq!(sheet.range.to_string(), "A1:C2");
        assert_eq!(sheet.cells.len(), 6);
        assert!(sheet.get_cell(0, 0).unwrap().value.is_empty());
        assert_eq!(sheet.get_cell(1, 1).unwrap().value, CellValue::Text("x".into()));
        assert_eq!(sheet.get_cell(1, 2).unwrap().style_ref, Some(4));
        assert_eq!(sheet.get_cell(1, 1).unwrap().style_ref, None);
    }

    #[test]
    fn test_build_sheet_without_dimension() {
        let mut values: Range<Data> = Range::new((2, 0), (3, 1));
        values.set_value((3, 1), Data::Int(9));
        let sheet = build_sheet("Data", &values, &SheetLayout::default(), DEFAULT_MAX_CELLS).unwrap();
        assert_eq!(sheet.range.to_string(), "A3:B4");

        let empty: Range<Data> = Range::empty();
        let sheet = build_sheet("Blank", &empty, &SheetLayout::default(), DEFAULT_MAX_CELLS).unwrap();
        assert_eq!(sheet.range, CellRange::single_cell());
        assert_eq!(sheet.cells.len(), 1);
    }

    #[test]
    fn test_full_sheet_dimension_falls_back_to_occupied_cells() {
        let mut values: Range<Data> = Range::new((0, 0), (1, 1));
        values.set_value((0, 0), Data::String("Item".into()));
        values.set_value((1, 1), Data::Float(12.5));

        let mut layout = SheetLayout {
            dimension: CellRange::parse("A1:XFD1048576"),
            ..Default::default()
        };
        layout.style_refs.insert((1, 1), 3);

        let sheet = build_sheet("Huge", &values, &layout, DEFAULT_MAX_CELLS).unwrap();
        assert_eq!(sheet.range.to_string(), "A1:B2");
        assert_eq!(sheet.cells.len(), 4);
        assert_eq!(sheet.get_cell(1, 1).unwrap().value, CellValue::Number(12.5));
        assert_eq!(sheet.get_cell(1, 1).unwrap().style_ref, Some(3));

        // Nothing occupied: a single placeholder cell
        let empty: Range<Data> = Range::empty();
        let sheet = build_sheet("Huge", &empty, &layout, DEFAULT_MAX_CELLS).unwrap();
        assert_eq!(sheet.range, CellRange::single_cell());
    }

    #[test]
    fn test_occupied_range_over_limit_is_an_error() {
        let mut values: Range<Data> = Range::new((0, 0), (9, 9));
        values.set_value((9, 9), Data::Int(1));

        let err = build_sheet("Wide", &values, &SheetLayout::default(), 50).unwrap_err();
        match err {
            ParseError::RangeTooLarge { sheet, cells, limit } => {
                assert_eq!(sheet, "Wide");
                assert_eq!(cells, 100);
                assert_eq!(limit, 50);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Exactly at the limit is fine
        assert!(build_sheet("Wide", &values, &SheetLayout::default(), 100).is_ok());
    }
}
