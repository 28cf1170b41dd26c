//! XML parsing utilities for the parts of an XLSX package the value decoder does not expose

use anyhow::{Context, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use super::parser_utils::{attr_value, attr_value_local, parse_cell_ref};
use super::styles::{RawStyle, parse_style_sheet};
use super::workbook::CellRange;

/// What a worksheet part says about its own layout
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetLayout {
    /// The `<dimension ref="..."/>` declaration
    pub dimension: Option<CellRange>,
    /// Style index (`s` attribute) of every cell that has one
    pub style_refs: HashMap<(u32, u32), usize>,
}

/// True when the archive is an Office Open XML spreadsheet package
pub fn is_xlsx_package(archive: &mut ZipArchive<impl Read + Seek>) -> bool {
    archive.by_name("xl/workbook.xml").is_ok()
}

/// Resolve sheet name to its XML path in the XLSX archive
pub fn get_xlsx_sheet_path(
    archive: &mut ZipArchive<impl Read + Seek>,
    sheet_name: &str,
) -> Result<String> {
    // 1. Get rId from xl/workbook.xml
    let mut rid = String::new();
    {
        let workbook_xml = archive
            .by_name("xl/workbook.xml")
            .context("Failed to find xl/workbook.xml")?;
        let mut reader = Reader::from_reader(BufReader::new(workbook_xml));
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) => {
                    if e.local_name().as_ref() == b"sheet" {
                        let name = attr_value(&e, b"name").unwrap_or_default();
                        if name == sheet_name {
                            rid = attr_value_local(&e, b"id").unwrap_or_default();
                            break;
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
    }

    if rid.is_empty() {
        return Err(anyhow::anyhow!(
            "Sheet '{}' not found in workbook.xml",
            sheet_name
        ));
    }

    // 2. Resolve rId in xl/_rels/workbook.xml.rels
    let mut target = String::new();
    {
        let rels_xml = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .context("Failed to find xl/_rels/workbook.xml.rels")?;
        let mut reader = Reader::from_reader(BufReader::new(rels_xml));
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) => {
                    if e.local_name().as_ref() == b"Relationship"
                        && attr_value(&e, b"Id").as_deref() == Some(rid.as_str())
                    {
                        target = attr_value(&e, b"Target").unwrap_or_default();
                        break;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
    }

    if target.is_empty() {
        return Err(anyhow::anyhow!(
            "Relationship '{}' not found for sheet '{}'",
            rid,
            sheet_name
        ));
    }

    // Targets are relative to `xl/` unless they are package-absolute
    if let Some(absolute) = target.strip_prefix('/') {
        Ok(absolute.to_string())
    } else if target.starts_with("xl/") {
        Ok(target)
    } else {
        Ok(format!("xl/{}", target))
    }
}

/// Read the declared dimension and the cell style indices of one worksheet part
pub fn read_sheet_layout(
    archive: &mut ZipArchive<impl Read + Seek>,
    sheet_path: &str,
) -> Result<SheetLayout> {
    let sheet_xml = archive
        .by_name(sheet_path)
        .with_context(|| format!("Failed to find {}", sheet_path))?;

    let mut reader = Reader::from_reader(BufReader::new(sheet_xml));
    reader.config_mut().trim_text(true);

    let mut layout = SheetLayout::default();
    let mut buf = Vec::new();

    // Cells and rows may omit their reference; they then follow the previous one
    let mut current_row: u32 = 0;
    let mut next_col: u32 = 0;
    let mut seen_row = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"dimension" => {
                    layout.dimension = attr_value(&e, b"ref").and_then(|r| CellRange::parse(&r));
                }
                b"row" => {
                    current_row = match attr_value(&e, b"r").and_then(|v| v.parse::<u32>().ok()) {
                        Some(r) if r > 0 => r - 1,
                        _ if seen_row => current_row + 1,
                        _ => 0,
                    };
                    seen_row = true;
                    next_col = 0;
                }
                b"c" => {
                    let (row, col) = match attr_value(&e, b"r").and_then(|r| parse_cell_ref(&r)) {
                        Some(pos) => pos,
                        None => (current_row, next_col),
                    };
                    next_col = col + 1;

                    if let Some(style) = attr_value(&e, b"s").and_then(|v| v.parse::<usize>().ok())
                    {
                        layout.style_refs.insert((row, col), style);
                    }
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"sheetData" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(layout)
}

/// Parse `xl/styles.xml`; a package without one has no cell formats
pub fn read_cell_formats(archive: &mut ZipArchive<impl Read + Seek>) -> Result<Vec<RawStyle>> {
    let styles_xml = match archive.by_name("xl/styles.xml") {
        Ok(file) => file,
        Err(_) => return Ok(Vec::new()),
    };
    parse_style_sheet(BufReader::new(styles_xml)).context("Failed to parse xl/styles.xml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn package(parts: &[(&str, &str)]) -> ZipArchive<Cursor<Vec<u8>>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, content) in parts {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        let cursor = zip.finish().unwrap();
        ZipArchive::new(cursor).unwrap()
    }

    const WORKBOOK: &str = r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Budget" sheetId="1" r:id="rId1"/><sheet name="Notes" sheetId="2" r:id="rId2"/></sheets>
</workbook>"#;

    const RELS: &str = r#"<Relationships>
<Relationship Id="rId1" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Target="/xl/worksheets/notes.xml"/>
</Relationships>"#;

    #[test]
    fn test_sheet_path_resolution() {
        let mut archive = package(&[
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", RELS),
        ]);
        assert!(is_xlsx_package(&mut archive));
        assert_eq!(
            get_xlsx_sheet_path(&mut archive, "Budget").unwrap(),
            "xl/worksheets/sheet1.xml"
        );
        assert_eq!(
            get_xlsx_sheet_path(&mut archive, "Notes").unwrap(),
            "xl/worksheets/notes.xml"
        );
        assert!(get_xlsx_sheet_path(&mut archive, "Missing").is_err());
    }

    #[test]
    fn test_sheet_layout() {
        let sheet = r#"<worksheet>
<dimension ref="A1:C3"/>
<sheetData>
<row r="1"><c r="A1" s="2" t="s"><v>0</v></c><c r="C1"><v>1</v></c></row>
<row><c s="5"><v>2</v></c><c s="6"/></row>
<row r="3"><c r="B3" s="1"/></row>
</sheetData>
<mergeCells count="1"><mergeCell ref="A3:B3"/></mergeCells>
</worksheet>"#;
        let mut archive = package(&[("xl/worksheets/sheet1.xml", sheet)]);
        let layout = read_sheet_layout(&mut archive, "xl/worksheets/sheet1.xml").unwrap();

        assert_eq!(layout.dimension, CellRange::parse("A1:C3"));
        assert_eq!(layout.style_refs.len(), 4);
        assert_eq!(layout.style_refs.get(&(0, 0)), Some(&2));
        assert_eq!(layout.style_refs.get(&(0, 2)), None);
        assert_eq!(layout.style_refs.get(&(1, 0)), Some(&5));
        assert_eq!(layout.style_refs.get(&(1, 1)), Some(&6));
        assert_eq!(layout.style_refs.get(&(2, 1)), Some(&1));
    }

    #[test]
    fn test_prefixed_parts() {
        let workbook = r#"<x:workbook xmlns:x="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:rel="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<x:sheets><x:sheet name="Budget" sheetId="1" rel:id="rId1"/></x:sheets>
</x:workbook>"#;
        let rels = r#"<pr:Relationships xmlns:pr="http://schemas.openxmlformats.org/package/2006/relationships">
<pr:Relationship Id="rId1" Target="worksheets/sheet1.xml"/>
</pr:Relationships>"#;
        let sheet = r#"<x:worksheet xmlns:x="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<x:dimension ref="A1:C3"/>
<x:sheetData>
<x:row r="1"><x:c r="A1"><x:v>1</x:v></x:c><x:c r="B1" s="1"><x:v>2</x:v></x:c></x:row>
</x:sheetData>
<x:row r="9"><x:c r="A9" s="4"/></x:row>
</x:worksheet>"#;
        let mut archive = package(&[
            ("xl/workbook.xml", workbook),
            ("xl/_rels/workbook.xml.rels", rels),
            ("xl/worksheets/sheet1.xml", sheet),
        ]);

        let path = get_xlsx_sheet_path(&mut archive, "Budget").unwrap();
        assert_eq!(path, "xl/worksheets/sheet1.xml");

        let layout = read_sheet_layout(&mut archive, &path).unwrap();
        assert_eq!(layout.dimension, CellRange::parse("A1:C3"));
        // Reading stops at the prefixed closing sheetData tag
        assert_eq!(layout.style_refs, HashMap::from([((0, 1), 1)]));
    }

    #[test]
    fn test_missing_styles_part() {
        let mut archive = package(&[("xl/workbook.xml", WORKBOOK)]);
        assert!(read_cell_formats(&mut archive).unwrap().is_empty());
    }
}
