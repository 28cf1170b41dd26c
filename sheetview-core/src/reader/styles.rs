//! Decoding of the XLSX style table (`xl/styles.xml`) into per-format records

use anyhow::Result;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::io::BufRead;

use super::parser_utils::{attr_flag, attr_value};
use crate::style::ColorSource;

/// Formatting of one `cellXfs` entry, with font, fill and border inlined
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStyle {
    pub fill: Option<RawFill>,
    pub font: Option<RawFont>,
    pub alignment: Option<RawAlignment>,
    pub border: Option<RawBorder>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFill {
    pub foreground: Option<ColorSource>,
    pub background: Option<ColorSource>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFont {
    pub bold: bool,
    pub italic: bool,
    /// Points
    pub size: Option<f64>,
    pub color: Option<ColorSource>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawAlignment {
    pub horizontal: Option<String>,
    pub vertical: Option<String>,
}

/// Edges are `Some` only when they declare a line style
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBorder {
    pub top: Option<BorderEdge>,
    pub bottom: Option<BorderEdge>,
    pub left: Option<BorderEdge>,
    pub right: Option<BorderEdge>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BorderEdge {
    pub color: Option<ColorSource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"top" => Some(Edge::Top),
            b"bottom" => Some(Edge::Bottom),
            b"left" | b"start" => Some(Edge::Left),
            b"right" | b"end" => Some(Edge::Right),
            _ => None,
        }
    }
}

impl RawBorder {
    fn edge_mut(&mut self, edge: Edge) -> &mut Option<BorderEdge> {
        match edge {
            Edge::Top => &mut self.top,
            Edge::Bottom => &mut self.bottom,
            Edge::Left => &mut self.left,
            Edge::Right => &mut self.right,
        }
    }
}

/// Where the event loop currently is inside the style sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Other,
    Fonts,
    Fills,
    Borders,
    CellXfs,
}

#[derive(Debug, Default)]
struct XfRef {
    font_id: Option<usize>,
    fill_id: Option<usize>,
    border_id: Option<usize>,
    alignment: Option<RawAlignment>,
}

/// Read a color element (`<color>`, `<fgColor>`, `<bgColor>`)
fn parse_color(e: &BytesStart) -> Option<ColorSource> {
    if let Some(rgb) = attr_value(e, b"rgb") {
        return Some(ColorSource::Rgb(rgb));
    }
    if let Some(idx) = attr_value(e, b"indexed").and_then(|v| v.parse::<u32>().ok()) {
        return Some(ColorSource::Indexed(idx));
    }
    if let Some(id) = attr_value(e, b"theme").and_then(|v| v.parse::<u32>().ok()) {
        return Some(ColorSource::Theme(id));
    }
    // `auto` and bare elements carry no concrete color
    None
}

fn parse_index(e: &BytesStart, key: &[u8]) -> Option<usize> {
    attr_value(e, key).and_then(|v| v.parse::<usize>().ok())
}

/// `<b/>` means on, `<b val="0"/>` means off
fn flag_element(e: &BytesStart) -> bool {
    attr_flag(e, b"val").unwrap_or(true)
}

/// Parse a style sheet into one `RawStyle` per `cellXfs` entry, in order.
pub fn parse_style_sheet<R: BufRead>(source: R) -> Result<Vec<RawStyle>> {
    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut section = Section::Other;

    let mut fonts: Vec<RawFont> = Vec::new();
    let mut fills: Vec<RawFill> = Vec::new();
    let mut borders: Vec<RawBorder> = Vec::new();
    let mut xfs: Vec<XfRef> = Vec::new();

    let mut font: Option<RawFont> = None;
    let mut fill: Option<RawFill> = None;
    let mut border: Option<RawBorder> = None;
    let mut edge: Option<Edge> = None;
    let mut xf: Option<XfRef> = None;

    loop {
        let event = reader.read_event_into(&mut buf)?;
        let is_empty = matches!(event, Event::Empty(_));
        match event {
            Event::Start(e) | Event::Empty(e) => {
                let name = e.local_name();
                let tag = name.as_ref();
                match (section, tag) {
                    (_, b"fonts") if !is_empty => section = Section::Fonts,
                    (_, b"fills") if !is_empty => section = Section::Fills,
                    (_, b"borders") if !is_empty => section = Section::Borders,
                    (_, b"cellXfs") if !is_empty => section = Section::CellXfs,

                    (Section::Fonts, b"font") => {
                        if is_empty {
                            fonts.push(RawFont::default());
                        } else {
                            font = Some(RawFont::default());
                        }
                    }
                    (Section::Fonts, b"b") => {
                        if let Some(f) = font.as_mut() {
                            f.bold = flag_element(&e);
                        }
                    }
                    (Section::Fonts, b"i") => {
                        if let Some(f) = font.as_mut() {
                            f.italic = flag_element(&e);
                        }
                    }
                    (Section::Fonts, b"sz") => {
                        if let Some(f) = font.as_mut() {
                            f.size = attr_value(&e, b"val").and_then(|v| v.parse::<f64>().ok());
                        }
                    }
                    (Section::Fonts, b"color") => {
                        if let Some(f) = font.as_mut() {
                            f.color = parse_color(&e);
                        }
                    }

                    (Section::Fills, b"fill") => {
                        if is_empty {
                            fills.push(RawFill::default());
                        } else {
                            fill = Some(RawFill::default());
                        }
                    }
                    (Section::Fills, b"fgColor") => {
                        if let Some(f) = fill.as_mut() {
                            f.foreground = parse_color(&e);
                        }
                    }
                    (Section::Fills, b"bgColor") => {
                        if let Some(f) = fill.as_mut() {
                            f.background = parse_color(&e);
                        }
                    }

                    (Section::Borders, b"border") => {
                        if is_empty {
                            borders.push(RawBorder::default());
                        } else {
                            border = Some(RawBorder::default());
                        }
                    }
                    (Section::Borders, b"color") => {
                        if let (Some(b), Some(current)) = (border.as_mut(), edge) {
                            if let Some(declared) = b.edge_mut(current).as_mut() {
                                declared.color = parse_color(&e);
                            }
                        }
                    }
                    (Section::Borders, other) => {
                        if let (Some(b), Some(which)) = (border.as_mut(), Edge::from_tag(other)) {
                            let declared = attr_value(&e, b"style")
                                .map(|s| !s.is_empty() && s != "none")
                                .unwrap_or(false);
                            if declared {
                                *b.edge_mut(which) = Some(BorderEdge::default());
                            }
                            if !is_empty {
                                edge = Some(which);
                            }
                        }
                    }

                    (Section::CellXfs, b"xf") => {
                        let entry = XfRef {
                            font_id: parse_index(&e, b"fontId"),
                            fill_id: parse_index(&e, b"fillId"),
                            border_id: parse_index(&e, b"borderId"),
                            alignment: None,
                        };
                        if is_empty {
                            xfs.push(entry);
                        } else {
                            xf = Some(entry);
                        }
                    }
                    (Section::CellXfs, b"alignment") => {
                        if let Some(x) = xf.as_mut() {
                            x.alignment = Some(RawAlignment {
                                horizontal: attr_value(&e, b"horizontal"),
                                vertical: attr_value(&e, b"vertical"),
                            });
                        }
                    }
                    _ => {}
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"fonts" | b"fills" | b"borders" | b"cellXfs" => section = Section::Other,
                b"font" if section == Section::Fonts => {
                    if let Some(f) = font.take() {
                        fonts.push(f);
                    }
                }
                b"fill" if section == Section::Fills => {
                    if let Some(f) = fill.take() {
                        fills.push(f);
                    }
                }
                b"border" if section == Section::Borders => {
                    if let Some(b) = border.take() {
                        borders.push(b);
                    }
                    edge = None;
                }
                b"xf" if section == Section::CellXfs => {
                    if let Some(x) = xf.take() {
                        xfs.push(x);
                    }
                }
                other if section == Section::Borders && Edge::from_tag(other).is_some() => {
                    edge = None;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let styles = xfs
        .into_iter()
        .map(|x| RawStyle {
            font: x.font_id.and_then(|id| fonts.get(id).cloned()),
            fill: x.fill_id.and_then(|id| fills.get(id).cloned()),
            border: x.border_id.and_then(|id| borders.get(id).cloned()),
            alignment: x.alignment,
        })
        .collect();

    Ok(styles)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fonts count="3">
    <font><sz val="11"/><color theme="1"/><name val="Calibri"/></font>
    <font><b/><i val="0"/><sz val="14"/><color rgb="FFFF0000"/><name val="Calibri"/></font>
    <font><i/><color auto="1"/></font>
  </fonts>
  <fills count="3">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
    <fill><patternFill patternType="solid"><fgColor indexed="5"/><bgColor indexed="64"/></patternFill></fill>
  </fills>
  <borders count="2">
    <border><left/><right/><top/><bottom/><diagonal/></border>
    <border><left style="thin"><color rgb="FF00FF00"/></left><right style="none"/><top/><bottom style="medium"/><diagonal style="thin"><color indexed="2"/></diagonal></border>
  </borders>
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="1" fillId="2" borderId="1"/>
  </cellStyleXfs>
  <cellXfs count="3">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="0" fontId="1" fillId="2" borderId="1" xfId="0" applyFont="1">
      <alignment horizontal="center" vertical="top" wrapText="1"/>
    </xf>
    <xf numFmtId="0" fontId="2" fillId="9" borderId="0" xfId="0"/>
  </cellXfs>
</styleSheet>"#;

    #[test]
    fn test_parse_style_sheet() {
        let styles = parse_style_sheet(STYLES_XML.as_bytes()).unwrap();
        // cellStyleXfs entries are not cell formats
        assert_eq!(styles.len(), 3);

        let plain = &styles[0];
        let font = plain.font.as_ref().unwrap();
        assert!(!font.bold);
        assert_eq!(font.size, Some(11.0));
        assert_eq!(font.color, Some(ColorSource::Theme(1)));
        assert_eq!(plain.fill, Some(RawFill::default()));
        assert_eq!(plain.border, Some(RawBorder::default()));
        assert_eq!(plain.alignment, None);

        let fancy = &styles[1];
        let font = fancy.font.as_ref().unwrap();
        assert!(font.bold);
        assert!(!font.italic);
        assert_eq!(font.size, Some(14.0));
        assert_eq!(font.color, Some(ColorSource::Rgb("FFFF0000".into())));
        let fill = fancy.fill.as_ref().unwrap();
        assert_eq!(fill.foreground, Some(ColorSource::Indexed(5)));
        assert_eq!(fill.background, Some(ColorSource::Indexed(64)));
        let border = fancy.border.as_ref().unwrap();
        assert_eq!(
            border.left,
            Some(BorderEdge {
                color: Some(ColorSource::Rgb("FF00FF00".into()))
            })
        );
        assert_eq!(border.right, None);
        assert_eq!(border.top, None);
        assert_eq!(border.bottom, Some(BorderEdge { color: None }));
        let alignment = fancy.alignment.as_ref().unwrap();
        assert_eq!(alignment.horizontal.as_deref(), Some("center"));
        assert_eq!(alignment.vertical.as_deref(), Some("top"));

        let dangling = &styles[2];
        let font = dangling.font.as_ref().unwrap();
        assert!(font.italic);
        assert_eq!(font.color, None);
        assert_eq!(dangling.fill, None);
    }

    #[test]
    fn test_malformed_style_sheet() {
        assert!(parse_style_sheet("<styleSheet><fonts></fills></styleSheet>".as_bytes()).is_err());
    }

    #[test]
    fn test_prefixed_style_sheet() {
        let xml = r#"<x:styleSheet xmlns:x="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <x:fonts count="1"><x:font><x:b/><x:color rgb="FF112233"/></x:font></x:fonts>
  <x:fills count="1"><x:fill><x:patternFill patternType="solid"><x:fgColor rgb="FFFFFF00"/></x:patternFill></x:fill></x:fills>
  <x:borders count="1"><x:border><x:top style="thin"/></x:border></x:borders>
  <x:cellXfs count="1"><x:xf fontId="0" fillId="0" borderId="0"/></x:cellXfs>
</x:styleSheet>"#;

        let styles = parse_style_sheet(xml.as_bytes()).unwrap();
        assert_eq!(styles.len(), 1);
        let font = styles[0].font.as_ref().unwrap();
        assert!(font.bold);
        assert_eq!(font.color, Some(ColorSource::Rgb("FF112233".into())));
        let fill = styles[0].fill.as_ref().unwrap();
        assert_eq!(fill.foreground, Some(ColorSource::Rgb("FFFFFF00".into())));
        assert_eq!(styles[0].border.as_ref().unwrap().top, Some(BorderEdge { color: None }));
    }

    #[test]
    fn test_empty_style_sheet() {
        let styles = parse_style_sheet("<styleSheet/>".as_bytes()).unwrap();
        assert!(styles.is_empty());
    }
}
