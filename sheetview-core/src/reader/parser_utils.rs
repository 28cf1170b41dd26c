//! Cell reference helpers shared by the XML part parsers

use quick_xml::events::BytesStart;

/// Parse a cell reference like "A1" or "$B$2" into (row, col) as 0-based indices
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    let mut col = 0u32;
    let mut row_str = String::new();

    for ch in cell_ref.chars() {
        if ch == '$' {
            continue;
        } else if ch.is_ascii_alphabetic() {
            if !row_str.is_empty() {
                return None;
            }
            col = col
                .checked_mul(26)?
                .checked_add(ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1)?;
        } else if ch.is_ascii_digit() {
            row_str.push(ch);
        } else {
            return None;
        }
    }

    if row_str.is_empty() || col == 0 {
        return None;
    }

    let row = row_str.parse::<u32>().ok()?;
    if row == 0 {
        return None;
    }

    // Convert to 0-based
    Some((row - 1, col - 1))
}

/// Parse a range like "A1:B2" (or a single "C3") into (start_row, start_col, end_row, end_col)
pub fn parse_cell_range(range: &str) -> Option<(u32, u32, u32, u32)> {
    let mut parts = range.split(':');
    let first = parts.next()?;
    let second = parts.next();
    if parts.next().is_some() {
        return None;
    }

    let (start_row, start_col) = parse_cell_ref(first)?;
    let (end_row, end_col) = match second {
        Some(s) => parse_cell_ref(s)?,
        None => (start_row, start_col),
    };

    Some((
        start_row.min(end_row),
        start_col.min(end_col),
        start_row.max(end_row),
        start_col.max(end_col),
    ))
}

/// Convert a 0-based column number to letters (0 -> A, 26 -> AA)
pub fn col_to_letters(mut col: u32) -> String {
    let mut result = String::new();
    loop {
        result.insert(0, (b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result
}

/// Format a 0-based (row, col) as an A1-style reference
pub fn encode_cell(row: u32, col: u32) -> String {
    format!("{}{}", col_to_letters(col), row + 1)
}

/// Unescaped value of an attribute, if present
pub fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| {
            attr.unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned())
        })
}

/// Attribute matched by local name, whatever namespace prefix the writer chose
pub fn attr_value_local(e: &BytesStart, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.prefix().is_some() && attr.key.local_name().as_ref() == local)
        .map(|attr| {
            attr.unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned())
        })
}

/// Boolean attribute the way SpreadsheetML writes them ("1", "true", "0", "false")
pub fn attr_flag(e: &BytesStart, key: &[u8]) -> Option<bool> {
    attr_value(e, key).map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}
