//! HTML output for the grid and for the whole viewer

use std::fmt::Write;

use super::{GridCell, TableView};
use crate::config::RenderConfig;
use crate::download::Download;
use crate::locator::PreviewKind;
use crate::session::ViewerState;

/// Shown instead of a table when the bytes are not a readable workbook
pub const UNREADABLE_MESSAGE: &str = "Unable to load spreadsheet data.";
/// Shown for kinds that have no inline preview
pub const NO_PREVIEW_MESSAGE: &str = "This file type cannot be previewed in the browser.";

const DEFAULT_TITLE: &str = "Spreadsheet";

/// Escape text for use in element content and double-quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

impl TableView {
    /// The grid as a standalone `<table>` with inline cell styles
    pub fn to_html(&self, config: &RenderConfig) -> String {
        let mut html = String::new();
        let _ = writeln!(
            html,
            r#"<table style="width:100%;border-collapse:collapse;font-size:{};background-color:#ffffff">"#,
            escape_html(&config.font_size)
        );
        html.push_str("<tbody>\n");
        for row in &self.rows {
            html.push_str("<tr>");
            for cell in row {
                let _ = write!(
                    html,
                    r#"<td data-ref="{}" style="{}">{}</td>"#,
                    cell.reference,
                    escape_html(&cell_css(cell, config)),
                    escape_html(&cell.text)
                );
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>\n");
        html
    }
}

fn cell_css(cell: &GridCell, config: &RenderConfig) -> String {
    let style = &cell.style;
    let mut css = format!(
        "padding:{};border:{};background-color:{};color:{};font-weight:{};font-style:{};",
        config.cell_padding,
        style.border.as_deref().unwrap_or(&config.default_border),
        cell.background,
        style.text_color.as_deref().unwrap_or(&config.default_text_color),
        style.font_weight.as_css(),
        style.font_style.as_css(),
    );
    if let Some(size) = &style.font_size {
        let _ = write!(css, "font-size:{};", size);
    }
    let _ = write!(
        css,
        "text-align:{};vertical-align:{};white-space:nowrap;min-width:{}",
        style.text_align.as_css(),
        style.vertical_align.as_css(),
        config.min_cell_width
    );
    css
}

/// The complete viewer for a state: header, download action and content
pub fn render_page(state: &ViewerState, config: &RenderConfig) -> String {
    let title = state
        .table()
        .map(|t| t.sheet_name.as_str())
        .unwrap_or(DEFAULT_TITLE);

    let mut body = String::new();
    let _ = writeln!(
        body,
        r#"<div class="sheetview-header"><h3 style="margin:0;font-size:18px;font-weight:600">{}</h3>{}</div>"#,
        escape_html(title),
        state.download().map(|d| download_link(d, "Download")).unwrap_or_default()
    );

    match state {
        ViewerState::Idle => {}
        ViewerState::Loading { .. } => {
            body.push_str(&message_block("Loading...", None));
        }
        ViewerState::Ready(preview) => {
            let _ = writeln!(
                body,
                r#"<div class="sheetview-grid" style="overflow:auto;border:1px solid #e0e0e0;border-radius:4px">"#
            );
            body.push_str(&preview.table.to_html(config));
            body.push_str("</div>\n");
        }
        ViewerState::Unreadable { download, .. } => {
            body.push_str(&message_block(
                UNREADABLE_MESSAGE,
                Some(download_link(download, "Download File")),
            ));
        }
        ViewerState::Unavailable { url, error } => {
            let message = format!("Unable to load {}: {}", short_name(url), error);
            body.push_str(&message_block(&message, Some(open_link(url))));
        }
        ViewerState::Unsupported { url, kind } => match kind {
            PreviewKind::Image => {
                let _ = writeln!(
                    body,
                    r#"<img src="{}" alt="Document" style="max-width:100%;max-height:80vh;object-fit:contain">"#,
                    escape_html(url)
                );
            }
            PreviewKind::Pdf => {
                let _ = writeln!(
                    body,
                    r#"<iframe src="{}" title="PDF Document" style="width:100%;height:90vh;border:none"></iframe>"#,
                    escape_html(url)
                );
            }
            PreviewKind::Spreadsheet | PreviewKind::Other => {
                body.push_str(&message_block(NO_PREVIEW_MESSAGE, Some(open_link(url))));
            }
        },
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n<div class=\"sheetview\" style=\"padding:24px\">\n{}</div>\n</body>\n</html>\n",
        escape_html(title),
        body
    )
}

fn download_link(download: &Download, label: &str) -> String {
    format!(
        r#"<a class="sheetview-download" href="{}" download="{}">{}</a>"#,
        escape_html(&download.url),
        escape_html(&download.filename),
        label
    )
}

fn open_link(url: &str) -> String {
    format!(
        r#"<a href="{}" target="_blank" rel="noopener noreferrer">Open file</a>"#,
        escape_html(url)
    )
}

fn message_block(message: &str, action: Option<String>) -> String {
    format!(
        "<div class=\"sheetview-message\" style=\"padding:24px;text-align:center\">\n<p>{}</p>\n{}</div>\n",
        escape_html(message),
        action.map(|a| a + "\n").unwrap_or_default()
    )
}

fn short_name(url: &str) -> &str {
    if url.starts_with("data:") {
        "inline document"
    } else {
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{CellRange, CellValue, Sheet, Workbook};
    use crate::render::GridRenderer;
    use crate::session::Preview;

    fn download() -> Download {
        Download {
            url: "https://files.example.com/o/plan.xlsx".to_string(),
            filename: "plan.xlsx".to_string(),
            bytes: b"not a workbook".to_vec(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"R&D" 'x'</b>"#),
            "&lt;b&gt;&quot;R&amp;D&quot; &#39;x&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_table_html() {
        let mut sheet = Sheet::blank("Q1", CellRange::parse("A1:B1").unwrap());
        sheet.get_cell_mut(0, 0).unwrap().value = CellValue::Text("<total>".into());
        sheet.get_cell_mut(0, 1).unwrap().value = CellValue::Number(42.0);
        let workbook = Workbook {
            sheets: vec![sheet],
            styles: Vec::new(),
        };
        let config = RenderConfig::default();
        let html = GridRenderer::default().render(&workbook).unwrap().to_html(&config);

        assert_eq!(html.matches("<td").count(), 2);
        assert!(html.contains("&lt;total&gt;"));
        assert!(html.contains(">42</td>"));
        assert!(html.contains("text-align:right"));
        assert!(html.contains("border:1px solid #d0d0d0"));
        assert!(html.contains("white-space:nowrap;min-width:80px"));
        assert!(html.contains("background-color:#f9f9f9"));
    }

    #[test]
    fn test_ready_page() {
        let mut sheet = Sheet::blank("Budget", CellRange::single_cell());
        sheet.get_cell_mut(0, 0).unwrap().value = CellValue::Text("x".into());
        let workbook = Workbook {
            sheets: vec![sheet],
            styles: Vec::new(),
        };
        let table = GridRenderer::default().render(&workbook).unwrap();
        let state = ViewerState::Ready(Box::new(Preview {
            download: download(),
            workbook,
            table,
        }));

        let page = render_page(&state, &RenderConfig::default());
        assert!(page.contains("<title>Budget</title>"));
        assert!(page.contains(r#"href="https://files.example.com/o/plan.xlsx" download="plan.xlsx""#));
        assert!(page.contains("<table"));
        assert!(!page.contains(UNREADABLE_MESSAGE));
    }

    #[test]
    fn test_unreadable_page_offers_download() {
        let state = ViewerState::Unreadable {
            download: download(),
            error: "not a recognizable spreadsheet container".to_string(),
        };
        let page = render_page(&state, &RenderConfig::default());
        assert!(page.contains("<title>Spreadsheet</title>"));
        assert!(page.contains(UNREADABLE_MESSAGE));
        assert!(page.contains("Download File"));
        assert!(!page.contains("<table"));
    }

    #[test]
    fn test_unavailable_and_unsupported_pages() {
        let state = ViewerState::Unavailable {
            url: "https://files.example.com/o/gone.xlsx".to_string(),
            error: "HTTP status 404".to_string(),
        };
        let page = render_page(&state, &RenderConfig::default());
        assert!(page.contains("Unable to load https://files.example.com/o/gone.xlsx"));
        assert!(!page.contains("<table"));

        let state = ViewerState::Unsupported {
            url: "https://files.example.com/o/readme.docx".to_string(),
            kind: PreviewKind::Other,
        };
        assert!(render_page(&state, &RenderConfig::default()).contains(NO_PREVIEW_MESSAGE));

        let state = ViewerState::Unsupported {
            url: "https://files.example.com/o/logo.png".to_string(),
            kind: PreviewKind::Image,
        };
        assert!(render_page(&state, &RenderConfig::default()).contains("<img src="));
    }
}
