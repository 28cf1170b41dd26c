//! Output formatters for viewer states

use anyhow::Result;
use colored::*;
use sheetview_core::config::RenderConfig;
use sheetview_core::style::{FontWeight, TextAlign};
use sheetview_core::{TableView, ViewerState, render_page};
use std::fmt::Write;

/// Longest cell text shown in the terminal grid
const MAX_COLUMN_WIDTH: usize = 32;

/// Human-readable summary plus a plain-text rendition of the grid
pub fn format_text(source: &str, state: &ViewerState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", format!("Previewing: {}", source).bold());
    let _ = writeln!(out);

    match state {
        ViewerState::Idle | ViewerState::Loading { .. } => {
            let _ = writeln!(out, "{}", "Nothing to show".bright_black());
        }
        ViewerState::Ready(preview) => {
            write_table(&mut out, &preview.table);
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", "Summary:".bold().underline());
            let _ = writeln!(
                out,
                "  {} {} ({}, {} cells)",
                "Sheet:".bold(),
                preview.table.sheet_name.cyan().bold(),
                preview.table.range,
                preview.table.cell_count()
            );
            if !preview.table.other_sheets.is_empty() {
                let _ = writeln!(
                    out,
                    "  {} {}",
                    "Not shown:".bold(),
                    preview.table.other_sheets.join(", ")
                );
            }
            let _ = writeln!(
                out,
                "  {} {} ({} bytes)",
                "Download:".bold(),
                preview.download.filename,
                preview.download.bytes.len()
            );
        }
        ViewerState::Unreadable { download, error } => {
            let _ = writeln!(out, "{} Unable to load spreadsheet data.", "ERROR".red().bold());
            let _ = writeln!(out, "  {}", error.bright_black());
            let _ = writeln!(
                out,
                "  {} {} ({} bytes)",
                "Download:".bold(),
                download.filename,
                download.bytes.len()
            );
        }
        ViewerState::Unavailable { url, error } => {
            let _ = writeln!(out, "{} Unable to load {}", "ERROR".red().bold(), url);
            let _ = writeln!(out, "  {}", error.bright_black());
        }
        ViewerState::Unsupported { url, kind } => {
            let _ = writeln!(
                out,
                "{} {} is not a spreadsheet ({:?}); open it directly",
                "INFO".blue().bold(),
                url,
                kind
            );
        }
    }
    out
}

fn write_table(out: &mut String, table: &TableView) {
    let col_count = table.rows.first().map(Vec::len).unwrap_or(0);
    let widths: Vec<usize> = (0..col_count)
        .map(|col| {
            table
                .rows
                .iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.text.chars().count().min(MAX_COLUMN_WIDTH))
                .max()
                .unwrap_or(0)
        })
        .collect();

    for row in &table.rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let text: String = cell.text.chars().take(MAX_COLUMN_WIDTH).collect();
                let padded = match cell.style.text_align {
                    TextAlign::Right => format!("{:>width$}", text, width = width),
                    TextAlign::Center => format!("{:^width$}", text, width = width),
                    TextAlign::Left => format!("{:<width$}", text, width = width),
                };
                if cell.style.font_weight == FontWeight::Bold {
                    padded.bold().to_string()
                } else {
                    padded
                }
            })
            .collect();
        let _ = writeln!(out, "{}", line.join(" | "));
    }
}

/// Viewer state in JSON format
pub fn format_json(source: &str, state: &ViewerState) -> Result<String> {
    let output = serde_json::json!({
        "source": source,
        "viewer": state,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Complete HTML page for the viewer state
pub fn format_html(state: &ViewerState, config: &RenderConfig) -> String {
    render_page(state, config)
}
