//! Normalizing raw cell formats into renderer-ready style records

pub mod palette;

pub use palette::{ColorSource, INDEXED_COLORS, THEME_COLORS};

use crate::config::ColorConfig;
use crate::reader::workbook::{CellValue, format_number};
use crate::reader::styles::{RawBorder, RawStyle};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    pub fn as_css(&self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    pub fn as_css(&self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Right,
    Center,
}

impl TextAlign {
    /// Alignment used when the format does not say: numbers hug the right edge
    pub fn default_for(value: &CellValue) -> Self {
        if value.is_number() {
            TextAlign::Right
        } else {
            TextAlign::Left
        }
    }

    fn from_format(horizontal: &str) -> Option<Self> {
        match horizontal {
            "left" => Some(TextAlign::Left),
            "right" => Some(TextAlign::Right),
            "center" | "centerContinuous" => Some(TextAlign::Center),
            _ => None,
        }
    }

    pub fn as_css(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Right => "right",
            TextAlign::Center => "center",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

impl VerticalAlign {
    fn from_format(vertical: &str) -> Option<Self> {
        match vertical {
            "top" => Some(VerticalAlign::Top),
            "center" => Some(VerticalAlign::Middle),
            "bottom" => Some(VerticalAlign::Bottom),
            _ => None,
        }
    }

    pub fn as_css(&self) -> &'static str {
        match self {
            VerticalAlign::Top => "top",
            VerticalAlign::Middle => "middle",
            VerticalAlign::Bottom => "bottom",
        }
    }
}

/// Visual attributes of one cell, ready to be applied by a renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleRecord {
    /// Unset means the renderer picks the zebra stripe
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    /// e.g. `"11pt"`
    pub font_size: Option<String>,
    pub text_align: TextAlign,
    pub vertical_align: VerticalAlign,
    /// e.g. `"1px solid #FF0000"`
    pub border: Option<String>,
}

impl StyleRecord {
    /// Style of a cell without any format
    pub fn default_for(value: &CellValue) -> Self {
        Self {
            background_color: None,
            text_color: None,
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            font_size: None,
            text_align: TextAlign::default_for(value),
            vertical_align: VerticalAlign::Middle,
            border: None,
        }
    }
}

/// Turns `RawStyle`s into `StyleRecord`s.
///
/// Resolution never fails: whatever cannot be resolved keeps its default.
#[derive(Debug, Clone)]
pub struct StyleResolver {
    theme_fallback: Option<String>,
    border_fallback: String,
}

impl Default for StyleResolver {
    fn default() -> Self {
        Self::new(&ColorConfig::default())
    }
}

impl StyleResolver {
    pub fn new(colors: &ColorConfig) -> Self {
        Self {
            theme_fallback: colors.theme_fallback().map(str::to_string),
            border_fallback: colors.border_fallback.clone(),
        }
    }

    pub fn resolve(&self, raw: Option<&RawStyle>, value: &CellValue) -> StyleRecord {
        let mut record = StyleRecord::default_for(value);
        let Some(raw) = raw else {
            return record;
        };

        if let Some(fill) = &raw.fill {
            record.background_color = self
                .color(fill.foreground.as_ref())
                .or_else(|| self.color(fill.background.as_ref()));
        }

        if let Some(font) = &raw.font {
            record.text_color = self.color(font.color.as_ref());
            if font.bold {
                record.font_weight = FontWeight::Bold;
            }
            if font.italic {
                record.font_style = FontStyle::Italic;
            }
            record.font_size = font
                .size
                .filter(|sz| sz.is_finite() && *sz > 0.0)
                .map(|sz| format!("{}pt", format_number(sz)));
        }

        if let Some(alignment) = &raw.alignment {
            if let Some(align) = alignment.horizontal.as_deref().and_then(TextAlign::from_format) {
                record.text_align = align;
            }
            if let Some(align) = alignment.vertical.as_deref().and_then(VerticalAlign::from_format) {
                record.vertical_align = align;
            }
        }

        if let Some(border) = &raw.border {
            record.border = self.border(border);
        }

        record
    }

    fn color(&self, source: Option<&ColorSource>) -> Option<String> {
        source.and_then(|c| c.resolve(self.theme_fallback.as_deref()))
    }

    fn border(&self, border: &RawBorder) -> Option<String> {
        let edges = [&border.top, &border.bottom, &border.left, &border.right];
        if edges.iter().all(|edge| edge.is_none()) {
            return None;
        }

        let color = edges
            .into_iter()
            .flatten()
            .find_map(|edge| self.color(edge.color.as_ref()))
            .unwrap_or_else(|| self.border_fallback.clone());

        Some(format!("1px solid {}", color))
    }
}
