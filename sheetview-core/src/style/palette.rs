//! Color encodings used by spreadsheet formats and their lookup tables

use serde::Serialize;

/// Legacy indexed palette (BIFF8 default colors)
pub static INDEXED_COLORS: [&str; 56] = [
    "#000000", "#FFFFFF", "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF",
    "#800000", "#008000", "#000080", "#808000", "#800080", "#008080", "#C0C0C0", "#808080",
    "#9999FF", "#993366", "#FFFFCC", "#CCFFFF", "#660066", "#FF8080", "#0066CC", "#CCCCFF",
    "#000080", "#FF00FF", "#FFFF00", "#00FFFF", "#800080", "#800000", "#008080", "#0000FF",
    "#00CCFF", "#CCFFFF", "#CCFFCC", "#FFFF99", "#99CCFF", "#FF99CC", "#CC99FF", "#FFCC99",
    "#3366FF", "#33CCCC", "#99CC00", "#FFCC00", "#FF9900", "#FF6600", "#666699", "#969696",
    "#003366", "#339966", "#003300", "#333300", "#993300", "#993366", "#333399", "#333333",
];

/// Office 2007 theme colors in theme-index order
pub static THEME_COLORS: [&str; 10] = [
    "#FFFFFF", // Background 1
    "#000000", // Text 1
    "#1F497D", // Background 2
    "#EEECE1", // Text 2
    "#4F81BD", // Accent 1
    "#F79646", // Accent 2
    "#9BBB59", // Accent 3
    "#8064A2", // Accent 4
    "#4BACC6", // Accent 5
    "#F79646", // Accent 6
];

/// A raw color reference as stored in a cell format
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ColorSource {
    /// `RRGGBB` or `AARRGGBB` hex digits
    Rgb(String),
    Indexed(u32),
    Theme(u32),
}

impl ColorSource {
    /// Resolve to `#RRGGBB`.
    ///
    /// `theme_fallback` is used for theme ids outside `THEME_COLORS`.
    pub fn resolve(&self, theme_fallback: Option<&str>) -> Option<String> {
        match self {
            ColorSource::Rgb(hex) => normalize_rgb(hex),
            ColorSource::Indexed(idx) => INDEXED_COLORS
                .get(*idx as usize)
                .map(|c| (*c).to_string()),
            ColorSource::Theme(id) => THEME_COLORS
                .get(*id as usize)
                .copied()
                .or(theme_fallback)
                .map(str::to_string),
        }
    }
}

fn normalize_rgb(hex: &str) -> Option<String> {
    let hex = hex.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let rgb = match hex.len() {
        6 => hex,
        // ARGB: the alpha byte is not representable in a CSS hex color of this form
        8 => &hex[2..],
        _ => return None,
    };
    Some(format!("#{}", rgb.to_ascii_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_colors() {
        assert_eq!(ColorSource::Indexed(0).resolve(None).as_deref(), Some("#000000"));
        assert_eq!(ColorSource::Indexed(1).resolve(None).as_deref(), Some("#FFFFFF"));
        assert_eq!(ColorSource::Indexed(55).resolve(None).as_deref(), Some("#333333"));
        // 64 is the "system foreground" slot, not part of the palette
        assert_eq!(ColorSource::Indexed(56).resolve(None), None);
        assert_eq!(ColorSource::Indexed(64).resolve(Some("#000000")), None);
    }

    #[test]
    fn test_theme_colors() {
        assert_eq!(ColorSource::Theme(4).resolve(None).as_deref(), Some("#4F81BD"));
        assert_eq!(ColorSource::Theme(12).resolve(Some("#000000")).as_deref(), Some("#000000"));
        assert_eq!(ColorSource::Theme(12).resolve(None), None);
    }

    #[test]
    fn test_rgb_colors() {
        assert_eq!(ColorSource::Rgb("FFFF0000".into()).resolve(None).as_deref(), Some("#FF0000"));
        assert_eq!(ColorSource::Rgb("00ff00".into()).resolve(None).as_deref(), Some("#00FF00"));
        assert_eq!(ColorSource::Rgb("#123456".into()).resolve(None).as_deref(), Some("#123456"));
        assert_eq!(ColorSource::Rgb("red".into()).resolve(None), None);
        assert_eq!(ColorSource::Rgb("FFF".into()).resolve(None), None);
    }
}
