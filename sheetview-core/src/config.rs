//! Configuration system for the preview pipeline

use crate::reader;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main viewer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub colors: ColorConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

impl ViewerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ViewerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Check values that serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if self.loader.timeout_secs == 0 {
            anyhow::bail!("Configuration error: loader.timeout_secs must be greater than zero");
        }

        // An empty theme fallback means "leave unresolved theme colors unset"
        if !self.colors.theme_fallback.is_empty() && !is_hex_color(&self.colors.theme_fallback) {
            anyhow::bail!(
                "Configuration error: colors.theme_fallback '{}' is not a #RRGGBB color",
                self.colors.theme_fallback
            );
        }

        let colors = [
            ("colors.border_fallback", &self.colors.border_fallback),
            ("render.zebra_even", &self.render.zebra_even),
            ("render.zebra_odd", &self.render.zebra_odd),
            ("render.default_text_color", &self.render.default_text_color),
        ];
        for (key, value) in colors {
            if !is_hex_color(value) {
                anyhow::bail!("Configuration error: {} '{}' is not a #RRGGBB color", key, value);
            }
        }

        if self.render.max_cells == 0 {
            anyhow::bail!("Configuration error: render.max_cells must be greater than zero");
        }

        let storage = &self.storage;
        let set = [&storage.base_url, &storage.namespace, &storage.bucket]
            .iter()
            .filter(|v| !v.is_empty())
            .count();
        if set != 0 && storage.base_url.is_empty() {
            anyhow::bail!("Configuration error: storage.base_url is required when storage is configured");
        }

        Ok(())
    }
}

/// Document fetching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("sheetview/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Object storage used to turn stored object paths into fetchable URLs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Either the bare endpoint or one that already carries `/n/<ns>/b/<bucket>`
    pub base_url: String,
    pub namespace: String,
    pub bucket: String,
}

impl StorageConfig {
    /// True when object paths can be resolved at all
    pub fn is_configured(&self) -> bool {
        if self.base_url.is_empty() {
            return false;
        }
        self.has_bucket_path() || (!self.namespace.is_empty() && !self.bucket.is_empty())
    }

    pub(crate) fn has_bucket_path(&self) -> bool {
        self.base_url.contains("/n/") && self.base_url.contains("/b/")
    }
}

/// Color resolution fallbacks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Color used for theme ids outside the theme table; empty leaves them unset
    pub theme_fallback: String,
    /// Border color when no declared edge resolves to a color
    pub border_fallback: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            theme_fallback: "#000000".to_string(),
            border_fallback: "#d0d0d0".to_string(),
        }
    }
}

impl ColorConfig {
    pub fn theme_fallback(&self) -> Option<&str> {
        if self.theme_fallback.is_empty() {
            None
        } else {
            Some(&self.theme_fallback)
        }
    }
}

/// Table presentation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Background for unstyled cells on even displayed rows
    pub zebra_even: String,
    /// Background for unstyled cells on odd displayed rows
    pub zebra_odd: String,
    pub default_border: String,
    pub default_text_color: String,
    pub cell_padding: String,
    pub min_cell_width: String,
    pub font_size: String,
    /// Largest grid a sheet may expand to
    pub max_cells: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            zebra_even: "#f9f9f9".to_string(),
            zebra_odd: "#ffffff".to_string(),
            default_border: "1px solid #d0d0d0".to_string(),
            default_text_color: "#000000".to_string(),
            cell_padding: "8px 12px".to_string(),
            min_cell_width: "80px".to_string(),
            font_size: "14px".to_string(),
            max_cells: reader::DEFAULT_MAX_CELLS,
        }
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.colors.theme_fallback(), Some("#000000"));
        assert_eq!(config.render.zebra_even, "#f9f9f9");
        assert!(!config.storage.is_configured());
    }

    #[test]
    fn test_partial_toml() {
        let config: ViewerConfig = toml::from_str(
            r##"
            [colors]
            theme_fallback = ""

            [storage]
            base_url = "https://objects.example.com"
            namespace = "ns"
            bucket = "docs"
            "##,
        )
        .unwrap();

        assert_eq!(config.colors.theme_fallback(), None);
        assert_eq!(config.colors.border_fallback, "#d0d0d0");
        assert_eq!(config.loader.timeout_secs, 30);
        assert!(config.storage.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut config = ViewerConfig::default();
        config.loader.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.render.zebra_even = "grey".to_string();
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.colors.theme_fallback = "#12345".to_string();
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.storage.bucket = "docs".to_string();
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.render.max_cells = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sheetview.toml");
        fs::write(&path, "[loader]\ntimeout_secs = 5\n\n[render]\nmax_cells = 500\n").unwrap();

        let config = ViewerConfig::from_file(&path).unwrap();
        assert_eq!(config.loader.timeout_secs, 5);
        assert_eq!(config.render.max_cells, 500);
        assert_eq!(config.render.font_size, "14px");
        assert!(config.loader.user_agent.starts_with("sheetview/"));

        fs::write(&path, "[loader\n").unwrap();
        assert!(ViewerConfig::from_file(&path).is_err());
        assert!(ViewerConfig::from_file(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_bucket_path_base_url() {
        let storage = StorageConfig {
            base_url: "https://objects.example.com/n/ns/b/docs".to_string(),
            namespace: String::new(),
            bucket: String::new(),
        };
        assert!(storage.is_configured());
        assert!(storage.has_bucket_path());
    }
}
