//! Offering the original document bytes for saving

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::loader::FetchedDocument;
use crate::locator::download_filename;

/// The untouched document, ready to be saved under its own name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Download {
    /// Link target offered to the user
    pub url: String,
    pub filename: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl Download {
    pub fn from_document(document: &FetchedDocument) -> Self {
        Self {
            url: document.url.clone(),
            filename: download_filename(&document.url),
            bytes: document.bytes.clone(),
        }
    }

    /// Write the bytes unchanged into `dir`, returning the written path
    pub fn save_into<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let path = dir.join(&self.filename);
        fs::write(&path, &self.bytes)
            .with_context(|| format!("Failed to write download: {}", path.display()))?;

        log::info!("saved {} bytes to {}", self.bytes.len(), path.display());
        Ok(path)
    }
}
