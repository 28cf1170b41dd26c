//! sheetview-core: fetch, decode and render styled spreadsheet previews
//!
//! The pipeline turns a document URL into a `ViewerState`: the bytes are
//! fetched, decoded into a workbook, and the first sheet is rendered as a
//! styled grid. Failures never leave the viewer blank; unreadable documents
//! still offer their original bytes for download.

pub mod config;
pub mod download;
pub mod error;
pub mod loader;
pub mod locator;
pub mod reader;
pub mod render;
pub mod session;
pub mod style;

pub use config::ViewerConfig;
pub use download::Download;
pub use error::{FetchError, ParseError, PreviewError};
pub use loader::{FetchedDocument, HttpLoader, Loader};
pub use locator::{PreviewKind, resolve_file_url};
pub use reader::Workbook;
pub use render::{GridRenderer, TableView, render_page};
pub use session::{Preview, PreviewSession, RequestGate, RequestToken, ViewerState};
pub use style::{StyleRecord, StyleResolver};

/// Main preview interface
pub struct Previewer {
    config: ViewerConfig,
    loader: Box<dyn Loader>,
    renderer: GridRenderer,
}

impl Previewer {
    /// Create a previewer that fetches over HTTP
    pub fn with_config(config: ViewerConfig) -> Result<Self, FetchError> {
        let loader = HttpLoader::new(&config.loader)?;
        Ok(Self::with_loader(config, Box::new(loader)))
    }

    /// Create a previewer with a custom byte source
    pub fn with_loader(config: ViewerConfig, loader: Box<dyn Loader>) -> Self {
        let renderer = GridRenderer::new(&config.render, &config.colors);
        Self {
            config,
            loader,
            renderer,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Fetch, decode and render the document at `url`
    pub fn preview_url(&self, url: &str) -> ViewerState {
        let kind = PreviewKind::detect(url);
        if kind != PreviewKind::Spreadsheet {
            log::debug!("{} is {:?}; not decoding", url, kind);
            return ViewerState::Unsupported {
                url: url.to_string(),
                kind,
            };
        }

        match self.loader.load(url) {
            Ok(document) => self.preview_document(document),
            Err(e) => {
                log::warn!("{}", e);
                ViewerState::Unavailable {
                    url: url.to_string(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// Decode and render bytes that were obtained elsewhere
    pub fn preview_bytes(&self, url: &str, bytes: Vec<u8>) -> ViewerState {
        self.preview_document(FetchedDocument {
            url: url.to_string(),
            bytes,
        })
    }

    /// Decode bytes into a preview, or the error that made them unreadable
    pub fn build_preview(&self, document: &FetchedDocument) -> Result<Preview, PreviewError> {
        let workbook = reader::parse_with_limit(&document.bytes, self.config.render.max_cells)?;
        let table = self.renderer.render(&workbook).ok_or(ParseError::NoSheets)?;
        Ok(Preview {
            download: Download::from_document(document),
            workbook,
            table,
        })
    }

    fn preview_document(&self, document: FetchedDocument) -> ViewerState {
        match self.build_preview(&document) {
            Ok(preview) => {
                log::debug!(
                    "rendered '{}' ({} cells)",
                    preview.table.sheet_name,
                    preview.table.cell_count()
                );
                ViewerState::Ready(Box::new(preview))
            }
            Err(e) => {
                log::warn!("cannot read {}: {}", document.url, e);
                ViewerState::Unreadable {
                    download: Download::from_document(&document),
                    error: e.to_string(),
                }
            }
        }
    }
}
