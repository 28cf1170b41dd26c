//! Error taxonomy for the preview pipeline

use thiserror::Error;

/// Failure to obtain the bytes of a document
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} answered with HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("malformed data URL: {0}")]
    MalformedDataUrl(String),

    #[error("HTTP support is disabled in this build")]
    HttpDisabled,

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Failure to decode bytes into a workbook
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("not a recognizable spreadsheet container: {0}")]
    UnrecognizedContainer(String),

    #[error("workbook declares no sheets")]
    NoSheets,

    #[error("failed to read sheet '{sheet}': {message}")]
    Sheet { sheet: String, message: String },

    #[error("sheet '{sheet}' spans {cells} cells, more than the limit of {limit}")]
    RangeTooLarge { sheet: String, cells: u64, limit: usize },
}

/// Either stage of the pipeline failing
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
