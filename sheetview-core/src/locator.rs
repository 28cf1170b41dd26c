//! Turning stored file references into fetchable URLs and naming what they point at

use crate::config::StorageConfig;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Filename offered for downloads when the URL does not provide one
pub const DEFAULT_DOWNLOAD_NAME: &str = "file.xlsx";

/// Resolve a stored file reference into a URL that can be fetched.
///
/// References are either absolute `http(s)://` URLs, inline `data:` URLs, or
/// object-storage paths such as `docs/1712-plan.xlsx`. Returns `None` when the
/// reference is empty or storage is not configured for object paths.
pub fn resolve_file_url(reference: &str, storage: &StorageConfig) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() || reference == "null" || reference == "undefined" {
        return None;
    }

    if !is_object_path(reference) {
        return Some(reference.to_string());
    }

    if !storage.is_configured() {
        log::warn!(
            "object storage is not configured; cannot resolve '{}'",
            reference
        );
        return None;
    }

    let base = storage.base_url.trim_end_matches('/');
    let object = urlencoding::encode(reference);
    if storage.has_bucket_path() {
        Some(format!("{}/o/{}", base, object))
    } else {
        Some(format!(
            "{}/n/{}/b/{}/o/{}",
            base, storage.namespace, storage.bucket, object
        ))
    }
}

/// True for references that still need an object-storage prefix
pub fn is_object_path(reference: &str) -> bool {
    !reference.is_empty()
        && !reference.starts_with("https://")
        && !reference.starts_with("http://")
        && !reference.starts_with("data:")
}

fn extension_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.([^.?#/]+)(?:[?#]|$)").expect("valid extension regex"))
}

/// Lower-cased extension of the last path segment, ignoring query and fragment
pub fn file_extension(url: &str) -> String {
    extension_regex()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
        .unwrap_or_default()
}

/// What the viewer can do with a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewKind {
    Image,
    Pdf,
    Spreadsheet,
    Other,
}

impl PreviewKind {
    pub fn detect(url: &str) -> Self {
        if let Some(mime) = data_url_mime(url) {
            return Self::from_mime(&mime);
        }
        Self::from_extension(&file_extension(url))
    }

    fn from_extension(ext: &str) -> Self {
        match ext {
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "svg" => PreviewKind::Image,
            "pdf" => PreviewKind::Pdf,
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => PreviewKind::Spreadsheet,
            _ => PreviewKind::Other,
        }
    }

    fn from_mime(mime: &str) -> Self {
        match mime {
            m if m.starts_with("image/") => PreviewKind::Image,
            "application/pdf" => PreviewKind::Pdf,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            | "application/vnd.ms-excel"
            | "application/vnd.ms-excel.sheet.macroenabled.12"
            | "application/vnd.oasis.opendocument.spreadsheet" => PreviewKind::Spreadsheet,
            _ => PreviewKind::Other,
        }
    }
}

fn data_url_mime(url: &str) -> Option<String> {
    let rest = url.strip_prefix("data:")?;
    let header = rest.split(',').next()?;
    let mime = header.split(';').next().unwrap_or_default();
    Some(mime.trim().to_ascii_lowercase())
}

/// Filename for saving the original document, derived from the URL's last path segment
pub fn download_filename(url: &str) -> String {
    if url.starts_with("data:") {
        return DEFAULT_DOWNLOAD_NAME.to_string();
    }

    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segment = path.rsplit('/').next().unwrap_or_default();

    // Object names are URL-encoded as a whole, so a decoded segment may still carry a path
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    let name = decoded.rsplit(['/', '\\']).next().unwrap_or_default().trim();

    if name.is_empty() || name == "." || name == ".." || name.contains(':') {
        DEFAULT_DOWNLOAD_NAME.to_string()
    } else {
        name.to_string()
    }
}
