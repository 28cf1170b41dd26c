//! Viewer state and request sequencing
//!
//! Every open action is stamped with a sequence number. A completion is only
//! applied while its number is still the latest one issued, so a slow fetch
//! for a previously selected document can never overwrite the current one.

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::download::Download;
use crate::locator::PreviewKind;
use crate::reader::Workbook;
use crate::render::TableView;

/// Sequence number of one open action
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// Shared request counter; clones of the `Arc` can be handed to worker threads
#[derive(Debug, Default)]
pub struct RequestGate {
    latest: AtomicU64,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token that supersedes every earlier one
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    /// Make every issued token stale without issuing a new one
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

/// A successfully rendered document
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub download: Download,
    #[serde(skip)]
    pub workbook: Workbook,
    pub table: TableView,
}

/// What the viewer currently shows
#[derive(Debug, Clone, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewerState {
    #[default]
    Idle,
    Loading {
        url: String,
    },
    Ready(Box<Preview>),
    /// Bytes arrived but are not a readable workbook; they can still be downloaded
    Unreadable {
        download: Download,
        error: String,
    },
    /// The document could not be fetched
    Unavailable {
        url: String,
        error: String,
    },
    /// Not a spreadsheet; shown as-is or linked
    Unsupported {
        url: String,
        kind: PreviewKind,
    },
}

impl ViewerState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ViewerState::Ready(_))
    }

    pub fn table(&self) -> Option<&TableView> {
        match self {
            ViewerState::Ready(preview) => Some(&preview.table),
            _ => None,
        }
    }

    pub fn download(&self) -> Option<&Download> {
        match self {
            ViewerState::Ready(preview) => Some(&preview.download),
            ViewerState::Unreadable { download, .. } => Some(download),
            _ => None,
        }
    }

    /// Short state name for logs and summaries
    pub fn label(&self) -> &'static str {
        match self {
            ViewerState::Idle => "idle",
            ViewerState::Loading { .. } => "loading",
            ViewerState::Ready(_) => "ready",
            ViewerState::Unreadable { .. } => "unreadable",
            ViewerState::Unavailable { .. } => "unavailable",
            ViewerState::Unsupported { .. } => "unsupported",
        }
    }
}

/// One viewer: the current state plus the sequence of open actions
#[derive(Debug, Default)]
pub struct PreviewSession {
    gate: Arc<RequestGate>,
    state: ViewerState,
}

impl PreviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate shared with whoever completes requests off-thread
    pub fn gate(&self) -> Arc<RequestGate> {
        Arc::clone(&self.gate)
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    /// Start showing `url`; results of earlier opens become stale
    pub fn open(&mut self, url: &str) -> RequestToken {
        let token = self.gate.issue();
        log::debug!("request {} opens {}", token.0, url);
        self.state = ViewerState::Loading {
            url: url.to_string(),
        };
        token
    }

    /// Apply the outcome of a request; returns false when it was superseded
    pub fn complete(&mut self, token: RequestToken, state: ViewerState) -> bool {
        if !self.gate.is_current(token) {
            log::debug!(
                "discarding stale {} result of request {}",
                state.label(),
                token.0
            );
            return false;
        }
        log::debug!("request {} completed as {}", token.0, state.label());
        self.state = state;
        true
    }

    /// Drop the current document and abandon in-flight requests
    pub fn close(&mut self) {
        self.gate.invalidate();
        self.state = ViewerState::Idle;
    }
}
