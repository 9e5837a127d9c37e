//! Preview modal: open/close transitions and the document being shown.
//!
//! The modal is displayed immediately on open but only becomes "shown" (and
//! locks page scrolling) a moment later; closing fades for a fixed time
//! before the modal is hidden again and scrolling is released.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::document::DocumentPager;

pub const OPEN_DELAY: Duration = Duration::from_millis(10);
pub const CLOSE_DELAY: Duration = Duration::from_millis(300);

pub const DOCUMENT_LOAD_FAILED: &str = "Unable to load the document.";

/// What the modal shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewPane {
    /// The showcase artwork at full size.
    Artwork,
    /// The paged document.
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    Hidden,
    Opening { since: Instant },
    Shown,
    Closing { since: Instant },
}

/// Phase change reported by [`PreviewModal::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalTransition {
    Shown(PreviewPane),
    Hidden,
}

#[derive(Debug, Clone)]
pub struct PreviewModal {
    phase: ModalPhase,
    pane: PreviewPane,
}

impl Default for PreviewModal {
    fn default() -> Self {
        Self {
            phase: ModalPhase::Hidden,
            pane: PreviewPane::Artwork,
        }
    }
}

impl PreviewModal {
    pub fn phase(&self) -> ModalPhase {
        self.phase
    }

    pub fn pane(&self) -> PreviewPane {
        self.pane
    }

    /// Displayed at all (any phase but hidden).
    pub fn is_visible(&self) -> bool {
        self.phase != ModalPhase::Hidden
    }

    /// Fully faded in.
    pub fn is_shown(&self) -> bool {
        self.phase == ModalPhase::Shown
    }

    /// Page scrolling is blocked from the moment the modal is shown until
    /// it has finished closing.
    pub fn locks_scroll(&self) -> bool {
        matches!(self.phase, ModalPhase::Shown | ModalPhase::Closing { .. })
    }

    /// A timed transition is pending and needs frame ticks.
    pub fn is_transitioning(&self) -> bool {
        matches!(
            self.phase,
            ModalPhase::Opening { .. } | ModalPhase::Closing { .. }
        )
    }

    pub fn open(&mut self, pane: PreviewPane, now: Instant) {
        self.pane = pane;
        self.phase = ModalPhase::Opening { since: now };
    }

    pub fn close(&mut self, now: Instant) {
        if self.phase == ModalPhase::Hidden {
            return;
        }
        self.phase = ModalPhase::Closing { since: now };
    }

    /// Advance timed transitions.
    pub fn tick(&mut self, now: Instant) -> Option<ModalTransition> {
        match self.phase {
            ModalPhase::Opening { since } if now.saturating_duration_since(since) >= OPEN_DELAY => {
                self.phase = ModalPhase::Shown;
                Some(ModalTransition::Shown(self.pane))
            }
            ModalPhase::Closing { since }
                if now.saturating_duration_since(since) >= CLOSE_DELAY =>
            {
                self.phase = ModalPhase::Hidden;
                Some(ModalTransition::Hidden)
            }
            _ => None,
        }
    }
}

// ───────────────────────────────────────── document ──────────

/// Lifecycle of the previewed document.
#[derive(Debug, Clone, Default)]
pub enum DocumentState {
    /// Nothing requested yet (loaded lazily on first open).
    #[default]
    NotLoaded,
    Loading,
    Ready {
        pages: Vec<PathBuf>,
        pager: DocumentPager,
        current: Option<Arc<image::RgbaImage>>,
    },
    Failed,
    /// No document was configured.
    Unavailable,
}

impl DocumentState {
    pub fn ready(pages: Vec<PathBuf>) -> Self {
        let pager = DocumentPager::new(pages.len());
        DocumentState::Ready {
            pages,
            pager,
            current: None,
        }
    }

    /// Text for the page indicator row.
    pub fn indicator(&self) -> String {
        match self {
            DocumentState::NotLoaded | DocumentState::Loading => "Loading…".into(),
            DocumentState::Ready { pager, .. } => pager.indicator(),
            DocumentState::Failed => DOCUMENT_LOAD_FAILED.into(),
            DocumentState::Unavailable => "No document configured.".into(),
        }
    }
}
