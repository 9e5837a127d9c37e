//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;
use ratatui::layout::Rect;

use crate::config::AppConfig;
use crate::core::artwork;
use crate::core::catalog::{BoardState, FileRecord};
use crate::core::effects::RevealTracker;
use crate::core::page::{Page, PageSpec, SectionKind, Viewport, SUB_STICKY};
use crate::core::snap::{ScrollSession, SnapEngine};
use crate::ui::lightbox::LightboxHitZones;

use super::animator::SmoothScrollDriver;
use super::preview::{DocumentState, PreviewModal};
use super::sampler::ScrollThrottle;

/// Hues of the generated showcase placeholders, one per tab.
const TAB_HUES: [f64; 3] = [200.0, 20.0, 140.0];

/// Where downloads land when nothing is configured.
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

/// Startup inputs gathered from the CLI and the config file.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub catalog_url: Option<String>,
    pub document: Option<PathBuf>,
    pub artwork: Option<PathBuf>,
    pub download_dir: Option<PathBuf>,
    pub no_snap: bool,
}

/// Top-level application state.
pub struct AppState {
    /// Laid-out page and its scroll offset.
    pub page: Page,
    /// Auto-scroll flag and last sampled offset.
    pub session: ScrollSession,
    pub engine: SnapEngine,
    /// `false` when started with `--no-snap`.
    pub snap_enabled: bool,
    /// Rate limit between snap decisions.
    pub throttle: ScrollThrottle,
    /// The live programmatic scroll, if any.
    pub driver: SmoothScrollDriver,
    /// Sections that have faded in.
    pub reveals: RevealTracker,
    /// Highlighted manifesto line; kept when the section is far off screen.
    pub manifesto_line: Option<usize>,
    /// Selected tab of the sub showcase.
    pub active_tab: usize,
    /// Board content.
    pub board: BoardState,
    pub board_selected: usize,
    pub catalog_url: Option<String>,
    /// Monotonic id used to ignore stale catalog loads.
    pub catalog_generation: u64,
    pub download_dir: PathBuf,
    pub modal: PreviewModal,
    pub document_path: Option<PathBuf>,
    pub document: DocumentState,
    /// Monotonic id used to ignore stale document pages.
    pub document_generation: u64,
    /// Hero showcase and artwork preview.
    pub artwork: Arc<RgbaImage>,
    /// One image per sub-showcase tab.
    pub tab_artwork: Vec<Arc<RgbaImage>>,
    /// User-configurable keybindings and metrics.
    pub config: AppConfig,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// Full terminal area from the last draw.
    pub terminal_area: Rect,
    /// Click targets recorded by the last draw.
    pub lightbox_hits: Option<LightboxHitZones>,
    pub board_hits: Vec<(Rect, usize)>,
    /// Spinner frame counter.
    pub tick: u64,
    /// Work requested by handlers; the main loop spawns the jobs.
    pub needs_catalog_fetch: bool,
    pub pending_download: Option<FileRecord>,
    pub needs_document_open: bool,
    pub pending_page_render: Option<usize>,
}

impl AppState {
    pub fn new(config: AppConfig, options: Options, terminal_area: Rect) -> Self {
        let viewport = page_viewport(&config, terminal_area);
        let page = Page::new(PageSpec::portfolio(), viewport);
        let session = ScrollSession::new(0.0);

        let artwork = Arc::new(artwork::load_or_generate(options.artwork.as_deref(), 260.0));
        let tab_count = tab_count(&page.spec);
        let tab_artwork = (0..tab_count)
            .map(|i| Arc::new(artwork::placeholder(
                artwork::PLACEHOLDER_WIDTH,
                artwork::PLACEHOLDER_HEIGHT,
                TAB_HUES[i % TAB_HUES.len()],
            )))
            .collect();

        let catalog_url = options.catalog_url.or_else(|| config.catalog_url.clone());
        let board = if catalog_url.is_some() {
            BoardState::Loading
        } else {
            BoardState::Disabled
        };
        let download_dir = options
            .download_dir
            .or_else(|| config.download_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_DIR));
        let document = if options.document.is_some() {
            DocumentState::NotLoaded
        } else {
            DocumentState::Unavailable
        };

        let mut state = Self {
            page,
            session,
            engine: SnapEngine::new(config.snap.clone()),
            snap_enabled: !options.no_snap,
            throttle: ScrollThrottle::new(Duration::from_millis(config.snap.throttle_ms)),
            driver: SmoothScrollDriver::new(),
            reveals: RevealTracker::default(),
            manifesto_line: None,
            active_tab: 0,
            needs_catalog_fetch: catalog_url.is_some(),
            board,
            board_selected: 0,
            catalog_url,
            catalog_generation: 0,
            download_dir,
            modal: PreviewModal::default(),
            document_path: options.document,
            document,
            document_generation: 0,
            artwork,
            tab_artwork,
            config,
            status_message: None,
            should_quit: false,
            terminal_area,
            lightbox_hits: None,
            board_hits: Vec::new(),
            tick: 0,
            pending_download: None,
            needs_document_open: false,
            pending_page_render: None,
        };
        super::handler::refresh_scroll_effects(&mut state);
        state
    }

    /// Reflow the page for a new terminal size.
    pub fn resize(&mut self, terminal_area: Rect) {
        self.terminal_area = terminal_area;
        self.page.resize(page_viewport(&self.config, terminal_area));
    }

    /// Frames are only needed while something moves.
    pub fn needs_frames(&self) -> bool {
        self.driver.is_animating() || self.modal.is_transitioning()
    }

    pub fn selected_record(&self) -> Option<&FileRecord> {
        self.board.records().get(self.board_selected)
    }

    pub fn tab_count(&self) -> usize {
        tab_count(&self.page.spec)
    }
}

/// Page area in logical pixels: the terminal minus the status bar row.
pub fn page_viewport(config: &AppConfig, terminal_area: Rect) -> Viewport {
    Viewport::from_cells(
        terminal_area.width,
        terminal_area.height.saturating_sub(1),
        config.cell_width_px,
        config.cell_height_px,
    )
}

fn tab_count(spec: &PageSpec) -> usize {
    spec.sections
        .iter()
        .find(|s| s.id == SUB_STICKY)
        .and_then(|s| match &s.kind {
            SectionKind::Sticky { tabs, .. } => Some(tabs.len()),
            _ => None,
        })
        .unwrap_or(0)
}
