//! Page layout model: an ordered stack of sections measured in logical
//! pixels.
//!
//! Section offsets are never cached: every query walks the spec against the
//! current [`Viewport`], so a terminal resize reflows the page immediately.
//! The snap engine and the scroll effects only see the page through the
//! [`LayoutProvider`] trait, and the animator only writes through
//! [`ScrollSink`].

// ───────────────────────────────────────── geometry ──────────

/// Visible area in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        let clean = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            width: clean(width),
            height: clean(height),
        }
    }

    /// Viewport for a terminal of `cols × rows` cells.
    pub fn from_cells(cols: u16, rows: u16, cell_width_px: f64, cell_height_px: f64) -> Self {
        Self::new(cols as f64 * cell_width_px, rows as f64 * cell_height_px)
    }
}

/// Absolute position of a section on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionBox {
    pub top: f64,
    pub height: f64,
}

impl SectionBox {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Top edge relative to the viewport (what a bounding-box query reports).
    pub fn rect_top(&self, scroll_y: f64) -> f64 {
        self.top - scroll_y
    }
}

// ───────────────────────────────────────── spec ──────────────

/// Section height, either relative to the viewport or absolute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Vh(f64),
    Px(f64),
}

impl Length {
    pub fn resolve(self, viewport: Viewport) -> f64 {
        match self {
            Length::Vh(f) => f * viewport.height,
            Length::Px(px) => px,
        }
    }
}

/// What a section renders as.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionKind {
    /// Full-height opening block whose title fades in from a silhouette.
    Intro { title: String, subtitle: String },
    /// Pinned artwork that shrinks to fit while scrolled through.
    Sticky { heading: String, tabs: Vec<String> },
    /// Pinned block that reveals one line at a time.
    Manifesto { lines: Vec<String> },
    /// Downloadable file list.
    Board { heading: String },
    Footer { text: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionSpec {
    pub id: String,
    pub kind: SectionKind,
    pub height: Length,
    /// Fade in once the section scrolls into view.
    pub fade_up: bool,
}

/// Ordered list of sections from top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSpec {
    pub sections: Vec<SectionSpec>,
}

pub const SUB_STICKY: &str = "sub-sticky";
pub const HERO_STICKY: &str = "hero-sticky";
pub const MANIFESTO: &str = "manifesto";
pub const INTRO: &str = "intro";
pub const BOARD: &str = "board";

impl PageSpec {
    /// The built-in portfolio page.
    pub fn portfolio() -> Self {
        let section = |id: &str, kind: SectionKind, height: Length, fade_up: bool| SectionSpec {
            id: id.to_string(),
            kind,
            height,
            fade_up,
        };
        Self {
            sections: vec![
                section(
                    INTRO,
                    SectionKind::Intro {
                        title: "GRIP".into(),
                        subtitle: "Scroll to begin".into(),
                    },
                    Length::Vh(1.0),
                    false,
                ),
                section(
                    SUB_STICKY,
                    SectionKind::Sticky {
                        heading: "The Workbook".into(),
                        tabs: vec!["Overview".into(), "Chapters".into(), "Exercises".into()],
                    },
                    Length::Vh(2.5),
                    false,
                ),
                section(
                    HERO_STICKY,
                    SectionKind::Sticky {
                        heading: "The Method".into(),
                        tabs: Vec::new(),
                    },
                    Length::Vh(2.5),
                    false,
                ),
                section(
                    MANIFESTO,
                    SectionKind::Manifesto {
                        lines: vec![
                            "We read slowly.".into(),
                            "We write what we read.".into(),
                            "We keep what we write.".into(),
                            "And we begin again.".into(),
                        ],
                    },
                    Length::Vh(4.0),
                    false,
                ),
                section(
                    BOARD,
                    SectionKind::Board {
                        heading: "Resources".into(),
                    },
                    Length::Vh(1.0),
                    true,
                ),
                section(
                    "footer",
                    SectionKind::Footer {
                        text: "© snapfolio".into(),
                    },
                    Length::Px(96.0),
                    true,
                ),
            ],
        }
    }
}

// ───────────────────────────────────────── traits ────────────

/// Read-only view of the live page layout.
pub trait LayoutProvider {
    fn scroll_y(&self) -> f64;
    fn viewport(&self) -> Viewport;
    /// Position of a named section, or `None` if the page has no such section.
    fn section(&self, id: &str) -> Option<SectionBox>;
}

/// The single write path into the scroll position.
pub trait ScrollSink {
    fn set_scroll_y(&mut self, y: f64);
}

// ───────────────────────────────────────── page ──────────────

/// A laid-out page plus its current scroll offset.
#[derive(Debug, Clone)]
pub struct Page {
    pub spec: PageSpec,
    viewport: Viewport,
    scroll_y: f64,
}

impl Page {
    pub fn new(spec: PageSpec, viewport: Viewport) -> Self {
        Self {
            spec,
            viewport,
            scroll_y: 0.0,
        }
    }

    pub fn total_height(&self) -> f64 {
        self.spec
            .sections
            .iter()
            .map(|s| s.height.resolve(self.viewport))
            .sum()
    }

    pub fn max_scroll(&self) -> f64 {
        (self.total_height() - self.viewport.height).max(0.0)
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let y = self.scroll_y;
        self.set_scroll_y(y);
    }

    /// Native (user-driven) scroll by `delta` pixels.
    pub fn scroll_by(&mut self, delta: f64) {
        let y = self.scroll_y + delta;
        self.set_scroll_y(y);
    }

    /// Every section with its resolved box, top to bottom.
    pub fn boxes(&self) -> Vec<(&SectionSpec, SectionBox)> {
        let mut top = 0.0;
        self.spec
            .sections
            .iter()
            .map(|s| {
                let height = s.height.resolve(self.viewport);
                let b = SectionBox { top, height };
                top += height;
                (s, b)
            })
            .collect()
    }
}

impl LayoutProvider for Page {
    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn section(&self, id: &str) -> Option<SectionBox> {
        self.boxes()
            .into_iter()
            .find(|(s, _)| s.id == id)
            .map(|(_, b)| b)
    }
}

impl ScrollSink for Page {
    fn set_scroll_y(&mut self, y: f64) {
        let y = if y.is_finite() { y } else { 0.0 };
        self.scroll_y = y.clamp(0.0, self.max_scroll());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Page {
        Page::new(PageSpec::portfolio(), Viewport::new(1024.0, 800.0))
    }

    #[test]
    fn sections_stack_in_order() {
        let p = page();
        let sub = p.section(SUB_STICKY).unwrap();
        let hero = p.section(HERO_STICKY).unwrap();
        assert_eq!(sub.top, 800.0);
        assert_eq!(sub.height, 2000.0);
        assert_eq!(hero.top, sub.bottom());
    }

    #[test]
    fn missing_section_is_none() {
        assert!(page().section("nope").is_none());
    }

    #[test]
    fn scroll_is_clamped_to_page() {
        let mut p = page();
        p.scroll_by(-50.0);
        assert_eq!(p.scroll_y(), 0.0);
        p.scroll_by(1.0e9);
        assert_eq!(p.scroll_y(), p.max_scroll());
        p.set_scroll_y(f64::NAN);
        assert_eq!(p.scroll_y(), 0.0);
    }

    #[test]
    fn resize_reflows_offsets() {
        let mut p = page();
        p.set_scroll_y(5000.0);
        p.resize(Viewport::new(1024.0, 400.0));
        assert_eq!(p.section(SUB_STICKY).unwrap().top, 400.0);
        assert!(p.scroll_y() <= p.max_scroll());
    }

    #[test]
    fn viewport_from_cells() {
        let v = Viewport::from_cells(120, 40, 8.0, 16.0);
        assert_eq!(v, Viewport::new(960.0, 640.0));
        assert_eq!(Viewport::new(f64::INFINITY, -3.0), Viewport::new(0.0, 0.0));
    }
}
