//! Scroll-linked presentation effects.
//!
//! Each effect is a pure function of the live layout; the UI layer applies
//! the results when drawing.  Missing sections yield `None` and the caller
//! simply skips the effect.

use std::collections::HashSet;

use super::easing::ease_out_cubic;
use super::page::{LayoutProvider, SectionBox};

// ───────────────────────────────────────── sticky shrink ─────

/// Zoom the pinned artwork starts at before settling to 1×.
pub const STICKY_START_SCALE: f64 = 3.0;
pub const STICKY_END_SCALE: f64 = 1.0;
/// Scroll distance (in viewport heights) over which the shrink completes.
pub const STICKY_RUN_VH: f64 = 1.5;

/// Transform applied to a sticky showcase's artwork.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickyTransform {
    pub scale: f64,
    /// Downward shift in pixels; at full zoom this shows the artwork's top.
    pub translate_y: f64,
    pub opacity: f64,
}

/// Shrink-to-fit transform for the sticky section `id`.
pub fn sticky_transform(
    layout: &impl LayoutProvider,
    id: &str,
    nav_height: f64,
) -> Option<StickyTransform> {
    let section = layout.section(id)?;
    let vh = layout.viewport().height;

    let scrolled_into = -(section.rect_top(layout.scroll_y()) - nav_height);
    let run = STICKY_RUN_VH * vh;
    let t = if run > 0.0 {
        (scrolled_into / run).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let p = ease_out_cubic(t);

    let scale = STICKY_START_SCALE + (STICKY_END_SCALE - STICKY_START_SCALE) * p;
    let start_y = (STICKY_START_SCALE - 1.0) * vh / 2.0;
    let translate_y = start_y + (0.0 - start_y) * p;

    Some(StickyTransform {
        scale,
        translate_y,
        opacity: 1.0,
    })
}

// ───────────────────────────────────────── silhouette ────────

/// Scroll distance over which the intro title comes out of silhouette.
pub const SILHOUETTE_CLEAR_PX: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilhouetteFilter {
    pub brightness: f64,
    pub contrast: f64,
    pub shadow_alpha: f64,
}

pub fn silhouette_filter(scroll_y: f64) -> SilhouetteFilter {
    let p = (scroll_y / SILHOUETTE_CLEAR_PX).clamp(0.0, 1.0);
    SilhouetteFilter {
        brightness: p,
        contrast: 1.2 - 0.2 * p,
        shadow_alpha: 0.05 * (1.0 - p),
    }
}

impl SilhouetteFilter {
    /// Apply brightness and contrast to an sRGB triple.
    pub fn apply(&self, rgb: [u8; 3]) -> [u8; 3] {
        rgb.map(|c| {
            let v = c as f64 / 255.0 * self.brightness;
            let v = (v - 0.5) * self.contrast + 0.5;
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        })
    }
}

// ───────────────────────────────────────── manifesto ─────────

/// Normalised progress through the pinned manifesto, or `None` when the
/// section is more than a viewport away (nothing to update).
pub fn manifesto_progress(layout: &impl LayoutProvider, id: &str) -> Option<f64> {
    let section = layout.section(id)?;
    let vh = layout.viewport().height;
    let scroll_y = layout.scroll_y();

    let start = section.top;
    let span = section.height - vh;
    let end = start + span;
    if scroll_y < start - vh || scroll_y > end + vh {
        return None;
    }
    if span <= 0.0 {
        return Some(1.0);
    }
    Some(((scroll_y - start) / span).clamp(0.0, 1.0))
}

/// Index of the one line shown at `progress` among `line_count` lines.
pub fn active_line(progress: f64, line_count: usize) -> Option<usize> {
    if line_count == 0 {
        return None;
    }
    let idx = (progress.clamp(0.0, 1.0) * line_count as f64).floor() as usize;
    Some(idx.min(line_count - 1))
}

// ───────────────────────────────────────── fade-up ───────────

/// Fraction of a section that must intersect the viewport to reveal it.
pub const REVEAL_THRESHOLD: f64 = 0.1;

/// Sticky set of sections that have faded in.
#[derive(Debug, Default, Clone)]
pub struct RevealTracker {
    revealed: HashSet<String>,
}

impl RevealTracker {
    pub fn is_revealed(&self, id: &str) -> bool {
        self.revealed.contains(id)
    }

    /// Mark every observed section that is now sufficiently on screen.
    pub fn observe<'a>(
        &mut self,
        layout: &impl LayoutProvider,
        sections: impl IntoIterator<Item = &'a str>,
    ) {
        let top = layout.scroll_y();
        let bottom = top + layout.viewport().height;
        for id in sections {
            if self.revealed.contains(id) {
                continue;
            }
            let Some(b) = layout.section(id) else {
                continue;
            };
            if visible_ratio(b, top, bottom) >= REVEAL_THRESHOLD {
                tracing::debug!(section = id, "revealed");
                self.revealed.insert(id.to_string());
            }
        }
    }

    /// Reveal unconditionally (content that arrives after it was on screen).
    pub fn reveal(&mut self, id: &str) {
        self.revealed.insert(id.to_string());
    }
}

fn visible_ratio(b: SectionBox, view_top: f64, view_bottom: f64) -> f64 {
    if b.height <= 0.0 {
        return 0.0;
    }
    let overlap = (b.bottom().min(view_bottom) - b.top.max(view_top)).max(0.0);
    overlap / b.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::page::{Page, PageSpec, ScrollSink, Viewport, BOARD, HERO_STICKY, MANIFESTO};

    fn page_at(y: f64) -> Page {
        let mut p = Page::new(PageSpec::portfolio(), Viewport::new(1024.0, 800.0));
        p.set_scroll_y(y);
        p
    }

    #[test]
    fn sticky_starts_zoomed_and_settles() {
        // hero-sticky top = 800 + 2000 = 2800
        let before = sticky_transform(&page_at(0.0), HERO_STICKY, 16.0).unwrap();
        assert_eq!(before.scale, 3.0);
        assert_eq!(before.translate_y, 800.0);

        let done = sticky_transform(&page_at(2800.0 - 16.0 + 1200.0), HERO_STICKY, 16.0).unwrap();
        assert_eq!(done.scale, 1.0);
        assert_eq!(done.translate_y, 0.0);
        assert_eq!(done.opacity, 1.0);
    }

    #[test]
    fn sticky_shrink_is_monotone() {
        let mut last = f64::INFINITY;
        for y in (2000..4200).step_by(50) {
            let t = sticky_transform(&page_at(y as f64), HERO_STICKY, 16.0).unwrap();
            assert!(t.scale <= last);
            last = t.scale;
        }
    }

    #[test]
    fn silhouette_clears_over_500px() {
        let dark = silhouette_filter(0.0);
        assert_eq!(dark.brightness, 0.0);
        assert_eq!(dark.contrast, 1.2);
        assert_eq!(dark.apply([255, 255, 255]), [0, 0, 0]);

        let clear = silhouette_filter(900.0);
        assert_eq!(clear.brightness, 1.0);
        assert_eq!(clear.shadow_alpha, 0.0);
        assert_eq!(clear.apply([200, 10, 128]), [200, 10, 128]);
    }

    #[test]
    fn manifesto_second_line_at_thirty_percent() {
        // Manifesto is 4vh tall → 3vh scrollable.
        let p = page_at(0.0);
        let m = p.section(MANIFESTO).unwrap();
        let p = page_at(m.top + 0.30 * 3.0 * 800.0);
        let progress = manifesto_progress(&p, MANIFESTO).unwrap();
        assert!((progress - 0.30).abs() < 1e-9);
        assert_eq!(active_line(progress, 4), Some(1));
    }

    #[test]
    fn manifesto_line_bands() {
        assert_eq!(active_line(0.0, 4), Some(0));
        assert_eq!(active_line(0.2499, 4), Some(0));
        assert_eq!(active_line(0.25, 4), Some(1));
        assert_eq!(active_line(0.5, 4), Some(2));
        assert_eq!(active_line(0.75, 4), Some(3));
        assert_eq!(active_line(1.0, 4), Some(3));
        assert_eq!(active_line(0.5, 0), None);
    }

    #[test]
    fn manifesto_far_away_is_skipped() {
        assert!(manifesto_progress(&page_at(0.0), MANIFESTO).is_none());
    }

    #[test]
    fn zero_span_counts_as_complete() {
        use crate::core::page::{Length, SectionKind, SectionSpec};
        let spec = PageSpec {
            sections: vec![SectionSpec {
                id: MANIFESTO.into(),
                kind: SectionKind::Manifesto { lines: vec!["a".into()] },
                height: Length::Vh(1.0),
                fade_up: false,
            }],
        };
        let p = Page::new(spec, Viewport::new(1024.0, 800.0));
        assert_eq!(manifesto_progress(&p, MANIFESTO), Some(1.0));
    }

    #[test]
    fn reveal_is_sticky() {
        let mut tracker = RevealTracker::default();
        tracker.observe(&page_at(0.0), [BOARD]);
        assert!(!tracker.is_revealed(BOARD));

        let p = page_at(0.0);
        let board = p.section(BOARD).unwrap();
        tracker.observe(&page_at(board.top - 700.0), [BOARD]);
        assert!(tracker.is_revealed(BOARD));
        tracker.observe(&page_at(0.0), [BOARD]);
        assert!(tracker.is_revealed(BOARD));
    }
}
