//! Snap decision engine: decides, once per throttled scroll tick, whether the
//! viewport sits in a dead zone between two section targets and should be
//! carried to the next one.
//!
//! Zones are plain data ([`ZoneDescriptor`]) evaluated generically in order;
//! the only mutable state is the [`ScrollSession`], which also acts as the
//! mutual-exclusion gate between the engine and the animator.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::page::{LayoutProvider, HERO_STICKY, MANIFESTO, SUB_STICKY};

// ───────────────────────────────────────── session ───────────

/// Scroll direction relative to the previous observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Down,
    /// Up or unchanged.
    Up,
}

/// Scroll session state shared by the engine and the animator.
#[derive(Debug, Clone, Default)]
pub struct ScrollSession {
    auto_scrolling: bool,
    last_scroll_y: f64,
}

impl ScrollSession {
    pub fn new(initial_scroll_y: f64) -> Self {
        Self {
            auto_scrolling: false,
            last_scroll_y: initial_scroll_y,
        }
    }

    pub fn is_auto_scrolling(&self) -> bool {
        self.auto_scrolling
    }

    pub fn last_scroll_y(&self) -> f64 {
        self.last_scroll_y
    }

    /// Record `scroll_y` and report which way it moved since the last call.
    pub fn observe(&mut self, scroll_y: f64) -> Direction {
        let dir = if scroll_y > self.last_scroll_y {
            Direction::Down
        } else {
            Direction::Up
        };
        self.last_scroll_y = scroll_y;
        dir
    }

    /// Claim the session for a programmatic scroll.  Returns `false` if a run
    /// is already in flight.
    pub fn try_begin(&mut self) -> bool {
        if self.auto_scrolling {
            return false;
        }
        self.auto_scrolling = true;
        true
    }

    /// Release the session once the animation has run its full duration.
    pub fn finish(&mut self) {
        self.auto_scrolling = false;
    }
}

// ───────────────────────────────────────── zones ─────────────

/// A scroll offset derived from live layout.
#[derive(Debug, Clone, PartialEq)]
pub enum Anchor {
    /// Absolute top of the page (offset 0).
    PageTop,
    /// `section.top + fraction × viewport height`.
    SectionViewport { section: String, fraction: f64 },
    /// `section.top + fraction × (section.height − viewport height)`.
    SectionSpan { section: String, fraction: f64 },
}

impl Anchor {
    pub fn viewport(section: &str, fraction: f64) -> Self {
        Anchor::SectionViewport {
            section: section.to_string(),
            fraction,
        }
    }

    pub fn span(section: &str, fraction: f64) -> Self {
        Anchor::SectionSpan {
            section: section.to_string(),
            fraction,
        }
    }

    pub fn resolve(&self, layout: &impl LayoutProvider) -> Option<f64> {
        let vh = layout.viewport().height;
        let offset = match self {
            Anchor::PageTop => 0.0,
            Anchor::SectionViewport { section, fraction } => {
                layout.section(section)?.top + fraction * vh
            }
            Anchor::SectionSpan { section, fraction } => {
                let b = layout.section(section)?;
                b.top + fraction * (b.height - vh)
            }
        };
        offset.is_finite().then_some(offset)
    }
}

/// One snap zone: `(from + lower_margin, to − upper_margin)`, snapping to `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneDescriptor {
    pub name: String,
    pub from: Anchor,
    pub lower_margin: f64,
    pub to: Anchor,
    pub upper_margin: f64,
}

/// A zone with its bounds resolved against the current layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedZone {
    pub lower: f64,
    pub target: f64,
    pub upper: f64,
}

impl ResolvedZone {
    /// Open-interval membership.
    pub fn contains(&self, scroll_y: f64) -> bool {
        scroll_y > self.lower && scroll_y < self.upper
    }
}

impl ZoneDescriptor {
    pub fn resolve(&self, layout: &impl LayoutProvider) -> Option<ResolvedZone> {
        let from = self.from.resolve(layout)?;
        let target = self.to.resolve(layout)?;
        Some(ResolvedZone {
            lower: from + self.lower_margin,
            target,
            upper: target - self.upper_margin,
        })
    }
}

// ───────────────────────────────────────── config ────────────

/// Tunables for the engine.  Defaults match the portfolio page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Minimum gap between two snap decisions.
    pub throttle_ms: u64,
    /// Viewports at or below this width never snap.
    pub mobile_breakpoint: f64,
    pub desktop_duration_ms: u64,
    pub mobile_duration_ms: u64,
    /// Minimum distance from the page top before the first zone arms.
    pub start_threshold: f64,
    /// Distance past a section target before the next zone arms.
    pub section_margin: f64,
    /// Dead-zone edge used around manifesto targets and before every target.
    pub buffer: f64,
    /// Manifesto snap points as fractions of its scrollable span.
    pub manifesto_stops: Vec<f64>,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 50,
            mobile_breakpoint: 768.0,
            desktop_duration_ms: 2000,
            mobile_duration_ms: 800,
            start_threshold: 50.0,
            section_margin: 50.0,
            buffer: 100.0,
            manifesto_stops: vec![0.10, 0.325, 0.575, 0.85],
        }
    }
}

impl SnapConfig {
    /// Replace non-finite or out-of-range values with the defaults.
    pub fn sanitise(&mut self) {
        let defaults = Self::default();
        let distance = |v: f64, fallback: f64| if v.is_finite() && v >= 0.0 { v } else { fallback };
        self.mobile_breakpoint = distance(self.mobile_breakpoint, defaults.mobile_breakpoint);
        self.start_threshold = distance(self.start_threshold, defaults.start_threshold);
        self.section_margin = distance(self.section_margin, defaults.section_margin);
        self.buffer = distance(self.buffer, defaults.buffer);
        if self.throttle_ms == 0 {
            self.throttle_ms = defaults.throttle_ms;
        }
        if self
            .manifesto_stops
            .iter()
            .any(|s| !s.is_finite() || !(0.0..=1.0).contains(s))
        {
            self.manifesto_stops = defaults.manifesto_stops;
        }
    }

    /// Build the ordered zone list: page top → workbook showcase → hero
    /// showcase → each manifesto line.
    pub fn zones(&self) -> Vec<ZoneDescriptor> {
        let first = Anchor::viewport(SUB_STICKY, 0.5);
        let second = Anchor::viewport(HERO_STICKY, 0.5);

        let mut zones = vec![
            ZoneDescriptor {
                name: "top → workbook".into(),
                from: Anchor::PageTop,
                lower_margin: self.start_threshold,
                to: first.clone(),
                upper_margin: self.buffer,
            },
            ZoneDescriptor {
                name: "workbook → method".into(),
                from: first,
                lower_margin: self.section_margin,
                to: second.clone(),
                upper_margin: self.buffer,
            },
        ];

        let mut prev = second;
        let mut prev_margin = self.section_margin;
        for (i, &stop) in self.manifesto_stops.iter().enumerate() {
            let to = Anchor::span(MANIFESTO, stop);
            zones.push(ZoneDescriptor {
                name: format!("manifesto line {}", i + 1),
                from: prev,
                lower_margin: prev_margin,
                to: to.clone(),
                upper_margin: self.buffer,
            });
            prev = to;
            prev_margin = self.buffer;
        }
        zones
    }

    /// Desktop gets the slow, cinematic run; narrow viewports a quick one.
    pub fn duration_for(&self, viewport_width: f64) -> Duration {
        if viewport_width < self.mobile_breakpoint {
            Duration::from_millis(self.mobile_duration_ms)
        } else {
            Duration::from_millis(self.desktop_duration_ms)
        }
    }
}

// ───────────────────────────────────────── engine ────────────

/// Instruction for the animator.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapCommand {
    pub zone: String,
    pub target: f64,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct SnapEngine {
    config: SnapConfig,
    zones: Vec<ZoneDescriptor>,
}

impl SnapEngine {
    pub fn new(config: SnapConfig) -> Self {
        let zones = config.zones();
        Self { config, zones }
    }

    pub fn zones(&self) -> &[ZoneDescriptor] {
        &self.zones
    }

    /// Run one decision tick.  On a match the session is claimed before
    /// returning, so a second tick cannot fire before the first frame runs.
    pub fn decide(
        &self,
        session: &mut ScrollSession,
        layout: &impl LayoutProvider,
    ) -> Option<SnapCommand> {
        let viewport = layout.viewport();
        if viewport.width <= self.config.mobile_breakpoint {
            return None;
        }
        if session.is_auto_scrolling() {
            return None;
        }

        let current = layout.scroll_y();
        if session.observe(current) != Direction::Down {
            return None;
        }

        for zone in &self.zones {
            let Some(resolved) = zone.resolve(layout) else {
                continue;
            };
            if !resolved.contains(current) {
                continue;
            }
            if !session.try_begin() {
                return None;
            }
            let duration = self.config.duration_for(viewport.width);
            tracing::debug!(
                zone = %zone.name,
                from = current,
                target = resolved.target,
                duration_ms = duration.as_millis() as u64,
                "snap"
            );
            return Some(SnapCommand {
                zone: zone.name.clone(),
                target: resolved.target,
                duration,
            });
        }
        None
    }
}

impl Default for SnapEngine {
    fn default() -> Self {
        Self::new(SnapConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::page::{SectionBox, Viewport};
    use std::collections::HashMap;

    /// Hand-placed sections; vh = 800.
    struct FakeLayout {
        scroll_y: f64,
        viewport: Viewport,
        sections: HashMap<&'static str, SectionBox>,
    }

    impl FakeLayout {
        fn desktop() -> Self {
            let mut sections = HashMap::new();
            sections.insert(SUB_STICKY, SectionBox { top: 800.0, height: 2000.0 });
            sections.insert(HERO_STICKY, SectionBox { top: 2800.0, height: 2000.0 });
            sections.insert(MANIFESTO, SectionBox { top: 4800.0, height: 3200.0 });
            Self {
                scroll_y: 0.0,
                viewport: Viewport::new(1024.0, 800.0),
                sections,
            }
        }

        fn at(mut self, y: f64) -> Self {
            self.scroll_y = y;
            self
        }

        fn width(mut self, w: f64) -> Self {
            self.viewport.width = w;
            self
        }
    }

    impl LayoutProvider for FakeLayout {
        fn scroll_y(&self) -> f64 {
            self.scroll_y
        }
        fn viewport(&self) -> Viewport {
            self.viewport
        }
        fn section(&self, id: &str) -> Option<SectionBox> {
            self.sections.get(id).copied()
        }
    }

    fn tick(engine: &SnapEngine, from: f64, layout: &FakeLayout) -> Option<SnapCommand> {
        let mut session = ScrollSession::new(from);
        engine.decide(&mut session, layout)
    }

    #[test]
    fn first_scroll_off_the_top_snaps_to_workbook() {
        let engine = SnapEngine::default();
        let layout = FakeLayout::desktop().at(60.0);
        let cmd = tick(&engine, 0.0, &layout).expect("snap");
        assert_eq!(cmd.target, 1200.0);
        assert_eq!(cmd.duration, Duration::from_millis(2000));
    }

    #[test]
    fn narrow_viewport_never_snaps() {
        let engine = SnapEngine::default();
        for w in [320.0, 500.0, 768.0] {
            for y in (0..8000).step_by(37) {
                let layout = FakeLayout::desktop().width(w).at(y as f64);
                assert!(tick(&engine, y as f64 - 10.0, &layout).is_none());
            }
        }
    }

    #[test]
    fn below_first_lower_bound_never_snaps() {
        let engine = SnapEngine::default();
        for y in [1.0, 10.0, 49.0, 50.0] {
            let layout = FakeLayout::desktop().at(y);
            assert!(tick(&engine, 0.0, &layout).is_none(), "snapped at {y}");
        }
    }

    #[test]
    fn upward_scroll_never_snaps() {
        let engine = SnapEngine::default();
        for y in (0..8000).step_by(13) {
            let layout = FakeLayout::desktop().at(y as f64);
            assert!(tick(&engine, y as f64 + 5.0, &layout).is_none());
            assert!(tick(&engine, y as f64, &layout).is_none());
        }
    }

    #[test]
    fn every_offset_inside_a_zone_snaps_to_its_target() {
        let engine = SnapEngine::default();
        let base = FakeLayout::desktop();
        for zone in engine.zones() {
            let r = zone.resolve(&base).unwrap();
            let mut y = r.lower + 1.0;
            while y < r.upper {
                let layout = FakeLayout::desktop().at(y);
                let cmd = tick(&engine, r.lower, &layout).expect("snap");
                assert_eq!(cmd.target, r.target, "zone {} at {y}", zone.name);
                y += 25.0;
            }
        }
    }

    #[test]
    fn manifesto_targets_are_span_fractions() {
        let engine = SnapEngine::default();
        let layout = FakeLayout::desktop();
        let targets: Vec<f64> = engine
            .zones()
            .iter()
            .map(|z| z.resolve(&layout).unwrap().target)
            .collect();
        // span = 3200 − 800 = 2400
        let expected = [1200.0, 3200.0, 5040.0, 5580.0, 6180.0, 6840.0];
        assert_eq!(targets.len(), expected.len());
        for (got, want) in targets.iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "{got} != {want}");
        }
    }

    #[test]
    fn in_flight_run_blocks_new_snaps() {
        let engine = SnapEngine::default();
        let mut session = ScrollSession::new(200.0);
        assert!(session.try_begin());
        let layout = FakeLayout::desktop().at(400.0);
        assert!(engine.decide(&mut session, &layout).is_none());
        assert!(session.is_auto_scrolling());
        // Direction memory is not touched while gated.
        assert_eq!(session.last_scroll_y(), 200.0);
    }

    #[test]
    fn decision_claims_the_session_synchronously() {
        let engine = SnapEngine::default();
        let mut session = ScrollSession::new(0.0);
        let layout = FakeLayout::desktop().at(60.0);
        assert!(engine.decide(&mut session, &layout).is_some());
        assert!(session.is_auto_scrolling());
        let later = FakeLayout::desktop().at(90.0);
        assert!(engine.decide(&mut session, &later).is_none());
    }

    #[test]
    fn missing_manifesto_skips_its_zones_only() {
        let engine = SnapEngine::default();
        let mut layout = FakeLayout::desktop();
        layout.sections.remove(MANIFESTO);
        let layout = layout.at(1300.0);
        assert_eq!(tick(&engine, 1250.0, &layout).unwrap().target, 3200.0);
        let past = FakeLayout { sections: layout.sections, ..FakeLayout::desktop() }.at(3300.0);
        assert!(tick(&engine, 3260.0, &past).is_none());
    }

    #[test]
    fn duration_policy() {
        let cfg = SnapConfig::default();
        assert_eq!(cfg.duration_for(1024.0), Duration::from_millis(2000));
        assert_eq!(cfg.duration_for(768.0), Duration::from_millis(2000));
        assert_eq!(cfg.duration_for(500.0), Duration::from_millis(800));
    }
}
