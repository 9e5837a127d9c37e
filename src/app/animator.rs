//! Frame-driven smooth scroll.
//!
//! The offset math lives in [`crate::core::easing::animated_offset`]; this
//! driver only stamps times, writes the result into the page, and releases
//! the scroll session when the run's full duration has elapsed.

use std::time::{Duration, Instant};

use crate::core::easing::{animated_offset, progress};
use crate::core::page::ScrollSink;
use crate::core::snap::{ScrollSession, SnapCommand};

/// One programmatic scroll from `start_offset` to `target_offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationRun {
    pub start_offset: f64,
    pub target_offset: f64,
    /// Stamped by the first frame, not by the trigger.
    pub started_at: Option<Instant>,
    pub duration: Duration,
}

impl AnimationRun {
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.started_at
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or_default()
    }

    pub fn progress(&self, now: Instant) -> f64 {
        progress(self.elapsed(now), self.duration)
    }
}

/// Owns the (at most one) live run.
#[derive(Debug, Clone, Default)]
pub struct SmoothScrollDriver {
    run: Option<AnimationRun>,
}

impl SmoothScrollDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_animating(&self) -> bool {
        self.run.is_some()
    }

    pub fn run(&self) -> Option<&AnimationRun> {
        self.run.as_ref()
    }

    /// Begin a run.  The caller must already hold the session (see
    /// [`ScrollSession::try_begin`]).
    pub fn start(&mut self, start_offset: f64, command: &SnapCommand) {
        self.run = Some(AnimationRun {
            start_offset,
            target_offset: command.target,
            started_at: None,
            duration: command.duration,
        });
    }

    /// Advance one frame.  Returns `true` while the run is still going.
    pub fn frame(
        &mut self,
        now: Instant,
        sink: &mut impl ScrollSink,
        session: &mut ScrollSession,
    ) -> bool {
        let Some(run) = self.run.as_mut() else {
            return false;
        };
        let started = *run.started_at.get_or_insert(now);
        let elapsed = now.saturating_duration_since(started);

        sink.set_scroll_y(animated_offset(
            elapsed,
            run.start_offset,
            run.target_offset,
            run.duration,
        ));

        if elapsed < run.duration {
            return true;
        }
        tracing::debug!(target = run.target_offset, "snap finished");
        self.run = None;
        session.finish();
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        y: f64,
        writes: usize,
    }

    impl ScrollSink for Recorder {
        fn set_scroll_y(&mut self, y: f64) {
            self.y = y;
            self.writes += 1;
        }
    }

    fn command(target: f64, ms: u64) -> SnapCommand {
        SnapCommand {
            zone: "test".into(),
            target,
            duration: Duration::from_millis(ms),
        }
    }

    #[test]
    fn run_lands_on_target_and_releases_session() {
        let t0 = Instant::now();
        let mut session = ScrollSession::new(60.0);
        assert!(session.try_begin());
        let mut driver = SmoothScrollDriver::new();
        let mut page = Recorder { y: 60.0, writes: 0 };
        driver.start(60.0, &command(1200.0, 2000));

        // First frame stamps the clock and writes the start offset.
        assert!(driver.frame(t0, &mut page, &mut session));
        assert_eq!(page.y, 60.0);

        let mut last = page.y;
        let mut ms = 16;
        while driver.frame(t0 + Duration::from_millis(ms), &mut page, &mut session) {
            assert!(page.y >= last);
            assert!(session.is_auto_scrolling(), "released early at {ms}ms");
            last = page.y;
            ms += 16;
        }
        assert!(ms >= 2000);
        assert_eq!(page.y, 1200.0);
        assert!(!session.is_auto_scrolling());
        assert!(!driver.is_animating());
    }

    #[test]
    fn zero_duration_finishes_on_first_frame() {
        let mut session = ScrollSession::new(0.0);
        session.try_begin();
        let mut driver = SmoothScrollDriver::new();
        let mut page = Recorder::default();
        driver.start(0.0, &command(500.0, 0));
        assert!(!driver.frame(Instant::now(), &mut page, &mut session));
        assert_eq!(page.y, 500.0);
        assert!(!session.is_auto_scrolling());
    }

    #[test]
    fn idle_driver_writes_nothing() {
        let mut session = ScrollSession::new(0.0);
        let mut driver = SmoothScrollDriver::new();
        let mut page = Recorder::default();
        assert!(!driver.frame(Instant::now(), &mut page, &mut session));
        assert_eq!(page.writes, 0);
    }

    #[test]
    fn progress_clamps_after_duration() {
        let t0 = Instant::now();
        let run = AnimationRun {
            start_offset: 0.0,
            target_offset: 10.0,
            started_at: Some(t0),
            duration: Duration::from_millis(100),
        };
        assert_eq!(run.progress(t0 + Duration::from_millis(50)), 0.5);
        assert_eq!(run.progress(t0 + Duration::from_secs(3)), 1.0);
    }
}
