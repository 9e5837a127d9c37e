//! Scroll sampler: rate-limits snap decisions.
//!
//! Raw scroll events arrive far faster than the decision engine needs.  The
//! first event arms a single deadline; further events are ignored until the
//! deadline fires and the engine has run.

use std::time::{Duration, Instant};

pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct ScrollThrottle {
    interval: Duration,
    pending_until: Option<Instant>,
}

impl ScrollThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending_until: None,
        }
    }

    /// Feed a raw scroll event.  Returns `true` if this event armed the timer.
    pub fn on_scroll(&mut self, now: Instant) -> bool {
        if self.pending_until.is_some() {
            return false;
        }
        self.pending_until = Some(now + self.interval);
        true
    }

    /// When the armed timer fires, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending_until
    }

    /// Returns `true` (and disarms) once the deadline has passed; the caller
    /// then runs one decision tick.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending_until {
            Some(at) if now >= at => {
                self.pending_until = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for ScrollThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_of_events_yields_one_tick() {
        let t0 = Instant::now();
        let mut throttle = ScrollThrottle::default();
        assert!(throttle.on_scroll(t0));
        for ms in 1..50 {
            assert!(!throttle.on_scroll(t0 + Duration::from_millis(ms)));
            assert!(!throttle.poll(t0 + Duration::from_millis(ms)));
        }
        assert!(throttle.poll(t0 + Duration::from_millis(50)));
        assert!(!throttle.poll(t0 + Duration::from_millis(51)));
        assert_eq!(throttle.deadline(), None);
    }

    #[test]
    fn rearms_after_firing() {
        let t0 = Instant::now();
        let mut throttle = ScrollThrottle::default();
        throttle.on_scroll(t0);
        throttle.poll(t0 + Duration::from_millis(60));
        assert!(throttle.on_scroll(t0 + Duration::from_millis(70)));
        assert_eq!(throttle.deadline(), Some(t0 + Duration::from_millis(120)));
    }

    #[test]
    fn ticks_are_bounded_to_twenty_hertz() {
        let t0 = Instant::now();
        let mut throttle = ScrollThrottle::default();
        let mut ticks = 0;
        // A scroll event every 4 ms for one second.
        for ms in (0..1000).step_by(4) {
            let now = t0 + Duration::from_millis(ms);
            if throttle.poll(now) {
                ticks += 1;
            }
            throttle.on_scroll(now);
        }
        assert!(ticks <= 20, "{ticks} ticks");
        assert!(ticks >= 18, "{ticks} ticks");
    }
}
