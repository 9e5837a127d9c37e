//! Easing curves and the pure offset interpolation used by the animator.

use std::time::Duration;

/// Symmetric cubic ease-in-out.
pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Cubic ease-out: fast start, slow finish.
pub fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// Normalised progress in `[0, 1]`.  A zero duration is already complete.
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

/// Scroll offset `elapsed` into an ease-in-out run from `start` to `end`.
pub fn animated_offset(elapsed: Duration, start: f64, end: f64, duration: Duration) -> f64 {
    let p = progress(elapsed, duration);
    if p >= 1.0 {
        return end;
    }
    start + (end - start) * ease_in_out_cubic(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUN: Duration = Duration::from_millis(2000);

    #[test]
    fn curves_hit_endpoints() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(0.5), 0.5);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
    }

    #[test]
    fn progress_clamps_at_one() {
        assert_eq!(progress(Duration::from_millis(1000), RUN), 0.5);
        assert_eq!(progress(RUN, RUN), 1.0);
        assert_eq!(progress(Duration::from_secs(10), RUN), 1.0);
        assert_eq!(progress(Duration::from_millis(5), Duration::ZERO), 1.0);
    }

    #[test]
    fn offset_is_monotone_and_lands_exactly() {
        let (start, end) = (60.0, 1337.25);
        let mut last = start;
        for ms in (0..=2200).step_by(16) {
            let y = animated_offset(Duration::from_millis(ms), start, end, RUN);
            assert!(y >= last, "offset went backwards at {ms}ms");
            last = y;
        }
        assert_eq!(animated_offset(RUN, start, end, RUN), end);
    }

    #[test]
    fn upward_runs_interpolate_too() {
        let y = animated_offset(Duration::from_millis(1000), 1000.0, 0.0, RUN);
        assert_eq!(y, 500.0);
    }
}
