//! Wall-clock frame timing.

use std::time::Instant;

/// Measures elapsed seconds between consecutive frames.
///
/// The first tick reports zero; later ticks are clamped to `max_delta` so a
/// stalled window does not produce one enormous simulation step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    max_delta: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(0.25)
    }
}

impl FrameClock {
    /// Create a clock clamping deltas to `max_delta` seconds.
    pub fn new(max_delta: f32) -> Self {
        Self {
            last: None,
            max_delta,
        }
    }

    /// Record a frame at `now` and return the seconds since the previous one.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let dt = match self.last {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => 0.0,
        };
        self.last = Some(now);
        dt.min(self.max_delta)
    }

    /// Forget the previous frame (e.g. after the window regains focus).
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn first_tick_is_zero() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.tick(Instant::now()), 0.0);
    }

    #[test]
    fn tick_measures_and_clamps() {
        let mut clock = FrameClock::new(0.1);
        let start = Instant::now();
        clock.tick(start);
        let dt = clock.tick(start + Duration::from_millis(50));
        assert!((dt - 0.05).abs() < 1e-4);
        let dt = clock.tick(start + Duration::from_secs(5));
        assert_eq!(dt, 0.1);
    }
}
