//! Display-paced frame clock.
//!
//! The host calls [`FrameClock::tick`] once per refresh. Layer rotations are pure
//! functions of the accumulated elapsed time, so there is no fixed simulation step;
//! the clock only measures and clamps.

use std::time::Instant;

use tracing::warn;

/// Longest frame the clock will account for. After a stall the scene advances by at
/// most this much.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Measures wall-clock time between frames and accumulates elapsed seconds.
pub struct FrameClock {
    previous_time: Option<Instant>,
    elapsed: f64,
    frame_count: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            previous_time: None,
            elapsed: 0.0,
            frame_count: 0,
        }
    }

    /// Measure the time since the previous tick and advance. The first tick advances by zero.
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f64 {
        let frame_time = self
            .previous_time
            .map_or(0.0, |previous| now.saturating_duration_since(previous).as_secs_f64());
        self.previous_time = Some(now);
        self.advance(frame_time)
    }

    /// Advance by an explicit frame time, clamped to `[0, MAX_FRAME_TIME]`. Returns the
    /// time actually applied.
    pub fn advance(&mut self, frame_time: f64) -> f64 {
        let mut dt = if frame_time.is_finite() {
            frame_time.max(0.0)
        } else {
            0.0
        };
        if dt > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                dt * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            dt = MAX_FRAME_TIME;
        }

        self.elapsed += dt;
        self.frame_count += 1;
        dt
    }

    /// Seconds accumulated across all ticks.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_tick_advances_by_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(), 0.0);
        assert_eq!(clock.frame_count(), 1);
    }

    #[test]
    fn test_tick_measures_between_instants() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick_at(start);
        let dt = clock.tick_at(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-9);
        assert!((clock.elapsed() - 0.016).abs() < 1e-9);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(3.0), MAX_FRAME_TIME);
        assert!((clock.elapsed() - MAX_FRAME_TIME).abs() < 1e-12);
    }

    #[test]
    fn test_negative_and_nan_frames_do_not_rewind() {
        let mut clock = FrameClock::new();
        clock.advance(0.5 * MAX_FRAME_TIME);
        clock.advance(-1.0);
        clock.advance(f64::NAN);
        assert!((clock.elapsed() - 0.5 * MAX_FRAME_TIME).abs() < 1e-12);
        assert_eq!(clock.frame_count(), 3);
    }

    #[test]
    fn test_earlier_instant_is_zero_frame() {
        let mut clock = FrameClock::new();
        let now = Instant::now();
        clock.tick_at(now + Duration::from_millis(10));
        assert_eq!(clock.tick_at(now), 0.0);
    }

    #[test]
    fn test_elapsed_accumulates() {
        let mut clock = FrameClock::default();
        for _ in 0..60 {
            clock.advance(1.0 / 60.0);
        }
        assert!((clock.elapsed() - 1.0).abs() < 1e-9);
        assert_eq!(clock.frame_count(), 60);
    }
}
