//! Frame tick source
//!
//! The host calls into the app once per display frame with its timestamp.
//! `FrameClock` turns those timestamps into `FrameTick`s; tests build ticks
//! directly with `FrameTick::fixed` to step frames deterministically.

/// Duration of one reference frame (60 Hz). Per-frame motion constants are
/// expressed per reference frame and scaled by `FrameTick::steps`.
pub const REFERENCE_FRAME_MS: f32 = 1000.0 / 60.0;

/// Longest delta that per-frame motion covers; larger gaps (background tabs)
/// move particles and spins as if only this much time had passed
pub const MAX_FRAME_MS: f32 = 100.0;

/// One display frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Wall-clock time since the previous frame. Phase timing uses it as is.
    pub dt_ms: f32,
}

impl FrameTick {
    pub fn fixed(dt_ms: f32) -> Self {
        Self { dt_ms: dt_ms.max(0.0) }
    }

    /// Reference frames of motion covered by this tick
    pub fn steps(&self) -> f32 {
        self.dt_ms.min(MAX_FRAME_MS) / REFERENCE_FRAME_MS
    }
}

/// Converts host timestamps (e.g. `requestAnimationFrame` time) into ticks
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the tick for a frame observed at `now_ms`.
    ///
    /// The first frame has a zero delta; non-monotonic timestamps also yield zero.
    pub fn tick(&mut self, now_ms: f64) -> FrameTick {
        let dt = match self.last_ms {
            Some(last) => (now_ms - last).max(0.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        FrameTick::fixed(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_has_zero_delta() {
        let mut clock = FrameClock::new();
        let tick = clock.tick(1234.0);
        assert_eq!(tick.dt_ms, 0.0);
        assert_eq!(tick.steps(), 0.0);
    }

    #[test]
    fn test_delta_between_ticks() {
        let mut clock = FrameClock::new();
        clock.tick(1000.0);
        let tick = clock.tick(1016.0);
        assert!((tick.dt_ms - 16.0).abs() < 0.001);
    }

    #[test]
    fn test_large_gap_keeps_time_but_clamps_motion() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        let tick = clock.tick(10_000.0);
        assert_eq!(tick.dt_ms, 10_000.0);
        assert!((tick.steps() - MAX_FRAME_MS / REFERENCE_FRAME_MS).abs() < 0.0001);
    }

    #[test]
    fn test_backwards_timestamp() {
        let mut clock = FrameClock::new();
        clock.tick(500.0);
        let tick = clock.tick(400.0);
        assert_eq!(tick.dt_ms, 0.0);
    }

    #[test]
    fn test_reference_frame_is_one_step() {
        let tick = FrameTick::fixed(REFERENCE_FRAME_MS);
        assert!((tick.steps() - 1.0).abs() < 0.0001);
    }
}
