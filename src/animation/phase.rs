//! Fixed-duration phase timing
//!
//! A `PhaseAnimator` is stepped once per frame tick and reports the raw and
//! eased progress of the phase. The final frame always reports exactly
//! `raw == 1.0` and `eased == 1.0`, so phases can rely on exact end values.

use super::easing::Easing;
use crate::frame::FrameTick;

/// Progress of a phase for a single frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseFrame {
    /// Linear time fraction in [0, 1]
    pub raw: f32,
    /// `raw` passed through the phase easing
    pub eased: f32,
    /// The frame tick that produced this progress
    pub tick: FrameTick,
    /// True on the last frame of the phase
    pub finished: bool,
}

impl PhaseFrame {
    /// Reference frames covered by this frame, for per-frame motion
    pub fn steps(&self) -> f32 {
        self.tick.steps()
    }
}

/// Timing state for one running phase
#[derive(Debug, Clone)]
pub struct PhaseAnimator {
    duration_ms: f32,
    elapsed_ms: f32,
    easing: Easing,
    finished: bool,
}

impl PhaseAnimator {
    pub fn new(duration_ms: f32, easing: Easing) -> Self {
        Self {
            duration_ms: duration_ms.max(0.0),
            elapsed_ms: 0.0,
            easing,
            finished: false,
        }
    }

    /// Advance by one frame tick and return this frame's progress.
    ///
    /// Stepping a finished animator keeps returning the final frame.
    pub fn step(&mut self, tick: FrameTick) -> PhaseFrame {
        if !self.finished {
            self.elapsed_ms += tick.dt_ms.max(0.0);
        }

        let raw = if self.duration_ms <= 0.0 {
            1.0
        } else {
            (self.elapsed_ms / self.duration_ms).min(1.0)
        };

        if raw >= 1.0 {
            self.finished = true;
            return PhaseFrame {
                raw: 1.0,
                eased: 1.0,
                tick,
                finished: true,
            };
        }

        PhaseFrame {
            raw,
            eased: self.easing.apply(raw),
            tick,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

}
