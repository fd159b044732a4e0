//! Easing functions for phase transitions

use serde::Deserialize;

/// Easing curve applied to a phase's raw time fraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Raw time fraction, used by phases that drive oscillations directly
    Linear,
    /// Symmetric quadratic ease-in-out
    #[default]
    EaseInOutQuad,
    /// Cubic deceleration
    EaseOutCubic,
}

impl Easing {
    /// Apply the curve to `t`, clamped to [0, 1]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInOutQuad => ease_in_out_quad(t),
            Easing::EaseOutCubic => ease_out_cubic(t),
        }
    }
}

pub fn ease_in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}
