//! Phase timing and easing
//!
//! Every visual step of an evolution is a fixed-duration phase whose progress
//! is eased before it drives scene and particle state.

mod easing;
mod phase;

pub use easing::{Easing, ease_in_out_quad, ease_out_cubic};
pub use phase::{PhaseAnimator, PhaseFrame};
