//! Ambient drifting particles
//!
//! A loose cloud of sparks that rises slowly through a bounding box and
//! wraps back to the floor. During the gathering phase the cloud is pulled
//! in toward the creature.

use rand::Rng;

use super::{field_rng, FieldRng, ParticleBuffer, ParticleField};
use crate::frame::FrameTick;
use crate::math::Color;

/// Axis-aligned volume the ambient particles live in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientBounds {
    /// Half extent on x and z around the vertical axis
    pub half_width: f32,
    pub bottom: f32,
    pub top: f32,
}

impl Default for AmbientBounds {
    fn default() -> Self {
        Self {
            half_width: 10.0,
            bottom: 0.0,
            top: 10.0,
        }
    }
}

impl AmbientBounds {
    pub fn contains(&self, p: [f32; 3]) -> bool {
        p[0].abs() <= self.half_width
            && p[2].abs() <= self.half_width
            && p[1] >= self.bottom
            && p[1] <= self.top
    }
}

/// Per-tick motion of the ambient field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientParams {
    /// Upward drift per reference frame
    pub rise: f32,
    /// Pull toward the model, 0 = none, 1 = full gathering strength
    pub gather: f32,
}

impl AmbientParams {
    pub const IDLE: AmbientParams = AmbientParams { rise: 0.005, gather: 0.0 };
    pub const FROZEN: AmbientParams = AmbientParams { rise: 0.0, gather: 0.0 };

    pub fn gathering(strength: f32) -> Self {
        Self {
            rise: 0.0,
            gather: strength.clamp(0.0, 1.0),
        }
    }
}

const GATHER_HORIZONTAL: f32 = 0.02;
const GATHER_VERTICAL: f32 = 0.05;

pub struct AmbientField {
    buffer: ParticleBuffer,
    bounds: AmbientBounds,
    palette: (Color, Color),
    opacity: f32,
    rng: FieldRng,
}

impl AmbientField {
    pub fn new(count: usize, seed: u64) -> Self {
        Self::with_bounds(count, seed, AmbientBounds::default())
    }

    pub fn with_bounds(count: usize, seed: u64, bounds: AmbientBounds) -> Self {
        let mut field = Self {
            buffer: ParticleBuffer::new(count),
            bounds,
            palette: (Color::from_hex(0xff6b6b), Color::from_hex(0x4ecdc4)),
            opacity: 0.6,
            rng: field_rng(seed),
        };

        for i in 0..count {
            let mix = field.rng.gen::<f32>();
            let color = field.palette.0.lerp(&field.palette.1, mix);
            field.buffer.set_color(i, color);
        }
        field.scatter();
        field
    }

    /// Re-sample every particle uniformly inside the bounds
    pub fn scatter(&mut self) {
        for i in 0..self.buffer.len() {
            let x = self.random_horizontal();
            let y = self.rng.gen_range(self.bounds.bottom..=self.bounds.top);
            let z = self.random_horizontal();
            self.buffer.set_position(i, x, y, z);
        }
    }

    pub fn bounds(&self) -> AmbientBounds {
        self.bounds
    }

    fn random_horizontal(&mut self) -> f32 {
        let w = self.bounds.half_width;
        self.rng.gen_range(-w..=w)
    }

    fn respawn_at_floor(&mut self, index: usize) {
        let x = self.random_horizontal();
        let z = self.random_horizontal();
        self.buffer.set_position(index, x, self.bounds.bottom, z);
    }
}

impl ParticleField for AmbientField {
    type Params = AmbientParams;

    fn advance(&mut self, tick: FrameTick, params: &AmbientParams) {
        let steps = tick.steps();
        let b = self.bounds;
        let height = (b.top - b.bottom).max(f32::EPSILON);

        for i in 0..self.buffer.len() {
            let [mut x, mut y, mut z] = self.buffer.position(i);

            if params.gather > 0.0 {
                let pull = params.gather * steps;
                x -= x * GATHER_HORIZONTAL * pull;
                z -= z * GATHER_HORIZONTAL * pull;
                y += (1.0 - (y - b.bottom) / height) * GATHER_VERTICAL * pull;
            }

            y += params.rise * steps;

            if y > b.top {
                self.respawn_at_floor(i);
                continue;
            }

            self.buffer.set_position(
                i,
                x.clamp(-b.half_width, b.half_width),
                y.max(b.bottom),
                z.clamp(-b.half_width, b.half_width),
            );
        }
    }

    fn buffer(&self) -> &ParticleBuffer {
        &self.buffer
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }
}
