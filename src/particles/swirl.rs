//! Swirling data-stream particles
//!
//! Particles orbit the vertical axis through the model. Each keeps its own
//! base radius, angle, angular speed and cycling height; the phase supplies
//! how fast the vortex spins, how tight it is and whether it collapses onto
//! the model's focus height.

use std::f32::consts::TAU;

use rand::Rng;

use super::{field_rng, FieldRng, ParticleBuffer, ParticleField};
use crate::frame::FrameTick;
use crate::math::Color;

/// Sampling ranges for the vortex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwirlShape {
    pub min_radius: f32,
    pub max_radius: f32,
    /// Heights cycle in [0, height_range)
    pub height_range: f32,
    pub min_speed: f32,
    pub max_speed: f32,
}

impl Default for SwirlShape {
    fn default() -> Self {
        Self {
            min_radius: 0.5,
            max_radius: 3.5,
            height_range: 8.0,
            min_speed: 0.02,
            max_speed: 0.05,
        }
    }
}

/// Per-tick motion of the swirl field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwirlParams {
    /// Angular speed multiplier
    pub spin: f32,
    /// Orbit radius as a fraction of each particle's base radius
    pub radius_scale: f32,
    /// Vertical speed multiplier
    pub rise: f32,
    /// 0 = heights as sampled, 1 = every particle at `focus_height`
    pub collapse: f32,
    pub focus_height: f32,
}

impl SwirlParams {
    pub const AT_REST: SwirlParams = SwirlParams {
        spin: 0.0,
        radius_scale: 1.0,
        rise: 0.0,
        collapse: 0.0,
        focus_height: 1.0,
    };
}

impl Default for SwirlParams {
    fn default() -> Self {
        Self::AT_REST
    }
}

pub struct SwirlField {
    buffer: ParticleBuffer,
    shape: SwirlShape,
    base_radius: Vec<f32>,
    radius: Vec<f32>,
    angle: Vec<f32>,
    speed: Vec<f32>,
    height: Vec<f32>,
    opacity: f32,
    rotation_y: f32,
    rng: FieldRng,
}

impl SwirlField {
    pub fn new(count: usize, seed: u64) -> Self {
        Self::with_shape(count, seed, SwirlShape::default())
    }

    pub fn with_shape(count: usize, seed: u64, shape: SwirlShape) -> Self {
        let mut rng = field_rng(seed);
        let cyan = Color::from_hex(0x00ffff);
        let magenta = Color::from_hex(0xff00ff);

        let mut buffer = ParticleBuffer::new(count);
        let mut base_radius = Vec::with_capacity(count);
        let mut speed = Vec::with_capacity(count);

        for i in 0..count {
            base_radius.push(rng.gen_range(shape.min_radius..=shape.max_radius));
            speed.push(rng.gen_range(shape.min_speed..=shape.max_speed));
            buffer.set_color(i, cyan.lerp(&magenta, rng.gen::<f32>()));
        }

        let mut field = Self {
            buffer,
            shape,
            radius: base_radius.clone(),
            base_radius,
            angle: vec![0.0; count],
            speed,
            height: vec![0.0; count],
            opacity: 0.0,
            rotation_y: 0.0,
            rng,
        };
        field.respawn();
        field
    }

    /// Re-sample every particle's angle and height, keeping its base radius
    pub fn respawn(&mut self) {
        for i in 0..self.buffer.len() {
            self.angle[i] = self.rng.gen_range(0.0..TAU);
            self.height[i] = self.rng.gen_range(0.0..self.shape.height_range);
            self.radius[i] = self.base_radius[i];
            self.place(i, &SwirlParams::AT_REST);
        }
    }

    /// Full reset: respawn, hide and unrotate the field
    pub fn reset(&mut self) {
        self.respawn();
        self.opacity = 0.0;
        self.rotation_y = 0.0;
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Spin the whole field around the vertical axis
    pub fn rotate(&mut self, delta: f32) {
        self.rotation_y = (self.rotation_y + delta).rem_euclid(TAU);
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    pub fn radius(&self, index: usize) -> f32 {
        self.radius[index]
    }

    pub fn shape(&self) -> SwirlShape {
        self.shape
    }

    /// Radius range every particle must lie in for a given `radius_scale`
    pub fn radius_envelope(&self, radius_scale: f32) -> (f32, f32) {
        let s = radius_scale.max(0.0);
        (self.shape.min_radius * s, self.shape.max_radius * s)
    }

    fn place(&mut self, i: usize, params: &SwirlParams) {
        let collapse = params.collapse.clamp(0.0, 1.0);
        let y = self.height[i] * (1.0 - collapse) + params.focus_height * collapse;
        let a = self.angle[i];
        let r = self.radius[i];
        self.buffer.set_position(i, a.cos() * r, y, a.sin() * r);
    }
}

impl ParticleField for SwirlField {
    type Params = SwirlParams;

    fn advance(&mut self, tick: FrameTick, params: &SwirlParams) {
        let steps = tick.steps();
        let scale = params.radius_scale.max(0.0);
        let range = self.shape.height_range;

        for i in 0..self.buffer.len() {
            // New state comes only from the stored arrays, never from positions
            let speed = self.speed[i];
            self.angle[i] = (self.angle[i] + speed * params.spin * steps).rem_euclid(TAU);
            self.radius[i] = self.base_radius[i] * scale;
            self.height[i] = (self.height[i] + speed * params.rise * steps).rem_euclid(range);
            self.place(i, params);
        }
    }

    fn buffer(&self) -> &ParticleBuffer {
        &self.buffer
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }
}
