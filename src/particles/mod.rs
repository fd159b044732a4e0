//! Particle fields driven by the evolution phases
//!
//! Both fields keep their particles in fixed-size parallel arrays. Particles
//! are never added or removed after construction; leaving the field's
//! lifecycle range respawns a particle in place.

mod ambient;
mod swirl;

pub use ambient::{AmbientBounds, AmbientField, AmbientParams};
pub use swirl::{SwirlField, SwirlParams, SwirlShape};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::frame::FrameTick;
use crate::math::Color;

/// Seeded generator used for particle sampling, so runs are reproducible
pub type FieldRng = ChaCha8Rng;

pub(crate) fn field_rng(seed: u64) -> FieldRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Interleaved xyz positions and rgb colors, 3 floats per particle each
#[derive(Debug, Clone)]
pub struct ParticleBuffer {
    positions: Vec<f32>,
    colors: Vec<f32>,
}

impl ParticleBuffer {
    pub fn new(count: usize) -> Self {
        Self {
            positions: vec![0.0; count * 3],
            colors: vec![0.0; count * 3],
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position(&self, index: usize) -> [f32; 3] {
        let i3 = index * 3;
        [self.positions[i3], self.positions[i3 + 1], self.positions[i3 + 2]]
    }

    pub fn set_position(&mut self, index: usize, x: f32, y: f32, z: f32) {
        let i3 = index * 3;
        self.positions[i3] = x;
        self.positions[i3 + 1] = y;
        self.positions[i3 + 2] = z;
    }

    pub fn set_color(&mut self, index: usize, color: Color) {
        let i3 = index * 3;
        self.colors[i3] = color.r;
        self.colors[i3 + 1] = color.g;
        self.colors[i3 + 2] = color.b;
    }

    /// Flat position data for GPU upload
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Flat color data for GPU upload
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }
}

/// Common surface of both particle fields
pub trait ParticleField {
    type Params;

    /// Move every particle by one frame tick under `params`
    fn advance(&mut self, tick: FrameTick, params: &Self::Params);

    fn buffer(&self) -> &ParticleBuffer;

    /// Opacity of the whole field
    fn opacity(&self) -> f32;

    fn len(&self) -> usize {
        self.buffer().len()
    }

    fn is_empty(&self) -> bool {
        self.buffer().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_layout() {
        let mut buffer = ParticleBuffer::new(4);
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.positions().len(), 12);
        assert_eq!(buffer.colors().len(), 12);

        buffer.set_position(2, 1.0, 2.0, 3.0);
        assert_eq!(buffer.position(2), [1.0, 2.0, 3.0]);
        assert_eq!(&buffer.positions()[6..9], &[1.0, 2.0, 3.0]);

        buffer.set_color(1, Color::new(0.1, 0.2, 0.3));
        assert_eq!(&buffer.colors()[3..6], &[0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = ParticleBuffer::new(0);
        assert!(buffer.is_empty());
    }
}
