//! Lights and camera choreographed by the phases

use serde::Deserialize;

use crate::math::{Color, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: f32,
    pub color: Color,
}

impl PointLight {
    pub fn new(position: Vec3, intensity: f32, color: Color) -> Self {
        Self { position, intensity, color }
    }

    /// Place the light on a horizontal orbit around the model
    pub fn orbit(&mut self, angle: f32, radius: f32, height: f32) {
        self.position = Vec3::on_orbit(angle, radius, height);
    }

    /// Flat `[x, y, z, intensity, r, g, b]` for the render host
    pub fn to_array(&self) -> [f32; 7] {
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.intensity,
            self.color.r,
            self.color.g,
            self.color.b,
        ]
    }
}

/// Light as written in the YAML config
#[derive(Debug, Clone, Deserialize)]
pub struct LightSpec {
    pub position: [f32; 3],
    #[serde(default = "default_intensity")]
    pub intensity: f32,
    /// Packed `0xRRGGBB`
    pub color: u32,
}

fn default_intensity() -> f32 {
    2.0
}

impl LightSpec {
    pub fn build(&self) -> PointLight {
        let [x, y, z] = self.position;
        PointLight::new(Vec3::new(x, y, z), self.intensity, Color::from_hex(self.color))
    }
}

/// The two effect lights flanking the model
pub fn default_lights() -> Vec<LightSpec> {
    vec![
        LightSpec { position: [-3.0, 3.0, 0.0], intensity: 2.0, color: 0xff6b6b },
        LightSpec { position: [3.0, 3.0, 0.0], intensity: 2.0, color: 0x4ecdc4 },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 8.0),
            target: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}

impl Camera {
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Flat `[px, py, pz, tx, ty, tz]` for the render host
    pub fn to_array(&self) -> [f32; 6] {
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.target.x,
            self.target.y,
            self.target.z,
        ]
    }
}
