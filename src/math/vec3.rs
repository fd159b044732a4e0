/// 3D vector for model, light and camera positions
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Distance from the vertical axis, ignoring height
    pub fn horizontal_length(&self) -> f32 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    /// Point on a horizontal circle around the vertical axis
    pub fn on_orbit(angle: f32, radius: f32, height: f32) -> Self {
        Self {
            x: angle.cos() * radius,
            y: height,
            z: angle.sin() * radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_length_ignores_height() {
        let v = Vec3::new(3.0, 100.0, 4.0);
        assert!((v.horizontal_length() - 5.0).abs() < 0.0001);
    }

    #[test]
    fn test_on_orbit() {
        let p = Vec3::on_orbit(std::f32::consts::FRAC_PI_2, 2.0, 1.5);
        assert!(p.x.abs() < 0.0001);
        assert!((p.y - 1.5).abs() < 0.0001);
        assert!((p.z - 2.0).abs() < 0.0001);
        assert!((p.horizontal_length() - 2.0).abs() < 0.0001);
    }
}
