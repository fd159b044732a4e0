//! Creature models as seen by the sequencer
//!
//! The render host owns the actual meshes; here a model is its transform,
//! visibility and the list of surfaces whose opacity can be faded.

use crate::math::Vec3;

/// One paintable material slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub opacity: f32,
    pub transparent: bool,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            transparent: false,
        }
    }
}

/// Every surface of a model, built once when the model is loaded.
///
/// A model always has at least one surface, so fades behave the same for
/// single- and multi-material meshes.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceList {
    surfaces: Vec<Surface>,
}

impl SurfaceList {
    pub fn new(count: usize) -> Self {
        Self {
            surfaces: vec![Surface::default(); count.max(1)],
        }
    }

    /// Fade all surfaces; fading always switches them to transparent
    pub fn set_opacity(&mut self, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        for surface in &mut self.surfaces {
            surface.transparent = true;
            surface.opacity = opacity;
        }
    }

    /// Back to fully opaque, non-transparent surfaces
    pub fn restore(&mut self) {
        for surface in &mut self.surfaces {
            *surface = Surface::default();
        }
    }

    pub fn opacity(&self) -> f32 {
        self.surfaces.first().map(|s| s.opacity).unwrap_or(1.0)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    pub position: Vec3,
    pub rotation_y: f32,
    pub scale: f32,
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation_y: 0.0,
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelState {
    pub name: String,
    pub transform: ModelTransform,
    pub visible: bool,
    pub surfaces: SurfaceList,
}

impl ModelState {
    pub fn new(name: &str, surface_count: usize) -> Self {
        Self {
            name: name.to_string(),
            transform: ModelTransform::default(),
            visible: false,
            surfaces: SurfaceList::new(surface_count),
        }
    }

    pub fn opacity(&self) -> f32 {
        self.surfaces.opacity()
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.surfaces.set_opacity(opacity);
    }

    /// Initial transform, opaque surfaces and the given visibility
    pub fn restore(&mut self, visible: bool) {
        self.transform = ModelTransform::default();
        self.surfaces.restore();
        self.visible = visible;
    }

    /// Flat `[x, y, z, rotation_y, scale, opacity, visible]` for the render host
    pub fn to_array(&self) -> [f32; 7] {
        let p = self.transform.position;
        [
            p.x,
            p.y,
            p.z,
            self.transform.rotation_y,
            self.transform.scale,
            self.opacity(),
            if self.visible { 1.0 } else { 0.0 },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_list_never_empty() {
        let list = SurfaceList::new(0);
        assert_eq!(list.len(), 1);
        assert_eq!(list.opacity(), 1.0);
    }

    #[test]
    fn test_fade_marks_all_surfaces_transparent() {
        let mut list = SurfaceList::new(3);
        list.set_opacity(0.25);
        assert!(list.iter().all(|s| s.transparent && s.opacity == 0.25));

        list.restore();
        assert!(list.iter().all(|s| !s.transparent && s.opacity == 1.0));
    }

    #[test]
    fn test_opacity_clamped() {
        let mut list = SurfaceList::new(1);
        list.set_opacity(1.5);
        assert_eq!(list.opacity(), 1.0);
    }

    #[test]
    fn test_model_restore() {
        let mut model = ModelState::new("A", 2);
        model.transform.scale = 0.3;
        model.transform.rotation_y = 2.0;
        model.set_opacity(0.1);
        model.restore(true);

        assert!(model.visible);
        assert_eq!(model.transform, ModelTransform::default());
        assert_eq!(model.opacity(), 1.0);
        assert_eq!(model.to_array(), [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
    }
}
