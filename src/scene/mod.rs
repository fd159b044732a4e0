//! Scene state shared between the sequencer and the render host
//!
//! The render host reads this every frame; only the active phase (or the
//! idle loop when nothing is running) writes to it.

mod model;
mod rig;

pub use model::{ModelState, ModelTransform, Surface, SurfaceList};
pub use rig::{default_lights, Camera, LightSpec, PointLight};

#[derive(Debug, Clone)]
pub struct SceneState {
    pub models: Vec<ModelState>,
    pub lights: Vec<PointLight>,
    pub camera: Camera,
    current: usize,
    light_defaults: Vec<PointLight>,
}

impl SceneState {
    pub fn new(light_defaults: Vec<PointLight>) -> Self {
        Self {
            models: Vec::new(),
            lights: light_defaults.clone(),
            camera: Camera::default(),
            current: 0,
            light_defaults,
        }
    }

    /// Add a loaded model; the first one becomes the visible current model
    pub fn add_model(&mut self, model: ModelState) -> usize {
        let index = self.models.len();
        self.models.push(model);
        self.models[index].restore(index == self.current);
        index
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Panics if no model is loaded; phases never run without one
    pub fn current_model(&self) -> &ModelState {
        &self.models[self.current]
    }

    pub fn current_model_mut(&mut self) -> &mut ModelState {
        let current = self.current;
        self.model_mut(current)
    }

    /// Panics on an unknown index: a phase addressing a missing model is a bug
    pub fn model_mut(&mut self, index: usize) -> &mut ModelState {
        let count = self.models.len();
        match self.models.get_mut(index) {
            Some(model) => model,
            None => panic!("model {} requested but only {} loaded", index, count),
        }
    }

    /// Hand "current model" over to `index`
    pub fn set_current(&mut self, index: usize) {
        assert!(index < self.models.len(), "cannot make unloaded model {} current", index);
        self.current = index;
    }

    pub fn visible_count(&self) -> usize {
        self.models.iter().filter(|m| m.visible).count()
    }

    /// Level 0 visible and opaque, everything else hidden, lights and camera at defaults
    pub fn reset(&mut self) {
        self.current = 0;
        for (i, model) in self.models.iter_mut().enumerate() {
            model.restore(i == 0);
        }
        self.lights.clone_from(&self.light_defaults);
        self.camera = Camera::default();
    }

    /// All lights flattened for the render host
    pub fn light_data(&self) -> Vec<f32> {
        self.lights.iter().flat_map(|l| l.to_array()).collect()
    }
}
