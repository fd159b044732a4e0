use wasm_bindgen::prelude::*;

pub mod animation;
pub mod app;
pub mod assets;
pub mod config;
pub mod error;
pub mod frame;
pub mod math;
pub mod particles;
pub mod scene;
pub mod sequencer;
pub mod status;
pub mod web;

pub use app::EvolutionApp;
pub use config::EvolutionConfig;
pub use error::{AssetLoadError, CacheUnavailable, ConfigError};
pub use sequencer::{EvolutionSequencer, PhaseKind};

use assets::{AssetProvider, MemoryCache};
use log::{debug, info};
use particles::ParticleField;
use web::{DomIds, DomStatus, FetchAssetSource, LocalStorageCache};

const CACHE_PREFIX: &str = "creature-evolution:";

/// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
}

/// Demo state exposed to JavaScript.
///
/// The page's render loop calls `tick` once per animation frame and then
/// reads particle buffers, model transforms, lights and camera to draw.
#[wasm_bindgen]
pub struct EvolutionDemo {
    app: EvolutionApp<DomStatus>,
}

/// Load the chain described by `config_yaml` (the built-in chain when absent)
/// and return a demo ready to start.
///
/// Status goes to `#status`; `#evolveBtn` and `#resetBtn` are enabled and
/// shown as the state allows, and `#evolution-overlay` is marked `active`
/// while a transition runs.
#[wasm_bindgen]
pub async fn load_demo(config_yaml: Option<String>) -> Result<EvolutionDemo, JsValue> {
    let config = match config_yaml {
        Some(yaml) => EvolutionConfig::from_yaml(&yaml).map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => EvolutionConfig::default(),
    };

    let provider = AssetProvider::new(FetchAssetSource);
    let provider = match LocalStorageCache::open(CACHE_PREFIX) {
        Ok(cache) => provider.with_cache(Box::new(cache)),
        Err(e) => {
            debug!("{}; caching in memory only", e);
            provider.with_cache(Box::new(MemoryCache::new()))
        }
    };

    let status = DomStatus::from_document(DomIds {
        status: "status",
        start: "evolveBtn",
        reset: "resetBtn",
        overlay: "evolution-overlay",
    });
    let mut app = EvolutionApp::new(config, status);
    app.load(&provider)
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    info!("demo ready with {} forms", app.model_count());
    Ok(EvolutionDemo { app })
}

#[wasm_bindgen]
impl EvolutionDemo {
    /// Advance one animation frame (`requestAnimationFrame` timestamp)
    #[wasm_bindgen]
    pub fn tick(&mut self, timestamp_ms: f64) {
        self.app.tick(timestamp_ms);
    }

    /// Evolve button; ignored while busy or after the chain completes
    #[wasm_bindgen]
    pub fn start(&mut self) -> bool {
        self.app.start()
    }

    /// Reset button; ignored while busy
    #[wasm_bindgen]
    pub fn reset(&mut self) -> bool {
        self.app.reset()
    }

    #[wasm_bindgen]
    pub fn is_busy(&self) -> bool {
        self.app.sequencer().is_busy()
    }

    #[wasm_bindgen]
    pub fn current_level(&self) -> usize {
        self.app.scene().current_index()
    }

    #[wasm_bindgen]
    pub fn model_count(&self) -> usize {
        self.app.model_count()
    }

    #[wasm_bindgen]
    pub fn model_name(&self, index: usize) -> Option<String> {
        self.app.model_name(index).map(str::to_string)
    }

    /// GLB bytes for the render host to parse once
    #[wasm_bindgen]
    pub fn model_bytes(&self, index: usize) -> Option<Vec<u8>> {
        self.app.model_bytes(index).map(<[u8]>::to_vec)
    }

    /// Surface count the model was loaded with
    #[wasm_bindgen]
    pub fn model_surfaces(&self, index: usize) -> usize {
        self.app.scene().models.get(index).map(|m| m.surfaces.len()).unwrap_or(0)
    }

    /// `[x, y, z, rotation_y, scale, opacity, visible]`; empty for unknown models
    #[wasm_bindgen]
    pub fn model_transform(&self, index: usize) -> Vec<f32> {
        self.app
            .scene()
            .models
            .get(index)
            .map(|m| m.to_array().to_vec())
            .unwrap_or_default()
    }

    /// `[x, y, z, intensity, r, g, b]` per light
    #[wasm_bindgen]
    pub fn light_state(&self) -> Vec<f32> {
        self.app.scene().light_data()
    }

    /// `[px, py, pz, tx, ty, tz]`
    #[wasm_bindgen]
    pub fn camera_state(&self) -> Vec<f32> {
        self.app.scene().camera.to_array().to_vec()
    }

    #[wasm_bindgen]
    pub fn ambient_positions(&self) -> Vec<f32> {
        self.app.ambient().buffer().positions().to_vec()
    }

    #[wasm_bindgen]
    pub fn ambient_colors(&self) -> Vec<f32> {
        self.app.ambient().buffer().colors().to_vec()
    }

    #[wasm_bindgen]
    pub fn ambient_opacity(&self) -> f32 {
        self.app.ambient().opacity()
    }

    #[wasm_bindgen]
    pub fn swirl_positions(&self) -> Vec<f32> {
        self.app.swirl().buffer().positions().to_vec()
    }

    #[wasm_bindgen]
    pub fn swirl_colors(&self) -> Vec<f32> {
        self.app.swirl().buffer().colors().to_vec()
    }

    #[wasm_bindgen]
    pub fn swirl_opacity(&self) -> f32 {
        self.app.swirl().opacity()
    }

    #[wasm_bindgen]
    pub fn swirl_rotation(&self) -> f32 {
        self.app.swirl().rotation_y()
    }
}
