//! Application context
//!
//! Owns the scene, both particle fields, the sequencer and the status sink.
//! Everything mutates from `tick`, `start` or `reset`; the render host only reads.

use std::cell::RefCell;

use log::{debug, error, info};

use crate::assets::{load_models, AssetProvider, AssetSource, Clock, LoadReport, LoadedAsset};
use crate::config::EvolutionConfig;
use crate::error::AssetLoadError;
use crate::frame::{FrameClock, FrameTick};
use crate::particles::{AmbientField, AmbientParams, ParticleField, SwirlField};
use crate::scene::{ModelState, SceneState};
use crate::sequencer::{EvolutionSequencer, SequenceEvent, Stage, Transition};
use crate::status::{progress_message, Controls, StatusSink};

/// Idle turntable speed of the current model, radians per reference frame
pub const IDLE_SPIN: f32 = 0.005;

/// A level whose model made it into the scene
struct ChainLevel {
    /// Index into the configured levels
    level: usize,
    name: String,
    asset: LoadedAsset,
}

pub struct EvolutionApp<S: StatusSink> {
    config: EvolutionConfig,
    scene: SceneState,
    ambient: AmbientField,
    swirl: SwirlField,
    sequencer: EvolutionSequencer,
    frames: FrameClock,
    status: S,
    /// Loaded levels in chain order; index matches the scene's model index
    chain: Vec<ChainLevel>,
    loaded: bool,
}

impl<S: StatusSink> EvolutionApp<S> {
    /// Build an empty stage; models arrive through `load` or `attach_models`
    pub fn new(config: EvolutionConfig, status: S) -> Self {
        let particles = config.particles;
        let mut app = Self {
            scene: SceneState::new(config.build_lights()),
            ambient: AmbientField::new(particles.ambient, particles.seed),
            swirl: SwirlField::new(particles.swirl, particles.seed.wrapping_add(1)),
            sequencer: EvolutionSequencer::new(Vec::new(), config.durations),
            frames: FrameClock::new(),
            status,
            chain: Vec::new(),
            loaded: false,
            config,
        };
        app.status.set_status("Loading...");
        app.publish_controls();
        app
    }

    /// Fetch every level's model and attach whatever loaded.
    ///
    /// Fails only if the first level's model cannot be loaded.
    pub async fn load<Src: AssetSource, C: Clock>(
        &mut self,
        provider: &AssetProvider<Src, C>,
    ) -> Result<(), AssetLoadError> {
        let urls = self.config.asset_urls();
        let names: Vec<String> = self.config.levels.iter().map(|l| l.name.clone()).collect();

        let result = {
            let status = RefCell::new(&mut self.status);
            let names = &names;
            load_models(provider, &urls, &|index, progress| {
                let text = if progress.from_cache {
                    format!("Loaded {} from cache", names[index])
                } else {
                    progress_message(&names[index], progress.loaded, progress.total)
                };
                status.borrow_mut().set_status(&text);
            })
            .await
        };

        match result {
            Ok(report) => {
                self.attach_models(report);
                Ok(())
            }
            Err(e) => {
                error!("{}", e);
                self.status.set_status(&format!("Failed to load {}: {}", names[0], e));
                self.publish_controls();
                Err(e)
            }
        }
    }

    /// Put loaded models into the scene and build the transitions between them.
    ///
    /// Levels whose model failed are left out of the chain entirely.
    pub fn attach_models(&mut self, report: LoadReport) {
        self.scene = SceneState::new(self.config.build_lights());
        self.chain.clear();

        for (level, slot) in report.assets.into_iter().enumerate() {
            let Some(asset) = slot else {
                continue;
            };
            let name = self
                .config
                .levels
                .get(level)
                .map(|l| l.name.clone())
                .unwrap_or_else(|| format!("Level {}", level + 1));
            self.scene.add_model(ModelState::new(&name, asset.model.surfaces));
            self.chain.push(ChainLevel { level, name, asset });
        }

        let transitions = (1..self.chain.len())
            .map(|k| Transition {
                from: k - 1,
                to: k,
                phases: self.config.phases_into(self.chain[k].level),
            })
            .collect();
        self.sequencer = EvolutionSequencer::new(transitions, self.config.durations);
        self.loaded = !self.chain.is_empty();

        let message = if self.loaded && self.sequencer.transitions().is_empty() {
            format!("Loaded {}. There are no further forms to evolve into", self.chain[0].name)
        } else if report.failures.is_empty() {
            "Loaded! Press Evolve to begin".to_string()
        } else {
            let missing: Vec<&str> = report.failures.iter().map(|e| e.url()).collect();
            format!(
                "Loaded {} of {} forms ({} unavailable). Press Evolve to begin",
                self.chain.len(),
                self.chain.len() + report.failures.len(),
                missing.join(", ")
            )
        };
        info!("{} models attached, {} transitions", self.chain.len(), self.sequencer.transitions().len());
        self.status.set_status(&message);
        self.publish_controls();
    }

    /// Advance by one host frame
    pub fn tick(&mut self, timestamp_ms: f64) {
        let frame = self.frames.tick(timestamp_ms);
        self.step(frame);
    }

    /// Advance by an explicit frame tick
    pub fn step(&mut self, frame: FrameTick) {
        if !self.sequencer.is_busy() {
            self.ambient.advance(frame, &AmbientParams::IDLE);
            if self.loaded {
                self.scene.current_model_mut().transform.rotation_y += IDLE_SPIN * frame.steps();
            }
            return;
        }

        let events = {
            let mut stage = Stage {
                scene: &mut self.scene,
                ambient: &mut self.ambient,
                swirl: &mut self.swirl,
            };
            self.sequencer.tick(frame, &mut stage)
        };
        for event in events {
            self.report(event);
        }
    }

    /// Begin the evolution chain. Returns false when the request was ignored.
    pub fn start(&mut self) -> bool {
        if !self.loaded {
            debug!("start ignored: models not loaded");
            return false;
        }

        let result = {
            let mut stage = Stage {
                scene: &mut self.scene,
                ambient: &mut self.ambient,
                swirl: &mut self.swirl,
            };
            self.sequencer.start(&mut stage)
        };
        match result {
            Ok(event) => {
                self.report(event);
                self.publish_controls();
                true
            }
            Err(rejected) => {
                debug!("start rejected: {}", rejected);
                false
            }
        }
    }

    /// Return to the first level. Returns false when the request was ignored.
    pub fn reset(&mut self) -> bool {
        if !self.loaded {
            debug!("reset ignored: models not loaded");
            return false;
        }

        let result = {
            let mut stage = Stage {
                scene: &mut self.scene,
                ambient: &mut self.ambient,
                swirl: &mut self.swirl,
            };
            self.sequencer.reset(&mut stage)
        };
        match result {
            Ok(()) => {
                self.status.set_status("Reset! Press Evolve to begin");
                self.publish_controls();
                true
            }
            Err(rejected) => {
                debug!("reset rejected: {}", rejected);
                false
            }
        }
    }

    pub fn controls(&self) -> Controls {
        Controls {
            start_enabled: self.loaded && self.sequencer.can_start(),
            reset_enabled: self.loaded && !self.sequencer.is_busy() && self.sequencer.is_complete(),
            busy: self.sequencer.is_busy(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn ambient(&self) -> &AmbientField {
        &self.ambient
    }

    pub fn swirl(&self) -> &SwirlField {
        &self.swirl
    }

    pub fn sequencer(&self) -> &EvolutionSequencer {
        &self.sequencer
    }

    pub fn status(&self) -> &S {
        &self.status
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn model_count(&self) -> usize {
        self.chain.len()
    }

    pub fn model_name(&self, index: usize) -> Option<&str> {
        self.chain.get(index).map(|c| c.name.as_str())
    }

    /// GLB bytes of a loaded model, for the render host to parse once
    pub fn model_bytes(&self, index: usize) -> Option<&[u8]> {
        self.chain.get(index).map(|c| c.asset.model.bytes.as_slice())
    }

    fn report(&mut self, event: SequenceEvent) {
        match event {
            SequenceEvent::PhaseStarted { transition, phase } => {
                let Some(t) = self.sequencer.transitions().get(transition) else {
                    return;
                };
                let text = phase.status(&self.chain[t.from].name, &self.chain[t.to].name);
                self.status.set_status(&text);
            }
            SequenceEvent::Evolved { level } => {
                info!("evolved into {}", self.chain[level].name);
            }
            SequenceEvent::Finished => {
                let last = self.chain.last().map(|c| c.name.as_str()).unwrap_or_default();
                let text = format!("{} has reached its final form! Press Reset to start over", last);
                self.status.set_status(&text);
                self.publish_controls();
            }
        }
    }

    fn publish_controls(&mut self) {
        let controls = self.controls();
        self.status.set_controls(controls);
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::assets::{ManualClock, StubSource};
    use crate::config::{LevelSpec, ParticleConfig};
    use crate::frame::REFERENCE_FRAME_MS;
    use crate::scene::default_lights;
    use crate::sequencer::{PhaseDurations, PhaseKind};
    use crate::status::RecordingStatus;

    fn config(names: &[&str]) -> EvolutionConfig {
        EvolutionConfig {
            levels: names
                .iter()
                .map(|n| LevelSpec::new(n, &format!("{}.glb", n.to_lowercase())))
                .collect(),
            durations: PhaseDurations::uniform(100.0),
            particles: ParticleConfig { ambient: 40, swirl: 60, seed: 3 },
            lights: default_lights(),
        }
    }

    fn loaded_app(names: &[&str], missing: &[&str]) -> EvolutionApp<RecordingStatus> {
        let mut source = StubSource::new();
        for name in names {
            if !missing.contains(name) {
                source = source.with_model(&format!("{}.glb", name.to_lowercase()), 2);
            }
        }
        let provider = AssetProvider::with_clock(source, ManualClock::new(0));
        let mut app = EvolutionApp::new(config(names), RecordingStatus::new());
        block_on(app.load(&provider)).unwrap();
        app
    }

    fn run_to_idle(app: &mut EvolutionApp<RecordingStatus>) -> usize {
        let mut frames = 0;
        while app.sequencer().is_busy() {
            app.step(FrameTick::fixed(REFERENCE_FRAME_MS));
            frames += 1;
            assert!(frames < 10_000, "sequence never finished");
        }
        frames
    }

    #[test]
    fn test_starts_disabled_while_loading() {
        let app = EvolutionApp::new(config(&["A", "B"]), RecordingStatus::new());
        assert_eq!(app.status().last_message(), Some("Loading..."));
        assert!(!app.status().last_controls().start_enabled);
        assert!(!app.controls().reset_enabled);
    }

    #[test]
    fn test_start_before_load_ignored() {
        let mut app = EvolutionApp::new(config(&["A", "B"]), RecordingStatus::new());
        assert!(!app.start());
        assert!(!app.sequencer().is_busy());
    }

    #[test]
    fn test_load_reports_progress_and_enables_start() {
        let app = loaded_app(&["A", "B"], &[]);
        let status = app.status();
        assert!(status.count_containing("Loading A: 100%") >= 1);
        assert!(status.count_containing("Loading B: 100%") >= 1);
        assert_eq!(status.last_message(), Some("Loaded! Press Evolve to begin"));
        assert!(status.last_controls().start_enabled);
        assert!(!status.last_controls().reset_enabled);
        assert_eq!(app.model_count(), 2);
        assert_eq!(app.scene().models[0].surfaces.len(), 2);
    }

    #[test]
    fn test_end_to_end_single_evolution() {
        let mut app = loaded_app(&["A", "B"], &[]);
        assert!(app.start());
        assert!(!app.status().last_controls().start_enabled);
        assert_eq!(app.status().count_containing("A is gathering energy"), 1);

        run_to_idle(&mut app);

        let scene = app.scene();
        assert_eq!(scene.current_index(), 1);
        assert!(!scene.models[0].visible);
        assert!(scene.models[1].visible);
        assert_eq!(scene.models[1].opacity(), 1.0);
        assert_eq!(scene.models[1].transform.scale, 1.0);
        assert_eq!(scene.visible_count(), 1);
        assert!(app.sequencer().is_complete());
        assert_eq!(app.status().count_containing("final form"), 1);

        // Start stays disabled until reset
        let controls = app.status().last_controls();
        assert!(!controls.start_enabled);
        assert!(controls.reset_enabled);
        assert!(!app.start());

        assert!(app.reset());
        assert_eq!(app.scene().current_index(), 0);
        assert!(app.scene().models[0].visible);
        assert!(!app.scene().models[1].visible);
        let controls = app.status().last_controls();
        assert!(controls.start_enabled);
        assert!(!controls.reset_enabled);
        assert!(app.start());
    }

    #[test]
    fn test_controls_report_busy_during_transition() {
        let mut app = loaded_app(&["A", "B"], &[]);
        assert!(!app.status().last_controls().busy);

        app.start();
        assert!(app.status().last_controls().busy);

        run_to_idle(&mut app);
        assert!(!app.status().last_controls().busy);

        app.reset();
        assert!(!app.status().last_controls().busy);
    }

    #[test]
    fn test_stalled_host_frames_keep_wall_clock_timing() {
        // Each 500 ms frame finishes one 100 ms phase; five phases without the burst
        let mut app = loaded_app(&["A", "B"], &[]);
        app.start();
        for _ in 0..4 {
            app.step(FrameTick::fixed(500.0));
            assert!(app.sequencer().is_busy());
        }
        app.step(FrameTick::fixed(500.0));
        assert!(!app.sequencer().is_busy());
        assert_eq!(app.scene().current_index(), 1);
    }

    #[test]
    fn test_start_and_reset_ignored_while_busy() {
        let mut app = loaded_app(&["A", "B"], &[]);
        assert!(app.start());
        app.step(FrameTick::fixed(REFERENCE_FRAME_MS));

        let state = app.sequencer().state();
        assert!(!app.start());
        assert!(!app.reset());
        assert_eq!(app.sequencer().state(), state);
        assert_eq!(app.status().count_containing("gathering energy"), 1);
    }

    #[test]
    fn test_every_phase_reported_once() {
        let mut app = loaded_app(&["A", "B", "C"], &[]);
        app.start();
        run_to_idle(&mut app);

        let status = app.status();
        assert_eq!(status.count_containing("gathering energy"), 2);
        // First evolution skips the burst
        assert_eq!(status.count_containing("Energy burst"), 1);
        assert_eq!(status.count_containing("A new form appears: B"), 1);
        assert_eq!(status.count_containing("A new form appears: C"), 1);
        assert_eq!(app.scene().current_index(), 2);
    }

    #[test]
    fn test_partial_load_skips_missing_level() {
        let mut app = loaded_app(&["A", "B", "C", "D"], &["C"]);

        assert_eq!(app.model_count(), 3);
        assert_eq!(app.model_name(2), Some("D"));
        assert_eq!(app.sequencer().transitions().len(), 2);
        assert_eq!(app.status().count_containing("Loaded 3 of 4 forms"), 1);
        assert_eq!(app.status().count_containing("c.glb unavailable"), 1);
        assert!(app.status().last_controls().start_enabled);

        // B -> D uses D's phase list, which includes the burst
        let into_d = &app.sequencer().transitions()[1].phases;
        assert!(into_d.contains(&PhaseKind::Bursting));

        app.start();
        run_to_idle(&mut app);
        assert_eq!(app.scene().current_index(), 2);
        assert_eq!(app.status().count_containing("final form"), 1);
    }

    #[test]
    fn test_primary_failure_is_fatal() {
        let provider = AssetProvider::with_clock(StubSource::new().with_model("b.glb", 1), ManualClock::new(0));
        let mut app = EvolutionApp::new(config(&["A", "B"]), RecordingStatus::new());

        let result = block_on(app.load(&provider));
        assert!(result.is_err());
        assert!(!app.is_loaded());
        assert!(app.status().last_message().unwrap_or_default().starts_with("Failed to load A"));
        assert!(!app.status().last_controls().start_enabled);
        assert!(!app.start());
    }

    #[test]
    fn test_single_level_cannot_start() {
        let mut app = loaded_app(&["A"], &[]);
        assert!(app.is_loaded());
        assert!(app.status().last_message().unwrap_or_default().contains("no further forms"));
        assert!(!app.controls().start_enabled);
        assert!(!app.start());
    }

    #[test]
    fn test_idle_frames_spin_model_and_drift_particles() {
        let mut app = loaded_app(&["A", "B"], &[]);
        let before = app.ambient().buffer().positions().to_vec();

        for _ in 0..10 {
            app.step(FrameTick::fixed(REFERENCE_FRAME_MS));
        }

        let rotation = app.scene().current_model().transform.rotation_y;
        assert!((rotation - 10.0 * IDLE_SPIN).abs() < 1e-4);
        assert_ne!(app.ambient().buffer().positions(), before.as_slice());
    }

    #[test]
    fn test_host_timestamps_drive_frames() {
        let mut app = loaded_app(&["A", "B"], &[]);
        app.tick(1000.0);
        assert_eq!(app.scene().current_model().transform.rotation_y, 0.0);
        app.tick(1000.0 + f64::from(REFERENCE_FRAME_MS));
        assert!(app.scene().current_model().transform.rotation_y > 0.0);
    }
}
