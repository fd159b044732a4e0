//! Choreography of the individual evolution phases
//!
//! Each phase writes absolute values derived from its eased progress where
//! the motion is a one-way transition (camera moves, fades, scale-ups) and
//! accumulates per reference frame where the motion is a continuous spin.

use std::f32::consts::PI;

use serde::Deserialize;

use crate::animation::{Easing, PhaseFrame};
use crate::math::{Color, Vec3};
use crate::particles::{AmbientField, AmbientParams, ParticleField, SwirlField, SwirlParams};
use crate::scene::SceneState;

use super::Transition;

/// Scale the incoming model starts at when it replaces the old one
pub const EMERGE_SCALE: f32 = 0.3;
/// Height the collapsing data stream converges on
pub const STREAM_FOCUS_HEIGHT: f32 = 1.0;
const STREAM_PEAK_OPACITY: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Gathering,
    Streaming,
    Bursting,
    Transforming,
    Appearing,
    Showcasing,
}

impl PhaseKind {
    pub const ALL: [PhaseKind; 6] = [
        PhaseKind::Gathering,
        PhaseKind::Streaming,
        PhaseKind::Bursting,
        PhaseKind::Transforming,
        PhaseKind::Appearing,
        PhaseKind::Showcasing,
    ];

    pub fn easing(self) -> Easing {
        match self {
            PhaseKind::Gathering | PhaseKind::Streaming | PhaseKind::Transforming => {
                Easing::EaseInOutQuad
            }
            PhaseKind::Appearing => Easing::EaseOutCubic,
            PhaseKind::Bursting | PhaseKind::Showcasing => Easing::Linear,
        }
    }

    /// Runs on the incoming form, after the swap
    pub fn acts_on_incoming(self) -> bool {
        matches!(self, PhaseKind::Appearing | PhaseKind::Showcasing)
    }

    pub fn name(self) -> &'static str {
        match self {
            PhaseKind::Gathering => "gathering",
            PhaseKind::Streaming => "streaming",
            PhaseKind::Bursting => "bursting",
            PhaseKind::Transforming => "transforming",
            PhaseKind::Appearing => "appearing",
            PhaseKind::Showcasing => "showcasing",
        }
    }

    /// Status line shown when the phase starts
    pub fn status(self, from: &str, to: &str) -> String {
        match self {
            PhaseKind::Gathering => format!("⚡ Evolution begins! {} is gathering energy...", from),
            PhaseKind::Streaming => format!("💫 Data stream online! {} → {}", from, to),
            PhaseKind::Bursting => format!("🔥 Energy burst! {} → {}", from, to),
            PhaseKind::Transforming => format!("✨ Reconfiguring form! {} → {}", from, to),
            PhaseKind::Appearing => format!("🌟 A new form appears: {}!", to),
            PhaseKind::Showcasing => format!("🎉 Evolution complete: {}!", to),
        }
    }
}

/// Phase lengths in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhaseDurations {
    pub gathering: f32,
    pub streaming: f32,
    pub bursting: f32,
    pub transforming: f32,
    pub appearing: f32,
    pub showcasing: f32,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            gathering: 2500.0,
            streaming: 3000.0,
            bursting: 2000.0,
            transforming: 1500.0,
            appearing: 2500.0,
            showcasing: 2000.0,
        }
    }
}

impl PhaseDurations {
    pub fn get(&self, kind: PhaseKind) -> f32 {
        match kind {
            PhaseKind::Gathering => self.gathering,
            PhaseKind::Streaming => self.streaming,
            PhaseKind::Bursting => self.bursting,
            PhaseKind::Transforming => self.transforming,
            PhaseKind::Appearing => self.appearing,
            PhaseKind::Showcasing => self.showcasing,
        }
    }

    /// Same duration for every phase
    pub fn uniform(ms: f32) -> Self {
        Self {
            gathering: ms,
            streaming: ms,
            bursting: ms,
            transforming: ms,
            appearing: ms,
            showcasing: ms,
        }
    }
}

/// Everything a phase is allowed to mutate
pub struct Stage<'a> {
    pub scene: &'a mut SceneState,
    pub ambient: &'a mut AmbientField,
    pub swirl: &'a mut SwirlField,
}

/// Values captured when a phase begins
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseSnapshot {
    pub rotation_y: f32,
    pub opacity: f32,
}

impl PhaseKind {
    pub(crate) fn begin(self, transition: &Transition, stage: &mut Stage<'_>) -> PhaseSnapshot {
        let model = if self.acts_on_incoming() {
            stage.scene.model_mut(transition.to)
        } else {
            stage.scene.model_mut(transition.from)
        };
        PhaseSnapshot {
            rotation_y: model.transform.rotation_y,
            opacity: model.opacity(),
        }
    }

    pub(crate) fn update(
        self,
        frame: PhaseFrame,
        snapshot: &PhaseSnapshot,
        transition: &Transition,
        stage: &mut Stage<'_>,
    ) {
        match self {
            PhaseKind::Gathering => gathering(frame, snapshot, transition, stage),
            PhaseKind::Streaming => streaming(frame, transition, stage),
            PhaseKind::Bursting => bursting(frame, transition, stage),
            PhaseKind::Transforming => transforming(frame, transition, stage),
            PhaseKind::Appearing => appearing(frame, snapshot, transition, stage),
            PhaseKind::Showcasing => showcasing(frame, transition, stage),
        }
    }

    /// Write the exact end state once the final frame has been applied
    pub(crate) fn complete(self, transition: &Transition, stage: &mut Stage<'_>) {
        match self {
            PhaseKind::Bursting => {
                stage.scene.model_mut(transition.from).transform.scale = 1.0;
            }
            PhaseKind::Transforming => {
                let scene = &mut *stage.scene;
                let from = scene.model_mut(transition.from);
                from.visible = false;
                from.surfaces.restore();

                let to = scene.model_mut(transition.to);
                to.visible = true;
                to.set_opacity(1.0);
                scene.set_current(transition.to);

                stage.swirl.respawn();
                stage.swirl.set_opacity(0.0);
            }
            PhaseKind::Appearing => {
                let to = stage.scene.model_mut(transition.to);
                to.transform.scale = 1.0;
                to.surfaces.restore();
            }
            PhaseKind::Showcasing => {
                stage.swirl.set_opacity(0.0);
            }
            PhaseKind::Gathering | PhaseKind::Streaming => {}
        }
    }
}

fn gathering(frame: PhaseFrame, snapshot: &PhaseSnapshot, t: &Transition, stage: &mut Stage<'_>) {
    let e = frame.eased;

    stage.scene.model_mut(t.from).transform.rotation_y = snapshot.rotation_y + e * PI * 0.5;

    for (i, light) in stage.scene.lights.iter_mut().enumerate() {
        light.intensity = 1.0 + e * 2.0;
        let angle = e * PI * 1.5 + i as f32 * PI;
        light.orbit(angle, 2.5, 2.0 + (e * PI * 2.0).sin() * 0.5);
    }

    stage.ambient.advance(frame.tick, &AmbientParams::gathering(e));

    let camera = &mut stage.scene.camera;
    camera.position.z = 8.0 - e * 1.5;
    camera.position.y = 2.0 + (e * PI).sin() * 0.3;
}

fn streaming(frame: PhaseFrame, t: &Transition, stage: &mut Stage<'_>) {
    let e = frame.eased;

    stage.swirl.set_opacity(e * STREAM_PEAK_OPACITY);
    stage.swirl.advance(frame.tick, &SwirlParams {
        spin: 1.0 + e * 2.0,
        radius_scale: 1.0 - e * 0.3,
        rise: 2.0,
        ..SwirlParams::AT_REST
    });
    stage.swirl.rotate(0.01 * frame.steps());

    stage.scene.model_mut(t.from).transform.rotation_y += 0.02 * frame.steps();
    for light in &mut stage.scene.lights {
        light.intensity = 3.0 + e * 3.0;
    }

    let camera = &mut stage.scene.camera;
    camera.position.z = 6.5 - e * 2.0;
    camera.look_at(Vec3::new(0.0, 1.0 + e * 0.5, 0.0));
}

fn bursting(frame: PhaseFrame, t: &Transition, stage: &mut Stage<'_>) {
    let p = frame.raw;

    let flash = 6.0 + (p * PI * 8.0).sin() * 3.0;
    for light in &mut stage.scene.lights {
        light.intensity = flash;
        light.color = Color::from_hsl(0.1 + p * 0.3, 1.0, 0.5);
    }

    stage.swirl.advance(frame.tick, &SwirlParams {
        spin: 5.0,
        radius_scale: 0.7 - p * 0.4,
        rise: 5.0,
        ..SwirlParams::AT_REST
    });

    let model = stage.scene.model_mut(t.from);
    model.transform.scale = 1.0 + (p * PI * 4.0).sin() * 0.3;
    model.transform.rotation_y += 0.05 * frame.steps();

    let camera = &mut stage.scene.camera;
    camera.position.x = (p * PI * 10.0).sin() * 0.1;
    camera.position.y = 2.3 + (p * PI * 8.0).sin() * 0.1;
    camera.position.z = 4.5 - p;
}

fn transforming(frame: PhaseFrame, t: &Transition, stage: &mut Stage<'_>) {
    let e = frame.eased;

    // Cross-fade: the outgoing and incoming forms have complementary opacity
    stage.scene.model_mut(t.from).set_opacity(1.0 - e);
    let to = stage.scene.model_mut(t.to);
    if !to.visible {
        to.visible = true;
        to.transform.scale = EMERGE_SCALE;
        to.transform.rotation_y = 0.0;
    }
    to.set_opacity(e);

    stage.swirl.advance(frame.tick, &SwirlParams {
        radius_scale: 1.0 - e,
        collapse: e,
        focus_height: STREAM_FOCUS_HEIGHT,
        ..SwirlParams::AT_REST
    });
    stage.swirl.set_opacity(STREAM_PEAK_OPACITY * (1.0 - e));

    for light in &mut stage.scene.lights {
        light.intensity = 9.0 * (1.0 - e * 0.7);
    }
}

fn appearing(frame: PhaseFrame, snapshot: &PhaseSnapshot, t: &Transition, stage: &mut Stage<'_>) {
    let e = frame.eased;

    let model = stage.scene.model_mut(t.to);
    model.transform.scale = EMERGE_SCALE + e * (1.0 - EMERGE_SCALE);
    model.set_opacity(snapshot.opacity + (1.0 - snapshot.opacity) * e);
    model.transform.rotation_y = e * PI * 1.5;

    for (i, light) in stage.scene.lights.iter_mut().enumerate() {
        light.intensity = 2.0 + e * 4.0;
        light.color = Color::from_hsl(0.4 + i as f32 * 0.1, 1.0, 0.5);
        let angle = e * PI * 2.0 + i as f32 * PI;
        light.orbit(angle, 3.0, 3.0 + (e * PI).sin());
    }

    let camera = &mut stage.scene.camera;
    camera.position.z = 3.5 + e * 3.0;
    camera.position.y = 2.3 + e * 0.5;
    camera.look_at(Vec3::new(0.0, 1.5, 0.0));
}

fn showcasing(frame: PhaseFrame, t: &Transition, stage: &mut Stage<'_>) {
    let p = frame.raw;

    stage.scene.model_mut(t.to).transform.rotation_y += 0.02 * frame.steps();

    for (i, light) in stage.scene.lights.iter_mut().enumerate() {
        light.intensity = 6.0 + (p * PI * 2.0).sin();
        let angle = p * PI * 0.5 + i as f32 * PI;
        let height = light.position.y;
        light.orbit(angle, 3.0, height);
    }

    let angle = p * PI * 0.5;
    let camera = &mut stage.scene.camera;
    camera.position.x = angle.sin();
    camera.position.z = 6.5 + angle.cos() * 0.5;
    camera.look_at(Vec3::new(0.0, 1.5, 0.0));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::PhaseAnimator;
    use crate::frame::{FrameTick, REFERENCE_FRAME_MS};
    use crate::sequencer::tests::Rig;

    fn close(actual: f32, expected: f32) -> bool {
        (actual - expected).abs() < 1e-3
    }

    fn assert_vec(actual: Vec3, x: f32, y: f32, z: f32) {
        assert!(
            close(actual.x, x) && close(actual.y, y) && close(actual.z, z),
            "expected ({}, {}, {}), got {:?}",
            x,
            y,
            z,
            actual
        );
    }

    fn assert_color(actual: Color, expected: Color) {
        assert!(
            close(actual.r, expected.r) && close(actual.g, expected.g) && close(actual.b, expected.b),
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    fn assert_intensity(rig: &Rig, expected: f32) {
        for light in &rig.scene.lights {
            assert!(close(light.intensity, expected), "intensity {}", light.intensity);
        }
    }

    /// Play one phase of an A -> B transition from begin to completion
    fn play(kind: PhaseKind, rig: &mut Rig) {
        let transition = Transition { from: 0, to: 1, phases: PhaseKind::ALL.to_vec() };
        let snapshot = kind.begin(&transition, &mut rig.stage());
        let mut animator = PhaseAnimator::new(100.0, kind.easing());
        loop {
            let frame = animator.step(FrameTick::fixed(REFERENCE_FRAME_MS));
            kind.update(frame, &snapshot, &transition, &mut rig.stage());
            if frame.finished {
                break;
            }
        }
        kind.complete(&transition, &mut rig.stage());
    }

    #[test]
    fn test_gathering_end_state() {
        let mut rig = Rig::new(&["A", "B"]);
        play(PhaseKind::Gathering, &mut rig);

        assert!(close(rig.scene.models[0].transform.rotation_y, PI * 0.5));
        assert_intensity(&rig, 3.0);
        assert_vec(rig.scene.lights[0].position, 0.0, 2.0, -2.5);
        assert_vec(rig.scene.lights[1].position, 0.0, 2.0, 2.5);
        assert!(close(rig.scene.camera.position.z, 6.5));
        assert!(close(rig.scene.camera.position.y, 2.0));
    }

    #[test]
    fn test_streaming_end_state() {
        let mut rig = Rig::new(&["A", "B"]);
        play(PhaseKind::Streaming, &mut rig);

        assert!(close(rig.swirl.opacity(), STREAM_PEAK_OPACITY));
        assert_intensity(&rig, 6.0);
        assert!(close(rig.scene.camera.position.z, 4.5));
        assert_vec(rig.scene.camera.target, 0.0, 1.5, 0.0);
    }

    #[test]
    fn test_bursting_end_state() {
        let mut rig = Rig::new(&["A", "B"]);
        play(PhaseKind::Bursting, &mut rig);

        assert_intensity(&rig, 6.0);
        let burst = Color::from_hsl(0.4, 1.0, 0.5);
        for light in &rig.scene.lights {
            assert_color(light.color, burst);
        }
        assert_eq!(rig.scene.models[0].transform.scale, 1.0);
        assert_vec(rig.scene.camera.position, 0.0, 2.3, 3.5);
    }

    #[test]
    fn test_transforming_end_state() {
        let mut rig = Rig::new(&["A", "B"]);
        play(PhaseKind::Transforming, &mut rig);

        assert_intensity(&rig, 2.7);
        assert_eq!(rig.swirl.opacity(), 0.0);
        assert!(!rig.scene.models[0].visible);
        assert!(rig.scene.models[1].visible);
        assert_eq!(rig.scene.models[1].opacity(), 1.0);
        assert_eq!(rig.scene.models[1].transform.scale, EMERGE_SCALE);
        assert_eq!(rig.scene.current_index(), 1);
    }

    #[test]
    fn test_appearing_end_state() {
        let mut rig = Rig::new(&["A", "B"]);
        play(PhaseKind::Transforming, &mut rig);
        play(PhaseKind::Appearing, &mut rig);

        let b = &rig.scene.models[1];
        assert_eq!(b.transform.scale, 1.0);
        assert_eq!(b.opacity(), 1.0);
        assert!(close(b.transform.rotation_y, PI * 1.5));

        assert_intensity(&rig, 6.0);
        assert_color(rig.scene.lights[0].color, Color::from_hsl(0.4, 1.0, 0.5));
        assert_color(rig.scene.lights[1].color, Color::from_hsl(0.5, 1.0, 0.5));
        assert_vec(rig.scene.lights[0].position, 3.0, 3.0, 0.0);
        assert_vec(rig.scene.lights[1].position, -3.0, 3.0, 0.0);

        assert!(close(rig.scene.camera.position.z, 6.5));
        assert!(close(rig.scene.camera.position.y, 2.8));
        assert_vec(rig.scene.camera.target, 0.0, 1.5, 0.0);
    }

    #[test]
    fn test_showcasing_end_state() {
        let mut rig = Rig::new(&["A", "B"]);
        play(PhaseKind::Transforming, &mut rig);
        play(PhaseKind::Showcasing, &mut rig);

        assert_intensity(&rig, 6.0);
        assert_vec(rig.scene.lights[0].position, 0.0, 3.0, 3.0);
        assert_vec(rig.scene.lights[1].position, 0.0, 3.0, -3.0);
        assert!(close(rig.scene.camera.position.x, 1.0));
        assert!(close(rig.scene.camera.position.z, 6.5));
        assert_vec(rig.scene.camera.target, 0.0, 1.5, 0.0);
        assert_eq!(rig.swirl.opacity(), 0.0);
    }

    #[test]
    fn test_incoming_phases() {
        assert!(PhaseKind::Appearing.acts_on_incoming());
        assert!(PhaseKind::Showcasing.acts_on_incoming());
        assert!(!PhaseKind::Bursting.acts_on_incoming());
        assert!(!PhaseKind::Transforming.acts_on_incoming());
    }

    #[test]
    fn test_easing_assignment() {
        assert_eq!(PhaseKind::Gathering.easing(), Easing::EaseInOutQuad);
        assert_eq!(PhaseKind::Appearing.easing(), Easing::EaseOutCubic);
        assert_eq!(PhaseKind::Bursting.easing(), Easing::Linear);
    }

    #[test]
    fn test_default_durations() {
        let d = PhaseDurations::default();
        assert_eq!(d.get(PhaseKind::Gathering), 2500.0);
        assert_eq!(d.get(PhaseKind::Transforming), 1500.0);
        assert_eq!(PhaseDurations::uniform(10.0).get(PhaseKind::Showcasing), 10.0);
    }

    #[test]
    fn test_status_mentions_forms() {
        let s = PhaseKind::Streaming.status("A", "B");
        assert!(s.contains("A → B"));
        assert!(PhaseKind::Appearing.status("A", "B").contains('B'));
    }
}
