//! Evolution sequencer
//!
//! Runs the phase list of every transition in the chain strictly in order,
//! one phase at a time. The busy flag makes `start` and `reset` no-ops while
//! a run is in flight.

mod phases;

pub use phases::{PhaseDurations, PhaseKind, PhaseSnapshot, Stage, EMERGE_SCALE, STREAM_FOCUS_HEIGHT};

use log::{debug, info};
use thiserror::Error;

use crate::animation::PhaseAnimator;
use crate::frame::FrameTick;

/// One step of the chain: evolve model `from` into model `to`
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: usize,
    pub to: usize,
    pub phases: Vec<PhaseKind>,
}

/// Where the sequencer is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Running { transition: usize, phase: PhaseKind },
}

/// Why a start or reset request was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("an evolution is already running")]
    Busy,
    #[error("the evolution chain has already completed; reset first")]
    ChainComplete,
    #[error("there is nothing to evolve into")]
    NoTransitions,
}

/// Something the host may want to report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceEvent {
    PhaseStarted { transition: usize, phase: PhaseKind },
    /// The model swap of a transition happened; `level` is the new current model
    Evolved { level: usize },
    Finished,
}

struct ActivePhase {
    transition: usize,
    index: usize,
    kind: PhaseKind,
    animator: PhaseAnimator,
    snapshot: PhaseSnapshot,
}

pub struct EvolutionSequencer {
    transitions: Vec<Transition>,
    durations: PhaseDurations,
    active: Option<ActivePhase>,
    complete: bool,
}

impl EvolutionSequencer {
    pub fn new(transitions: Vec<Transition>, durations: PhaseDurations) -> Self {
        Self {
            transitions,
            durations,
            active: None,
            complete: false,
        }
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn set_transitions(&mut self, transitions: Vec<Transition>) {
        self.transitions = transitions;
    }

    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn can_start(&self) -> bool {
        !self.is_busy() && !self.complete && !self.transitions.is_empty()
    }

    pub fn state(&self) -> SequencerState {
        match &self.active {
            Some(active) => SequencerState::Running {
                transition: active.transition,
                phase: active.kind,
            },
            None => SequencerState::Idle,
        }
    }

    /// Begin the first phase of the chain
    pub fn start(&mut self, stage: &mut Stage<'_>) -> Result<SequenceEvent, Rejected> {
        if self.is_busy() {
            debug!("start ignored: sequence already running");
            return Err(Rejected::Busy);
        }
        if self.complete {
            debug!("start ignored: chain already complete");
            return Err(Rejected::ChainComplete);
        }
        if self.transitions.is_empty() {
            debug!("start ignored: no transitions available");
            return Err(Rejected::NoTransitions);
        }

        info!("evolution started ({} transitions)", self.transitions.len());
        Ok(self.begin(0, 0, stage))
    }

    /// Advance the active phase by one frame
    pub fn tick(&mut self, tick: FrameTick, stage: &mut Stage<'_>) -> Vec<SequenceEvent> {
        let mut events = Vec::new();
        let Some(active) = self.active.as_mut() else {
            return events;
        };

        let frame = active.animator.step(tick);
        let transition = &self.transitions[active.transition];
        active.kind.update(frame, &active.snapshot, transition, stage);

        if !frame.finished {
            return events;
        }

        active.kind.complete(transition, stage);
        debug!("phase {} finished", active.kind.name());
        if active.kind == PhaseKind::Transforming {
            events.push(SequenceEvent::Evolved { level: transition.to });
        }

        let (t, i) = (active.transition, active.index);
        if i + 1 < transition.phases.len() {
            events.push(self.begin(t, i + 1, stage));
        } else if t + 1 < self.transitions.len() {
            events.push(self.begin(t + 1, 0, stage));
        } else {
            self.active = None;
            self.complete = true;
            info!("evolution finished");
            events.push(SequenceEvent::Finished);
        }
        events
    }

    /// Return the chain to its first level; rejected while busy
    pub fn reset(&mut self, stage: &mut Stage<'_>) -> Result<(), Rejected> {
        if self.is_busy() {
            debug!("reset ignored: sequence already running");
            return Err(Rejected::Busy);
        }

        stage.scene.reset();
        stage.ambient.scatter();
        stage.swirl.reset();
        self.complete = false;
        info!("evolution reset");
        Ok(())
    }

    fn begin(&mut self, transition: usize, index: usize, stage: &mut Stage<'_>) -> SequenceEvent {
        let t = &self.transitions[transition];
        let kind = t.phases[index];
        let snapshot = kind.begin(t, stage);
        debug!("phase {} started (transition {} -> {})", kind.name(), t.from, t.to);

        self.active = Some(ActivePhase {
            transition,
            index,
            kind,
            animator: PhaseAnimator::new(self.durations.get(kind), kind.easing()),
            snapshot,
        });
        SequenceEvent::PhaseStarted { transition, phase: kind }
    }
}
