//! Evolution chain configuration
//!
//! The chain is data: which forms exist, where their models live, and which
//! phases play when evolving into each of them.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::scene::{default_lights, LightSpec, PointLight};
use crate::sequencer::{PhaseDurations, PhaseKind};

/// YAML input format for an evolution chain
#[derive(Debug, Clone, Deserialize)]
pub struct EvolutionConfig {
    pub levels: Vec<LevelSpec>,
    #[serde(default)]
    pub durations: PhaseDurations,
    #[serde(default)]
    pub particles: ParticleConfig,
    #[serde(default = "default_lights")]
    pub lights: Vec<LightSpec>,
}

/// One creature form
#[derive(Debug, Clone, Deserialize)]
pub struct LevelSpec {
    pub name: String,
    pub asset: String,
    /// Phases played when evolving into this level. Ignored for the first level.
    #[serde(default)]
    pub phases: Option<Vec<PhaseKind>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub ambient: usize,
    pub swirl: usize,
    pub seed: u64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            ambient: 1000,
            swirl: 2000,
            seed: 7,
        }
    }
}

impl LevelSpec {
    pub fn new(name: &str, asset: &str) -> Self {
        Self {
            name: name.to_string(),
            asset: asset.to_string(),
            phases: None,
        }
    }
}

impl Default for EvolutionConfig {
    /// Four forms; the first evolution skips the energy burst
    fn default() -> Self {
        Self {
            levels: vec![
                LevelSpec::new("Agumon", "./public/agumon.glb"),
                LevelSpec::new("Greymon", "./public/greymon.glb"),
                LevelSpec::new("MetalGreymon", "./public/metalgreymon.glb"),
                LevelSpec::new("WarGreymon", "./public/wargreymon.glb"),
            ],
            durations: PhaseDurations::default(),
            particles: ParticleConfig::default(),
            lights: default_lights(),
        }
    }
}

impl EvolutionConfig {
    /// Parse and validate from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: EvolutionConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }

        for phase in PhaseKind::ALL {
            let ms = self.durations.get(phase);
            if !ms.is_finite() || ms < 0.0 {
                return Err(ConfigError::InvalidDuration { phase });
            }
        }

        for level in self.levels.iter().skip(1) {
            let Some(phases) = &level.phases else {
                continue;
            };
            let mut seen = HashSet::new();
            for phase in phases {
                if !seen.insert(*phase) {
                    return Err(ConfigError::DuplicatePhase {
                        level: level.name.clone(),
                        phase: *phase,
                    });
                }
            }
            check_order(&level.name, phases)?;
        }
        Ok(())
    }

    /// Phases played when evolving into level `index` (`index >= 1`)
    pub fn phases_into(&self, index: usize) -> Vec<PhaseKind> {
        if let Some(phases) = self.levels.get(index).and_then(|l| l.phases.clone()) {
            return phases;
        }
        if index <= 1 {
            PhaseKind::ALL
                .iter()
                .copied()
                .filter(|p| *p != PhaseKind::Bursting)
                .collect()
        } else {
            PhaseKind::ALL.to_vec()
        }
    }

    pub fn asset_urls(&self) -> Vec<String> {
        self.levels.iter().map(|l| l.asset.clone()).collect()
    }

    pub fn build_lights(&self) -> Vec<PointLight> {
        self.lights.iter().map(LightSpec::build).collect()
    }
}

/// Outgoing-form phases precede the swap, incoming-form phases follow it,
/// and the incoming form must grow to full size before the chain moves on
fn check_order(level: &str, phases: &[PhaseKind]) -> Result<(), ConfigError> {
    let Some(swap) = phases.iter().position(|p| *p == PhaseKind::Transforming) else {
        return Err(ConfigError::MissingTransform { level: level.to_string() });
    };
    for (i, phase) in phases.iter().enumerate() {
        if i != swap && phase.acts_on_incoming() != (i > swap) {
            return Err(ConfigError::MisplacedPhase {
                level: level.to_string(),
                phase: *phase,
            });
        }
    }
    if !phases[swap..].contains(&PhaseKind::Appearing) {
        return Err(ConfigError::MissingAppear { level: level.to_string() });
    }
    Ok(())
}
