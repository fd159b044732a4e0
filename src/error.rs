//! Error types
//!
//! Asset errors are caught at the load boundary and turned into status text;
//! nothing here ever reaches the sequencer or the frame loop.

use thiserror::Error;

use crate::sequencer::PhaseKind;

/// Fetching or decoding a model failed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssetLoadError {
    #[error("network error loading {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("HTTP {status} loading {url}")]
    Http { url: String, status: u16 },

    #[error("invalid model data in {url}: {reason}")]
    Parse { url: String, reason: String },
}

impl AssetLoadError {
    pub fn url(&self) -> &str {
        match self {
            AssetLoadError::Network { url, .. }
            | AssetLoadError::Http { url, .. }
            | AssetLoadError::Parse { url, .. } => url,
        }
    }
}

/// The local asset cache could not be used; loading continues network-only
#[derive(Debug, Clone, PartialEq, Error)]
#[error("asset cache unavailable: {0}")]
pub struct CacheUnavailable(pub String);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("at least one level is required")]
    NoLevels,

    #[error("level '{level}' has no transforming phase")]
    MissingTransform { level: String },

    #[error("level '{level}' has no appearing phase after transforming")]
    MissingAppear { level: String },

    #[error("level '{level}' runs phase '{}' on the wrong side of transforming", .phase.name())]
    MisplacedPhase { level: String, phase: PhaseKind },

    #[error("level '{level}' lists phase '{}' more than once", .phase.name())]
    DuplicatePhase { level: String, phase: PhaseKind },

    #[error("duration for '{}' must be a finite, non-negative number of milliseconds", .phase.name())]
    InvalidDuration { phase: PhaseKind },
}
