use crate::libs::transform::TransformMode;
use thiserror::Error;

/// Leaf count up to which every pair is visited when a round is configured.
pub const DEFAULT_PRECOMPUTE_THRESHOLD: usize = 400;

/// Weight of the log-normalized component in `Log` mode.
pub const DEFAULT_TRANSFORM_STRENGTH: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Unknown transform mode: {0:?} (expected \"linear\" or \"log\")")]
    UnknownMode(String),
    #[error("Transform strength must be a finite number, got {0}")]
    NonFiniteStrength(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformConfig {
    pub mode: TransformMode,
    pub strength: f64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            mode: TransformMode::Linear,
            strength: DEFAULT_TRANSFORM_STRENGTH,
        }
    }
}

/// Tunables of the scoring engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Above this many leaves the all-pairs statistics pass is skipped
    pub precompute_threshold: usize,
    pub transform: TransformConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            precompute_threshold: DEFAULT_PRECOMPUTE_THRESHOLD,
            transform: TransformConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Apply optional overrides, validating them like the runtime setters do.
    pub fn with_overrides(
        mut self,
        threshold: Option<usize>,
        mode: Option<&str>,
        strength: Option<f64>,
    ) -> Result<Self, ConfigError> {
        if let Some(threshold) = threshold {
            self.precompute_threshold = threshold;
        }
        if let Some(mode) = mode {
            self.transform.mode = mode.parse()?;
        }
        if let Some(strength) = strength {
            self.transform.strength = validate_strength(strength)?;
        }
        Ok(self)
    }
}

/// Finite strengths are clamped into [0, 1].
pub fn validate_strength(strength: f64) -> Result<f64, ConfigError> {
    if strength.is_finite() {
        Ok(strength.clamp(0.0, 1.0))
    } else {
        Err(ConfigError::NonFiniteStrength(strength))
    }
}
