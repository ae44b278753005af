//! Effective distance.
//!
//! Raw patristic distances on real trees are dominated by a few deep splits,
//! so most pairs end up bunched near the minimum. `Log` mode blends in a
//! log-normalized position to spread the short end out. Both modes map the
//! anchors onto themselves, so an effective distance stays inside the raw
//! `[min, max]` range.

use crate::libs::config::{self, ConfigError, TransformConfig};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransformMode {
    #[default]
    Linear,
    Log,
}

impl FromStr for TransformMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(TransformMode::Linear),
            "log" => Ok(TransformMode::Log),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for TransformMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformMode::Linear => write!(f, "linear"),
            TransformMode::Log => write!(f, "log"),
        }
    }
}

/// Range the transform maps into.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Anchors {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceTransform {
    mode: TransformMode,
    strength: f64,
}

impl Default for DistanceTransform {
    fn default() -> Self {
        Self::new(&TransformConfig::default())
    }
}

impl DistanceTransform {
    pub fn new(config: &TransformConfig) -> Self {
        Self {
            mode: config.mode,
            strength: config.strength.clamp(0.0, 1.0),
        }
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Returns whether the mode changed.
    pub fn set_mode(&mut self, mode: TransformMode) -> bool {
        let changed = self.mode != mode;
        self.mode = mode;
        changed
    }

    /// Returns whether the stored strength changed.
    pub fn set_strength(&mut self, strength: f64) -> Result<bool, ConfigError> {
        let strength = config::validate_strength(strength)?;
        let changed = self.strength != strength;
        self.strength = strength;
        Ok(changed)
    }

    /// Map a raw distance to its effective distance.
    ///
    /// ```
    /// use phylodist::libs::transform::{Anchors, DistanceTransform};
    ///
    /// let linear = DistanceTransform::default();
    /// let anchors = Anchors { min: 2.0, max: 12.0 };
    /// assert_eq!(linear.apply(7.0, &anchors), 7.0);
    /// assert_eq!(linear.apply(0.0, &anchors), 0.0);
    /// ```
    pub fn apply(&self, raw: f64, anchors: &Anchors) -> f64 {
        if !raw.is_finite() || raw <= 0.0 {
            return raw;
        }
        let Anchors { min, max } = *anchors;
        if min.is_nan() || max.is_nan() || max <= min {
            return raw;
        }

        let span = max - min;
        let norm_linear = ((raw - min) / span).clamp(0.0, 1.0);

        let norm = match self.mode {
            TransformMode::Linear => norm_linear,
            TransformMode::Log => {
                let log_min = min.max(0.0).ln_1p();
                let log_span = max.ln_1p() - log_min;
                let norm_log = if log_span > 0.0 {
                    ((raw.ln_1p() - log_min) / log_span).clamp(0.0, 1.0)
                } else {
                    norm_linear
                };
                (1.0 - self.strength) * norm_linear + self.strength * norm_log
            }
        };

        min + norm * span
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn log_transform(strength: f64) -> DistanceTransform {
        DistanceTransform::new(&TransformConfig {
            mode: TransformMode::Log,
            strength,
        })
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("linear".parse::<TransformMode>(), Ok(TransformMode::Linear));
        assert_eq!(" Log ".parse::<TransformMode>(), Ok(TransformMode::Log));
        assert!("sqrt".parse::<TransformMode>().is_err());
        assert_eq!(TransformMode::Log.to_string(), "log");
    }

    #[test]
    fn test_passthrough() {
        let anchors = Anchors { min: 2.0, max: 12.0 };
        let t = log_transform(0.6);

        assert_eq!(t.apply(0.0, &anchors), 0.0);
        assert_eq!(t.apply(-1.0, &anchors), -1.0);
        assert!(t.apply(f64::NAN, &anchors).is_nan());
        assert_eq!(t.apply(f64::INFINITY, &anchors), f64::INFINITY);

        // no usable range
        let flat = Anchors { min: 5.0, max: 5.0 };
        assert_eq!(t.apply(3.0, &flat), 3.0);
        assert_eq!(t.apply(3.0, &Anchors::default()), 3.0);
    }

    #[test]
    fn test_anchors_are_fixed_points() {
        let anchors = Anchors { min: 2.0, max: 12.0 };
        for t in [DistanceTransform::default(), log_transform(0.6), log_transform(1.0)] {
            assert_relative_eq!(t.apply(2.0, &anchors), 2.0);
            assert_relative_eq!(t.apply(12.0, &anchors), 12.0);
            // out of range values are clamped onto the anchors
            assert_relative_eq!(t.apply(1.0, &anchors), 2.0);
            assert_relative_eq!(t.apply(20.0, &anchors), 12.0);
        }
    }

    #[test]
    fn test_log_blend() {
        let anchors = Anchors { min: 2.0, max: 12.0 };
        let raw = 10.0;

        let lin = (raw - 2.0) / 10.0;
        let log = (11f64.ln() - 3f64.ln()) / (13f64.ln() - 3f64.ln());
        let expected = 2.0 + (0.4 * lin + 0.6 * log) * 10.0;

        assert_relative_eq!(log_transform(0.6).apply(raw, &anchors), expected, epsilon = 1e-12);
        assert!(log_transform(0.6).apply(raw, &anchors) > raw);

        // zero strength degenerates to linear
        assert_relative_eq!(log_transform(0.0).apply(raw, &anchors), raw, epsilon = 1e-12);
    }

    #[test]
    fn test_monotone() {
        let anchors = Anchors { min: 0.5, max: 40.0 };
        let t = log_transform(0.6);
        let mut prev = 0.0;
        for i in 1..=100 {
            let v = t.apply(i as f64 * 0.4, &anchors);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn test_setters() {
        let mut t = DistanceTransform::default();
        assert!(t.set_mode(TransformMode::Log));
        assert!(!t.set_mode(TransformMode::Log));

        assert_eq!(t.set_strength(0.6), Ok(false));
        assert_eq!(t.set_strength(2.0), Ok(true));
        assert_eq!(t.strength(), 1.0);
        assert!(t.set_strength(f64::NAN).is_err());
        assert_eq!(t.strength(), 1.0);
    }
}
