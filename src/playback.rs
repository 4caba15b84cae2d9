//! Speed and pitch snapping for playback engines
//!
//! Player controls hand arbitrary multipliers (from sliders, wheel input,
//! keyboard nudges) to a playback engine. [`RateSnapper`] clamps them into a
//! sane range and rounds them to a nearby simple ratio first, so that for
//! example a speed of `1.498` becomes exactly `3/2`.

use serde::{Deserialize, Serialize};

use crate::approximator::{approximate, validate_accuracy, DEFAULT_ACCURACY};
use crate::error::{RatioError, Result};
use crate::fraction::Fraction;

/// Slowest rate allowed by default (quarter speed).
pub const DEFAULT_MIN_RATE: f64 = 0.25;
/// Fastest rate allowed by default (4x).
pub const DEFAULT_MAX_RATE: f64 = 4.0;
/// Semitones per octave.
pub const SEMITONES_PER_OCTAVE: f64 = 12.0;

/// Snapping parameters, loadable from JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Maximum relative error of the snapped ratio.
    pub accuracy: f64,
    /// Lower clamp for multipliers.
    pub min_rate: f64,
    /// Upper clamp for multipliers.
    pub max_rate: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            accuracy: DEFAULT_ACCURACY,
            min_rate: DEFAULT_MIN_RATE,
            max_rate: DEFAULT_MAX_RATE,
        }
    }
}

impl SnapConfig {
    /// Parse a JSON document and validate it. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SnapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check accuracy and rate range.
    pub fn validate(&self) -> Result<()> {
        validate_accuracy(self.accuracy)?;
        if !(self.min_rate > 0.0 && self.min_rate.is_finite()) {
            return Err(RatioError::InvalidArgument {
                name: "min_rate",
                value: self.min_rate,
                expected: "a finite value greater than 0",
            });
        }
        if !(self.max_rate >= self.min_rate && self.max_rate.is_finite()) {
            return Err(RatioError::InvalidArgument {
                name: "max_rate",
                value: self.max_rate,
                expected: "a finite value not below min_rate",
            });
        }
        Ok(())
    }
}

/// A multiplier after clamping and snapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SnappedRate {
    /// Multiplier as requested by the caller.
    pub requested: f64,
    /// Snapped ratio.
    pub fraction: Fraction,
    /// Snapped ratio as a float, what the engine receives.
    pub value: f64,
    /// `value - requested`, including any clamping.
    pub error: f64,
}

/// Snapped speed and pitch pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackRate {
    /// Tempo multiplier.
    pub speed: SnappedRate,
    /// Pitch multiplier.
    pub pitch: SnappedRate,
}

/// Clamps and snaps speed/pitch multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RateSnapper {
    config: SnapConfig,
}

impl RateSnapper {
    /// Create a snapper from a validated config.
    pub fn new(config: SnapConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration.
    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    /// Snap a speed multiplier (1.0 = normal speed).
    pub fn snap_speed(&self, multiplier: f64) -> Result<SnappedRate> {
        self.snap("multiplier", multiplier)
    }

    /// Snap a pitch shift given in semitones (0 = unchanged, 12 = one octave up).
    pub fn snap_pitch_semitones(&self, semitones: f64) -> Result<SnappedRate> {
        if !semitones.is_finite() {
            return Err(RatioError::NonFiniteValue(semitones));
        }
        self.snap("pitch ratio", semitone_ratio(semitones))
    }

    /// Snap both speed and pitch.
    pub fn snap_playback(&self, speed: f64, pitch_semitones: f64) -> Result<PlaybackRate> {
        Ok(PlaybackRate {
            speed: self.snap_speed(speed)?,
            pitch: self.snap_pitch_semitones(pitch_semitones)?,
        })
    }

    fn snap(&self, name: &'static str, requested: f64) -> Result<SnappedRate> {
        if !(requested > 0.0 && requested.is_finite()) {
            return Err(RatioError::InvalidArgument {
                name,
                value: requested,
                expected: "a finite value greater than 0",
            });
        }

        let clamped = requested.clamp(self.config.min_rate, self.config.max_rate);
        if clamped != requested {
            tracing::warn!(
                requested,
                clamped,
                min = self.config.min_rate,
                max = self.config.max_rate,
                "rate outside allowed range, clamping"
            );
        }

        let fraction = approximate(clamped, self.config.accuracy)?;
        let value = fraction.to_f64();
        tracing::debug!(requested, %fraction, "snapped rate");
        Ok(SnappedRate {
            requested,
            fraction,
            value,
            error: value - requested,
        })
    }
}

/// Frequency ratio for a shift of `semitones` in equal temperament.
#[inline]
pub fn semitone_ratio(semitones: f64) -> f64 {
    2f64.powf(semitones / SEMITONES_PER_OCTAVE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_snap_speed() {
        let snapper = RateSnapper::default();
        let rate = snapper.snap_speed(1.498).unwrap();
        assert_eq!(rate.fraction.parts(), (3, 2));
        assert_abs_diff_eq!(rate.value, 1.5);
        assert_abs_diff_eq!(rate.error, 0.002, epsilon = 1e-12);
    }

    #[test]
    fn test_snap_speed_clamps() {
        let snapper = RateSnapper::default();
        assert_eq!(snapper.snap_speed(10.0).unwrap().fraction.parts(), (4, 1));
        assert_eq!(snapper.snap_speed(0.1).unwrap().fraction.parts(), (1, 4));
    }

    #[test]
    fn test_snap_speed_rejects_non_positive() {
        let snapper = RateSnapper::default();
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                snapper.snap_speed(bad),
                Err(RatioError::InvalidArgument { .. })
            ));
        }
    }

    #[test]
    fn test_pitch_semitones() {
        let snapper = RateSnapper::default();
        assert_eq!(snapper.snap_pitch_semitones(12.0).unwrap().fraction.parts(), (2, 1));
        assert_eq!(snapper.snap_pitch_semitones(-12.0).unwrap().fraction.parts(), (1, 2));
        assert_eq!(snapper.snap_pitch_semitones(0.0).unwrap().fraction, Fraction::ONE);
        // perfect fifth, 2^(7/12) = 1.4983
        assert_eq!(snapper.snap_pitch_semitones(7.0).unwrap().fraction.parts(), (3, 2));
        assert!(matches!(
            snapper.snap_pitch_semitones(f64::NAN),
            Err(RatioError::NonFiniteValue(_))
        ));
    }

    #[test]
    fn test_snap_playback() {
        let snapper = RateSnapper::default();
        let rate = snapper.snap_playback(0.749, 12.0).unwrap();
        assert_eq!(rate.speed.fraction.parts(), (3, 4));
        assert_eq!(rate.pitch.fraction.parts(), (2, 1));
    }

    #[test]
    fn test_config_from_json() {
        let config = SnapConfig::from_json_str(r#"{"accuracy": 0.01}"#).unwrap();
        assert_abs_diff_eq!(config.accuracy, 0.01);
        assert_abs_diff_eq!(config.min_rate, DEFAULT_MIN_RATE);
        assert_abs_diff_eq!(config.max_rate, DEFAULT_MAX_RATE);
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            SnapConfig::from_json_str(r#"{"accuracy": 1.5}"#),
            Err(RatioError::InvalidArgument { name: "accuracy", .. })
        ));
        assert!(matches!(
            SnapConfig::from_json_str(r#"{"min_rate": 2.0, "max_rate": 1.0}"#),
            Err(RatioError::InvalidArgument { name: "max_rate", .. })
        ));
        assert!(matches!(
            SnapConfig::from_json_str(r#"{"min_rate": 0.0}"#),
            Err(RatioError::InvalidArgument { name: "min_rate", .. })
        ));
        assert!(matches!(
            SnapConfig::from_json_str("not json"),
            Err(RatioError::Config(_))
        ));
    }
}
