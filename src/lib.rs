//! Best rational approximation of real-valued ratios
//!
//! Rounds floating-point ratios, typically playback speed and pitch
//! multipliers, to the nearby fraction with the smallest denominator that
//! stays within a relative error bound. The search is a continued-fraction
//! expansion (Richards' algorithm).
//!
//! # Crate feature flags
//! - `cli` (default): the `ratio-snap` command-line tool (clap, tracing-subscriber, anyhow)
//!
//! # Quick start
//! ```
//! use ratio_snap::{approximate, round_to_fraction_with_error};
//!
//! let third = approximate(0.333333, 0.005).unwrap();
//! assert_eq!(third.parts(), (1, 3));
//!
//! let rounded = round_to_fraction_with_error(0.9, 0.2).unwrap();
//! assert_eq!(rounded.value, 1.0);
//! ```
//!
//! ## Snapping playback rates
//! ```
//! use ratio_snap::RateSnapper;
//!
//! let snapper = RateSnapper::default();
//! let speed = snapper.snap_speed(1.498).unwrap();
//! assert_eq!(speed.fraction.to_string(), "3/2");
//! ```

#![warn(missing_docs)]

pub mod approximator;
pub mod error;
pub mod fraction;
pub mod playback; // Speed/pitch snapping

pub use approximator::{
    approximate, approximate_default, round_to_fraction, round_to_fraction_with_error,
    validate_accuracy, Rounded, DEFAULT_ACCURACY, MAX_ITERATIONS,
};
pub use error::{RatioError, Result};
pub use fraction::Fraction;
pub use playback::{semitone_ratio, PlaybackRate, RateSnapper, SnapConfig, SnappedRate};
