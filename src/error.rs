//! Error types for rational approximation.

use thiserror::Error;

/// Result type for ratio-snap operations.
pub type Result<T> = std::result::Result<T, RatioError>;

/// Errors that can occur when approximating, parsing or snapping ratios.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RatioError {
    /// A parameter was outside its allowed range.
    #[error("Invalid argument '{name}': got {value}, expected {expected}")]
    InvalidArgument {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
        /// Allowed range, human readable.
        expected: &'static str,
    },

    /// The value to approximate was NaN or infinite.
    #[error("Cannot approximate non-finite value {0}")]
    NonFiniteValue(f64),

    /// The result does not fit into 64-bit integers.
    #[error("Approximation of {value} overflows 64-bit numerator/denominator")]
    Overflow {
        /// Value being approximated.
        value: f64,
    },

    /// The continued-fraction expansion did not reach the requested accuracy.
    #[error("Approximation of {value} did not converge within {iterations} iterations")]
    NotConverged {
        /// Value being approximated.
        value: f64,
        /// Iterations performed before giving up.
        iterations: usize,
    },

    /// A fraction had a zero denominator.
    #[error("Denominator must not be zero")]
    ZeroDenominator,

    /// Fraction text could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Snap configuration could not be read.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for RatioError {
    fn from(err: serde_json::Error) -> Self {
        RatioError::Config(err.to_string())
    }
}
