//! Best rational approximation by continued-fraction expansion
//!
//! Given a real value and a maximum relative error, [`approximate`] finds the
//! fraction with the smallest denominator the expansion reaches that is within
//! that error (Richards' algorithm). A zero value uses the accuracy as an
//! absolute bound instead, otherwise the tolerance would collapse to zero.
//!
//! Typical use is snapping a speed or pitch multiplier such as `0.749` to a
//! clean ratio (`3/4`) before handing it to a playback engine.

use num_traits::ToPrimitive;

use crate::error::{RatioError, Result};
use crate::fraction::Fraction;

/// Default maximum relative error (0.5%).
pub const DEFAULT_ACCURACY: f64 = 0.005;

/// Upper bound on continued-fraction terms.
///
/// Accuracies down to about `1e-15` converge in far fewer terms. Tighter
/// bounds ask for more precision than an `f64` carries, so the expansion
/// keeps producing noise terms until it reaches this cap.
pub const MAX_ITERATIONS: usize = 40;

/// Approximation together with its signed rounding error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rounded {
    /// Chosen fraction.
    pub fraction: Fraction,
    /// `fraction` as a float.
    pub value: f64,
    /// `value - original`.
    pub error: f64,
}

/// Check that `accuracy` lies in the open interval (0, 1).
pub fn validate_accuracy(accuracy: f64) -> Result<()> {
    // negated so NaN is rejected as well
    if !(accuracy > 0.0 && accuracy < 1.0) {
        return Err(RatioError::InvalidArgument {
            name: "accuracy",
            value: accuracy,
            expected: "a value in the open interval (0, 1)",
        });
    }
    Ok(())
}

/// Approximate `value` by the simplest fraction within `accuracy`.
///
/// `accuracy` is the maximum error relative to `|value|`, or an absolute
/// bound when `value` is zero. The numerator carries the sign of `value` and
/// the denominator is always at least 1.
///
/// # Errors
/// - [`RatioError::InvalidArgument`] if `accuracy` is not in (0, 1)
/// - [`RatioError::NonFiniteValue`] for NaN or infinite `value`
/// - [`RatioError::Overflow`] if the integer part, the first term or the
///   result does not fit in `i64`
/// - [`RatioError::NotConverged`] if [`MAX_ITERATIONS`] terms were not enough,
///   or a later term overflowed because `z` lost all precision
///
/// # Example
/// ```
/// use ratio_snap::approximate;
/// let f = approximate(-0.75, 0.01).unwrap();
/// assert_eq!(f.parts(), (-3, 4));
/// ```
pub fn approximate(value: f64, accuracy: f64) -> Result<Fraction> {
    validate_accuracy(accuracy)?;
    if !value.is_finite() {
        return Err(RatioError::NonFiniteValue(value));
    }

    let overflow = || RatioError::Overflow { value };

    let sign: i64 = if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    };
    let magnitude = value.abs();
    let max_error = if sign == 0 {
        accuracy
    } else {
        magnitude * accuracy
    };

    let whole = magnitude.floor();
    let n = whole.to_i64().ok_or_else(overflow)?;
    let frac = magnitude - whole;

    if frac < max_error {
        return finish(value, sign * n, 1, 0);
    }
    if 1.0 - max_error < frac {
        let up = n.checked_add(1).ok_or_else(overflow)?;
        return finish(value, sign * up, 1, 0);
    }

    let mut z = frac;
    let mut previous_denominator: i64 = 0;
    let mut denominator: i64 = 1;
    let mut numerator: i64;
    let mut iterations = 0;

    loop {
        if iterations == MAX_ITERATIONS {
            return Err(RatioError::NotConverged { value, iterations });
        }
        iterations += 1;

        z = 1.0 / (z - z.floor());
        let term = z
            .floor()
            .to_i64()
            .ok_or_else(|| term_overflow(value, iterations))?;
        let next = denominator
            .checked_mul(term)
            .and_then(|d| d.checked_add(previous_denominator))
            .ok_or_else(|| term_overflow(value, iterations))?;
        previous_denominator = denominator;
        denominator = next;
        // f64::round is half away from zero
        numerator = (frac * denominator as f64)
            .round()
            .to_i64()
            .ok_or_else(overflow)?;

        let error = (frac - numerator as f64 / denominator as f64).abs();
        if error <= max_error || z == z.floor() {
            break;
        }
    }

    let total = n
        .checked_mul(denominator)
        .and_then(|whole_part| whole_part.checked_add(numerator))
        .ok_or_else(overflow)?;
    finish(value, sign * total, denominator, iterations)
}

/// A huge first term means `value` itself is too small for `i64` fractions.
/// Past that, a huge term is rounding noise from an exhausted expansion.
fn term_overflow(value: f64, iterations: usize) -> RatioError {
    if iterations > 1 {
        RatioError::NotConverged { value, iterations }
    } else {
        RatioError::Overflow { value }
    }
}

fn finish(value: f64, numerator: i64, denominator: i64, iterations: usize) -> Result<Fraction> {
    let fraction = Fraction::new(numerator, denominator)?;
    tracing::trace!(value, %fraction, iterations, "approximated");
    Ok(fraction)
}

/// [`approximate`] with [`DEFAULT_ACCURACY`].
pub fn approximate_default(value: f64) -> Result<Fraction> {
    approximate(value, DEFAULT_ACCURACY)
}

/// Round `value` to the float value of its best fraction.
pub fn round_to_fraction(value: f64, accuracy: f64) -> Result<f64> {
    approximate(value, accuracy).map(Fraction::to_f64)
}

/// Like [`round_to_fraction`], also reporting the signed rounding error
/// (`approximation - value`).
pub fn round_to_fraction_with_error(value: f64, accuracy: f64) -> Result<Rounded> {
    let fraction = approximate(value, accuracy)?;
    let rounded = fraction.to_f64();
    Ok(Rounded {
        fraction,
        value: rounded,
        error: rounded - value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn parts(value: f64, accuracy: f64) -> (i64, i64) {
        approximate(value, accuracy).unwrap().parts()
    }

    #[test]
    fn test_simple_fractions() {
        assert_eq!(parts(0.5, 0.005), (1, 2));
        assert_eq!(parts(0.333333, 0.005), (1, 3));
        assert_eq!(parts(1.0, 0.005), (1, 1));
        assert_eq!(parts(0.0, 0.005), (0, 1));
        assert_eq!(parts(-0.75, 0.01), (-3, 4));
    }

    #[test]
    fn test_mixed_numbers() {
        assert_eq!(parts(1.75, 0.005), (7, 4));
        assert_eq!(parts(2.5, 0.005), (5, 2));
        assert_eq!(parts(-2.5, 0.005), (-5, 2));
    }

    #[test]
    fn test_pi_convergents() {
        assert_eq!(parts(std::f64::consts::PI, 0.001), (22, 7));
        assert_eq!(parts(std::f64::consts::PI, 1e-6), (355, 113));
    }

    #[test]
    fn test_early_exit_rounds_down() {
        // frac 0.001 < 3.001 * 0.005
        assert_eq!(parts(3.001, 0.005), (3, 1));
    }

    #[test]
    fn test_early_exit_rounds_up() {
        assert_eq!(parts(0.9, 0.2), (1, 1));
        assert_eq!(parts(-4.999, 0.005), (-5, 1));
    }

    #[test]
    fn test_zero_uses_absolute_bound() {
        assert_eq!(parts(0.0, 0.9), (0, 1));
        assert_eq!(parts(-0.0, 0.005), (0, 1));
    }

    #[test]
    fn test_invalid_accuracy() {
        for accuracy in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            match approximate(0.5, accuracy) {
                Err(RatioError::InvalidArgument { name, .. }) => assert_eq!(name, "accuracy"),
                other => panic!("accuracy {accuracy} gave {other:?}"),
            }
        }
    }

    #[test]
    fn test_invalid_accuracy_message() {
        let err = approximate(0.5, 1.5).unwrap_err().to_string();
        assert!(err.contains("accuracy"));
        assert!(err.contains("(0, 1)"));
    }

    #[test]
    fn test_non_finite_value() {
        assert!(matches!(
            approximate(f64::NAN, 0.005),
            Err(RatioError::NonFiniteValue(_))
        ));
        assert!(matches!(
            approximate(f64::INFINITY, 0.005),
            Err(RatioError::NonFiniteValue(_))
        ));
        assert!(matches!(
            approximate(f64::NEG_INFINITY, 0.005),
            Err(RatioError::NonFiniteValue(_))
        ));
    }

    #[test]
    fn test_overflow() {
        assert!(matches!(
            approximate(1e-300, 0.005),
            Err(RatioError::Overflow { .. })
        ));
        assert!(matches!(
            approximate(1e300, 0.005),
            Err(RatioError::Overflow { .. })
        ));
    }

    #[test]
    fn test_accuracy_below_precision_does_not_converge() {
        assert_eq!(
            approximate(-0.35992445738083223, 1e-16),
            Err(RatioError::NotConverged {
                value: -0.35992445738083223,
                iterations: MAX_ITERATIONS,
            })
        );
    }

    #[test]
    fn test_noise_term_reported_as_not_converged() {
        assert!(matches!(
            approximate(0.4446126580457621, 1e-16),
            Err(RatioError::NotConverged { .. })
        ));
    }

    #[test]
    fn test_round_to_fraction() {
        assert_abs_diff_eq!(round_to_fraction(0.9, 0.2).unwrap(), 1.0);
        assert_abs_diff_eq!(round_to_fraction(0.333333, 0.005).unwrap(), 1.0 / 3.0);
    }

    #[test]
    fn test_round_to_fraction_with_error() {
        let rounded = round_to_fraction_with_error(0.9, 0.2).unwrap();
        assert_eq!(rounded.fraction, Fraction::ONE);
        assert_abs_diff_eq!(rounded.value, 1.0);
        assert_abs_diff_eq!(rounded.error, 0.1, epsilon = 1e-12);

        let rounded = round_to_fraction_with_error(-0.76, 0.02).unwrap();
        assert_eq!(rounded.fraction.parts(), (-3, 4));
        assert_abs_diff_eq!(rounded.error, 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_default_accuracy() {
        assert_eq!(approximate_default(0.6667).unwrap().parts(), (2, 3));
    }
}
