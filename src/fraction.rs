//! Integer fraction type produced by the approximator
//!
//! A [`Fraction`] is a plain numerator/denominator pair with the invariant
//! `denominator >= 1`. The sign always lives on the numerator. Fractions are
//! not reduced automatically, so `2/4` and `1/2` compare unequal with `==`;
//! use [`Fraction::same_value`] to compare by value.

use std::fmt;
use std::str::FromStr;

use nom::{
    branch::alt,
    character::complete::{char, digit1, multispace0},
    combinator::{all_consuming, map_res, opt, recognize},
    sequence::{delimited, pair, preceded},
    IResult,
};
use serde::{Deserialize, Serialize};

use crate::error::{RatioError, Result};

/// Signed fraction with a positive denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawFraction")]
pub struct Fraction {
    numerator: i64,
    denominator: i64,
}

#[derive(Deserialize)]
struct RawFraction {
    numerator: i64,
    denominator: i64,
}

impl TryFrom<RawFraction> for Fraction {
    type Error = RatioError;

    fn try_from(raw: RawFraction) -> Result<Self> {
        Fraction::new(raw.numerator, raw.denominator)
    }
}

impl Fraction {
    /// Zero (`0/1`).
    pub const ZERO: Fraction = Fraction {
        numerator: 0,
        denominator: 1,
    };

    /// One (`1/1`).
    pub const ONE: Fraction = Fraction {
        numerator: 1,
        denominator: 1,
    };

    /// Create a fraction, moving a negative denominator's sign onto the numerator.
    ///
    /// Fails with [`RatioError::ZeroDenominator`] for a zero denominator and
    /// with [`RatioError::Overflow`] when the sign flip does not fit in `i64`.
    pub fn new(numerator: i64, denominator: i64) -> Result<Self> {
        if denominator == 0 {
            return Err(RatioError::ZeroDenominator);
        }
        if denominator > 0 {
            return Ok(Self {
                numerator,
                denominator,
            });
        }
        let overflow = || RatioError::Overflow {
            value: numerator as f64 / denominator as f64,
        };
        Ok(Self {
            numerator: numerator.checked_neg().ok_or_else(overflow)?,
            denominator: denominator.checked_neg().ok_or_else(overflow)?,
        })
    }

    /// Whole number `value/1`.
    #[inline]
    pub const fn from_integer(value: i64) -> Self {
        Self {
            numerator: value,
            denominator: 1,
        }
    }

    /// Numerator (carries the sign).
    #[inline]
    pub fn numerator(self) -> i64 {
        self.numerator
    }

    /// Denominator, always `>= 1`.
    #[inline]
    pub fn denominator(self) -> i64 {
        self.denominator
    }

    /// Numerator and denominator as a tuple.
    #[inline]
    pub fn parts(self) -> (i64, i64) {
        (self.numerator, self.denominator)
    }

    /// Floating-point value of the fraction.
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// True when the denominator divides the numerator.
    #[inline]
    pub fn is_integer(self) -> bool {
        self.numerator % self.denominator == 0
    }

    /// Lowest-terms form of this fraction.
    pub fn reduced(self) -> Self {
        let divisor = gcd(self.numerator.unsigned_abs(), self.denominator.unsigned_abs());
        if divisor <= 1 {
            return self;
        }
        // divisor divides both parts, so it fits back into i64
        let divisor = divisor as i64;
        Self {
            numerator: self.numerator / divisor,
            denominator: self.denominator / divisor,
        }
    }

    /// Compare by value rather than by representation.
    pub fn same_value(self, other: Fraction) -> bool {
        self.numerator as i128 * other.denominator as i128
            == other.numerator as i128 * self.denominator as i128
    }

    /// Reciprocal; fails for zero.
    pub fn recip(self) -> Result<Self> {
        Self::new(self.denominator, self.numerator)
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

impl Default for Fraction {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i64> for Fraction {
    #[inline]
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl From<Fraction> for f64 {
    #[inline]
    fn from(value: Fraction) -> Self {
        value.to_f64()
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

fn signed_integer(input: &str) -> IResult<&str, i64> {
    map_res(
        recognize(pair(opt(alt((char('-'), char('+')))), digit1)),
        str::parse::<i64>,
    )(input)
}

fn unsigned_integer(input: &str) -> IResult<&str, i64> {
    map_res(digit1, str::parse::<i64>)(input)
}

fn fraction_literal(input: &str) -> IResult<&str, (i64, Option<i64>)> {
    pair(
        signed_integer,
        opt(preceded(
            delimited(multispace0, char('/'), multispace0),
            unsigned_integer,
        )),
    )(input)
}

impl FromStr for Fraction {
    type Err = RatioError;

    /// Parse `p`, `p/q` or `-p / q`.
    fn from_str(s: &str) -> Result<Self> {
        let (_, (numerator, denominator)) =
            all_consuming(delimited(multispace0, fraction_literal, multispace0))(s)
                .map_err(|e| RatioError::Parse(format!("'{s}': {e}")))?;
        Fraction::new(numerator, denominator.unwrap_or(1))
    }
}
