/*!
    Rational number type for time bases and frame rates.
*/

use std::fmt;

use serde::Serialize;

use crate::{Error, Result};

/**
    A rational number represented as a numerator and denominator.

    Used for time bases (e.g., 1/90000 for MPEG-TS) and frame rates
    (e.g., 24000/1001 for 23.976 fps).

    Values read from native streams are built with the public fields and may
    be zero (unset); use [`Rational::is_valid`] before relying on them.
*/
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    /**
        Create a new rational number.

        # Panics

        Panics if `den` is zero.
    */
    #[inline]
    pub const fn new(num: i32, den: i32) -> Self {
        assert!(den != 0, "denominator cannot be zero");
        Self { num, den }
    }

    /**
        Returns true if both numerator and denominator are non-zero,
        which is required for a time base to take part in rescaling.
    */
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.num != 0 && self.den != 0
    }

    /**
        Convert to f64.
    */
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /**
        Invert the rational (swap numerator and denominator).

        # Panics

        Panics if numerator is zero.
    */
    #[inline]
    pub const fn invert(self) -> Self {
        assert!(self.num != 0, "cannot invert zero");
        Self {
            num: self.den,
            den: self.num,
        }
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl From<(i32, i32)> for Rational {
    fn from((num, den): (i32, i32)) -> Self {
        Self::new(num, den)
    }
}

impl From<i32> for Rational {
    fn from(num: i32) -> Self {
        Self::new(num, 1)
    }
}

/**
    Rescale `value` from time base `from` to time base `to`.

    Equal time bases return `value` unchanged. Otherwise computes
    `value * from.num * to.den / (from.den * to.num)` exactly in 128-bit
    arithmetic, rounds half away from zero and saturates to the
    representable range; a converted value is never `i64::MIN`, which
    FFmpeg reserves for "no timestamp".

    Returns [`Error::InvalidTimeBase`] if either time base has a zero
    numerator or denominator.
*/
pub fn rescale(value: i64, from: Rational, to: Rational) -> Result<i64> {
    if !from.is_valid() || !to.is_valid() {
        return Err(Error::InvalidTimeBase { from, to });
    }
    if from == to {
        return Ok(value);
    }

    let mut num = value as i128 * from.num as i128 * to.den as i128;
    let mut den = from.den as i128 * to.num as i128;
    if den < 0 {
        num = -num;
        den = -den;
    }

    let quotient = num / den;
    let remainder = num % den;
    let rounded = if 2 * remainder.abs() >= den {
        quotient + num.signum()
    } else {
        quotient
    };

    Ok(rounded.clamp(i64::MIN as i128 + 1, i64::MAX as i128) as i64)
}
