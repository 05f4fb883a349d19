//! Exact fractions and small integer helpers.
//!
//! Every tableau entry and every optimum is a [`Fraction`]: an arbitrary
//! precision rational kept in lowest terms with a positive denominator.

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

/// Exact rational number used throughout the solver.
pub type Fraction = BigRational;

/// Build the fraction `num / den`.
///
/// Panics if `den` is zero.
pub fn frac(num: i64, den: i64) -> Fraction {
    assert!(den != 0, "fraction with zero denominator");
    Fraction::new(BigInt::from(num), BigInt::from(den))
}

/// Lift a slice of machine integers into arbitrary precision.
pub fn int_vec(values: &[i64]) -> Vec<BigInt> {
    values.iter().map(|&v| BigInt::from(v)).collect()
}

/// Largest integer not above `value`.
pub fn floor(value: &Fraction) -> BigInt {
    value.numer().div_floor(value.denom())
}

/// Smallest integer not below `value`.
pub fn ceil(value: &Fraction) -> BigInt {
    -((-value.numer()).div_floor(value.denom()))
}

/// Fractional part `value - floor(value)`, always in `[0, 1)`.
pub fn fract(value: &Fraction) -> Fraction {
    value - Fraction::from_integer(floor(value))
}

/// Convert an integral fraction to an integer.
pub fn to_integer(value: &Fraction) -> Option<BigInt> {
    if value.is_integer() {
        Some(value.numer().clone())
    } else {
        None
    }
}

/// Sum of the negative entries of `values`.
pub fn negative_sum(values: &[BigInt]) -> BigInt {
    values
        .iter()
        .filter(|v| v.is_negative())
        .fold(BigInt::zero(), |acc, v| acc + v)
}
