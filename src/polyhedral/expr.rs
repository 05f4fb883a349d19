//! Affine expressions over the variables of a space.
//!
//! An affine expression is a linear combination of variables plus a constant:
//! `aff(x) = c0 + c1*x1 + c2*x2 + ... + cn*xn`
//!
//! Symbols are ordinary variables here; the [`Space`](super::Space) of the
//! owning system records which positions are symbols.

use crate::utils::matrix::vector_gcd;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// An affine expression: constant + sum(coeffs[i] * var[i])
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AffineExpr {
    /// Coefficient of each variable (index = variable index)
    pub coeffs: Vec<BigInt>,
    /// Constant term
    pub constant: BigInt,
}

impl AffineExpr {
    /// Create a zero expression.
    pub fn zero(n_vars: usize) -> Self {
        Self {
            coeffs: vec![BigInt::zero(); n_vars],
            constant: BigInt::zero(),
        }
    }

    /// Create a constant expression.
    pub fn constant(value: impl Into<BigInt>, n_vars: usize) -> Self {
        Self {
            constant: value.into(),
            ..Self::zero(n_vars)
        }
    }

    /// Create an expression for a single variable.
    pub fn var(index: usize, n_vars: usize) -> Self {
        assert!(index < n_vars, "variable index out of range");
        let mut expr = Self::zero(n_vars);
        expr.coeffs[index] = BigInt::one();
        expr
    }

    /// Build an expression from a constraint row (coefficients, then constant).
    pub fn from_row(row: &[BigInt]) -> Self {
        assert!(!row.is_empty(), "a constraint row holds at least the constant");
        let (coeffs, constant) = row.split_at(row.len() - 1);
        Self {
            coeffs: coeffs.to_vec(),
            constant: constant[0].clone(),
        }
    }

    /// Flatten into a constraint row (coefficients, then constant).
    pub fn to_row(&self) -> Vec<BigInt> {
        let mut row = self.coeffs.clone();
        row.push(self.constant.clone());
        row
    }

    /// Number of variables the expression ranges over.
    pub fn num_vars(&self) -> usize {
        self.coeffs.len()
    }

    /// Check if this is a constant expression.
    pub fn is_constant(&self) -> bool {
        self.coeffs.iter().all(Zero::is_zero)
    }

    /// Get the constant value if this is a constant expression.
    pub fn as_constant(&self) -> Option<&BigInt> {
        if self.is_constant() {
            Some(&self.constant)
        } else {
            None
        }
    }

    /// Get coefficient for a variable.
    pub fn coeff(&self, index: usize) -> &BigInt {
        &self.coeffs[index]
    }

    /// Set coefficient for a variable.
    pub fn set_coeff(&mut self, index: usize, value: impl Into<BigInt>) {
        self.coeffs[index] = value.into();
    }

    /// Evaluate the expression at a point.
    pub fn evaluate(&self, point: &[BigInt]) -> BigInt {
        assert_eq!(point.len(), self.coeffs.len(), "point dimension mismatch");
        self.coeffs
            .iter()
            .zip(point)
            .fold(self.constant.clone(), |acc, (c, v)| acc + c * v)
    }

    /// Scale the expression by a constant.
    pub fn scale(&self, factor: &BigInt) -> Self {
        Self {
            coeffs: self.coeffs.iter().map(|c| c * factor).collect(),
            constant: &self.constant * factor,
        }
    }

    /// GCD of the variable coefficients (zero for a constant expression).
    pub fn coeff_gcd(&self) -> BigInt {
        vector_gcd(&self.coeffs)
    }

    /// Convert to string with the given variable names.
    pub fn to_string_with_names(&self, names: &[String]) -> String {
        let mut out = String::new();
        for (i, c) in self.coeffs.iter().enumerate() {
            if c.is_zero() {
                continue;
            }
            let default_name = format!("v{}", i);
            let name = names.get(i).map(String::as_str).unwrap_or(&default_name);
            push_term(&mut out, c, Some(name));
        }
        if !self.constant.is_zero() || out.is_empty() {
            push_term(&mut out, &self.constant, None);
        }
        out
    }
}

fn push_term(out: &mut String, coeff: &BigInt, name: Option<&str>) {
    let magnitude = coeff.abs();
    if out.is_empty() {
        if coeff.is_negative() {
            out.push('-');
        }
    } else if coeff.is_negative() {
        out.push_str(" - ");
    } else {
        out.push_str(" + ");
    }
    match name {
        Some(name) if magnitude.is_one() => out.push_str(name),
        Some(name) => out.push_str(&format!("{}{}", magnitude, name)),
        None => out.push_str(&magnitude.to_string()),
    }
}

impl Add for AffineExpr {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        assert_eq!(self.coeffs.len(), other.coeffs.len());
        Self {
            coeffs: self.coeffs.iter().zip(&other.coeffs).map(|(a, b)| a + b).collect(),
            constant: self.constant + other.constant,
        }
    }
}

impl Sub for AffineExpr {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self + (-other)
    }
}

impl Neg for AffineExpr {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            coeffs: self.coeffs.into_iter().map(|c| -c).collect(),
            constant: -self.constant,
        }
    }
}

impl fmt::Display for AffineExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = (0..self.num_vars()).map(|i| format!("d{}", i)).collect();
        write!(f, "{}", self.to_string_with_names(&names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fraction::int_vec;

    #[test]
    fn test_constant() {
        let expr = AffineExpr::constant(5, 2);
        assert!(expr.is_constant());
        assert_eq!(expr.evaluate(&int_vec(&[1, 2])), BigInt::from(5));
    }

    #[test]
    fn test_var_and_row_roundtrip() {
        let expr = AffineExpr::var(0, 2);
        assert!(!expr.is_constant());
        assert_eq!(expr.evaluate(&int_vec(&[7, 3])), BigInt::from(7));
        assert_eq!(expr.to_row(), int_vec(&[1, 0, 0]));
        assert_eq!(AffineExpr::from_row(&int_vec(&[1, 0, 0])), expr);
    }

    #[test]
    fn test_add_sub() {
        let sum = AffineExpr::var(0, 2) + AffineExpr::var(1, 2);
        assert_eq!(sum.evaluate(&int_vec(&[3, 4])), BigInt::from(7));
        let diff = AffineExpr::var(0, 2) - AffineExpr::constant(2, 2);
        assert_eq!(diff.to_row(), int_vec(&[1, 0, -2]));
    }

    #[test]
    fn test_scale_and_gcd() {
        let expr = AffineExpr::from_row(&int_vec(&[4, -6, 3]));
        assert_eq!(expr.coeff_gcd(), BigInt::from(2));
        assert_eq!(expr.scale(&BigInt::from(-1)).to_row(), int_vec(&[-4, 6, -3]));
    }

    #[test]
    fn test_display() {
        let expr = AffineExpr::from_row(&int_vec(&[2, -1, 1, 5]));
        let s = expr.to_string_with_names(&["i".to_string(), "j".to_string(), "N".to_string()]);
        assert_eq!(s, "2i - j + N + 5");
        assert_eq!(AffineExpr::from_row(&int_vec(&[-1, 0, 0])).to_string(), "-d0");
        assert_eq!(AffineExpr::zero(1).to_string(), "0");
    }
}
