//! Linear constraints over the variables of a space.
//!
//! A constraint is a linear inequality or equality:
//! - Inequality: expr >= 0
//! - Equality: expr = 0

use crate::polyhedral::expr::AffineExpr;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A linear constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constraint {
    /// The affine expression (constraint is: expr >= 0 or expr = 0)
    pub expr: AffineExpr,
    /// Kind of constraint
    pub kind: ConstraintKind,
}

/// Kind of constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// Greater than or equal: expr >= 0
    Inequality,
    /// Equal: expr = 0
    Equality,
}

impl Constraint {
    /// Create a new constraint.
    pub fn new(expr: AffineExpr, kind: ConstraintKind) -> Self {
        Self { expr, kind }
    }

    /// Create an inequality constraint: expr >= 0
    pub fn ge_zero(expr: AffineExpr) -> Self {
        Self::new(expr, ConstraintKind::Inequality)
    }

    /// Create an equality constraint: expr = 0
    pub fn eq_zero(expr: AffineExpr) -> Self {
        Self::new(expr, ConstraintKind::Equality)
    }

    /// Create a constraint: lhs >= rhs
    pub fn ge(lhs: AffineExpr, rhs: AffineExpr) -> Self {
        Self::ge_zero(lhs - rhs)
    }

    /// Create a constraint: lhs <= rhs
    pub fn le(lhs: AffineExpr, rhs: AffineExpr) -> Self {
        Self::ge_zero(rhs - lhs)
    }

    /// Create a constraint: lhs = rhs
    pub fn eq(lhs: AffineExpr, rhs: AffineExpr) -> Self {
        Self::eq_zero(lhs - rhs)
    }

    /// Create a lower bound constraint: var >= lower
    pub fn lower_bound(var: usize, lower: i64, n_vars: usize) -> Self {
        Self::ge(AffineExpr::var(var, n_vars), AffineExpr::constant(lower, n_vars))
    }

    /// Create an upper bound constraint: var <= upper
    pub fn upper_bound(var: usize, upper: i64, n_vars: usize) -> Self {
        Self::le(AffineExpr::var(var, n_vars), AffineExpr::constant(upper, n_vars))
    }

    /// Check if this is an equality constraint.
    pub fn is_equality(&self) -> bool {
        matches!(self.kind, ConstraintKind::Equality)
    }

    /// Check if this is an inequality constraint.
    pub fn is_inequality(&self) -> bool {
        matches!(self.kind, ConstraintKind::Inequality)
    }

    /// Check if this constraint is satisfied by the given point.
    pub fn is_satisfied(&self, point: &[BigInt]) -> bool {
        let value = self.expr.evaluate(point);
        match self.kind {
            ConstraintKind::Inequality => !value.is_negative(),
            ConstraintKind::Equality => value.is_zero(),
        }
    }

    /// Integer complement of an inequality: `expr >= 0` becomes
    /// `-expr - 1 >= 0`. Equalities have no single-constraint complement.
    pub fn complement(&self) -> Option<Self> {
        match self.kind {
            ConstraintKind::Inequality => {
                let mut neg_expr = -self.expr.clone();
                neg_expr.constant -= BigInt::one();
                Some(Self::ge_zero(neg_expr))
            }
            ConstraintKind::Equality => None,
        }
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.expr.num_vars()
    }

    /// Constraint row (coefficients, then constant).
    pub fn to_row(&self) -> Vec<BigInt> {
        self.expr.to_row()
    }

    /// Convert to string with the given variable names.
    pub fn to_string_with_names(&self, names: &[String]) -> String {
        let expr_str = self.expr.to_string_with_names(names);
        match self.kind {
            ConstraintKind::Inequality => format!("{} >= 0", expr_str),
            ConstraintKind::Equality => format!("{} == 0", expr_str),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = (0..self.num_vars()).map(|i| format!("d{}", i)).collect();
        write!(f, "{}", self.to_string_with_names(&names))
    }
}
