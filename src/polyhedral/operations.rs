//! Polyhedral operations: intersection, emptiness, inclusion, extrema.
//!
//! Thin free functions over [`IntegerPolyhedron`] backed by the solvers.

use crate::polyhedral::relation::IntegerPolyhedron;
use crate::simplex::{LexSimplex, MaybeOptimum, Simplex};
use crate::utils::fraction::Fraction;
use num_bigint::BigInt;

/// The box `0 <= x_i < bounds[i]`.
pub fn rectangular(bounds: &[i64]) -> IntegerPolyhedron {
    let n = bounds.len();
    let mut set = IntegerPolyhedron::universe(n);
    for (i, &bound) in bounds.iter().enumerate() {
        let mut lower = vec![BigInt::from(0); n + 1];
        lower[i] = BigInt::from(1);
        set.add_inequality(&lower);
        let mut upper = vec![BigInt::from(0); n + 1];
        upper[i] = BigInt::from(-1);
        upper[n] = BigInt::from(bound - 1);
        set.add_inequality(&upper);
    }
    set
}

/// Compute the intersection of two sets.
pub fn intersect(a: &IntegerPolyhedron, b: &IntegerPolyhedron) -> IntegerPolyhedron {
    a.intersect(b)
}

/// Check if a set has no integer point.
pub fn is_empty(set: &IntegerPolyhedron) -> bool {
    set.is_empty()
}

/// Check if the rational relaxation of `a` lies inside that of `b`.
pub fn is_subset_rational(a: &IntegerPolyhedron, b: &IntegerPolyhedron) -> bool {
    a.is_rational_subset_of(b)
}

/// Check if two sets have the same rational relaxation.
pub fn is_equal_rational(a: &IntegerPolyhedron, b: &IntegerPolyhedron) -> bool {
    a.is_rational_subset_of(b) && b.is_rational_subset_of(a)
}

/// Some integer point of the set.
pub fn integer_sample(set: &IntegerPolyhedron) -> Option<Vec<BigInt>> {
    set.find_integer_sample()
}

/// Some rational point of the set.
pub fn rational_sample(set: &IntegerPolyhedron) -> Option<Vec<Fraction>> {
    Simplex::from_relation(set).get_rational_sample()
}

/// Lexicographic minimum over the rationals.
pub fn rational_lexmin(set: &IntegerPolyhedron) -> MaybeOptimum<Vec<Fraction>> {
    LexSimplex::from_relation(set).find_rational_lex_min()
}

/// Lexicographic minimum over the integers.
pub fn lexmin(set: &IntegerPolyhedron) -> MaybeOptimum<Vec<BigInt>> {
    LexSimplex::from_relation(set).find_integer_lex_min()
}

/// Lexicographic maximum over the integers, as the negated minimum of the
/// mirrored set.
pub fn lexmax(set: &IntegerPolyhedron) -> MaybeOptimum<Vec<BigInt>> {
    lexmin(&mirror(set)).map(|point| point.into_iter().map(|v| -v).collect())
}

/// Drop implied constraints.
pub fn simplify(set: &IntegerPolyhedron) -> IntegerPolyhedron {
    let mut result = set.clone();
    result.remove_redundant_constraints();
    result
}

/// The set `{ -x : x in set }`.
fn mirror(set: &IntegerPolyhedron) -> IntegerPolyhedron {
    let n = set.num_vars();
    let negate = |row: &[BigInt]| -> Vec<BigInt> {
        row.iter()
            .enumerate()
            .map(|(i, v)| if i < n { -v } else { v.clone() })
            .collect()
    };
    let mut result = IntegerPolyhedron::new(set.space.clone());
    for row in set.equalities().rows() {
        result.add_equality(&negate(row));
    }
    for row in set.inequalities().rows() {
        result.add_inequality(&negate(row));
    }
    result
}
