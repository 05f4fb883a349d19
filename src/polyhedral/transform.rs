//! Unimodular changes of coordinates.
//!
//! A [`LinearTransform`] `U` substitutes `x = U z`. Each constraint row
//! `a . x + c` becomes `(a U) . z + c`, and a point `z` of the transformed
//! system maps back as `x = U z`. Since `U` is unimodular, integer points
//! correspond one to one.

use crate::polyhedral::IntegerRelation;
use crate::utils::matrix::IntMatrix;
use log::debug;
use num_bigint::BigInt;
use num_traits::Zero;

/// A unimodular coordinate transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearTransform {
    matrix: IntMatrix,
}

impl LinearTransform {
    /// Wrap a square matrix.
    ///
    /// Panics if the matrix is not square.
    pub fn new(matrix: IntMatrix) -> Self {
        assert_eq!(
            matrix.num_rows(),
            matrix.num_columns(),
            "a linear transform must be square"
        );
        Self { matrix }
    }

    /// The transform matrix.
    pub fn matrix(&self) -> &IntMatrix {
        &self.matrix
    }

    /// Transform that brings `m` to column echelon form, with the number of
    /// nonzero columns of that form.
    ///
    /// In the transformed coordinates every row of `m` involves only the
    /// first `rank` variables.
    pub fn make_transform_to_column_echelon(m: &IntMatrix) -> (usize, Self) {
        let (h, u) = m.hermite_normal_form();
        // Zero columns of an echelon form come last.
        let rank = (0..h.num_columns())
            .find(|&col| h.rows().all(|row| row[col].is_zero()))
            .unwrap_or_else(|| h.num_columns());
        debug!(
            "column echelon transform: rank {} of {} column(s)",
            rank,
            h.num_columns()
        );
        (rank, Self::new(u))
    }

    /// `row^T U`.
    pub fn pre_multiply_with_row(&self, row: &[BigInt]) -> Vec<BigInt> {
        self.matrix.pre_multiply_with_row(row)
    }

    /// `U col`.
    pub fn post_multiply_with_column(&self, col: &[BigInt]) -> Vec<BigInt> {
        self.matrix.post_multiply_with_column(col)
    }

    /// Rewrite every constraint of `relation` in the transformed
    /// coordinates. The space is kept as is.
    pub fn apply_to(&self, relation: &IntegerRelation) -> IntegerRelation {
        let n = relation.num_vars();
        assert_eq!(
            n,
            self.matrix.num_rows(),
            "transform size must match the relation's variable count"
        );
        let transform_row = |row: &[BigInt]| {
            let mut out = self.pre_multiply_with_row(&row[..n]);
            out.push(row[n].clone());
            out
        };

        let mut result = IntegerRelation::new(relation.space.clone());
        for row in relation.equalities().rows() {
            result.add_equality(&transform_row(row));
        }
        for row in relation.inequalities().rows() {
            result.add_inequality(&transform_row(row));
        }
        result
    }
}
