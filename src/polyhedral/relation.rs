//! Integer relations: conjunctions of affine constraints over a space.
//!
//! Rows hold one coefficient per variable followed by the constant term.
//! An inequality row asks for `row . (x, 1) >= 0` and an equality row for
//! `row . (x, 1) == 0`.

use crate::polyhedral::constraint::{Constraint, ConstraintKind};
use crate::polyhedral::expr::AffineExpr;
use crate::polyhedral::space::Space;
use crate::polyhedral::transform::LinearTransform;
use crate::simplex::Simplex;
use crate::utils::fraction::{ceil, negative_sum};
use crate::utils::matrix::{vector_gcd, IntMatrix};
use log::debug;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A set of integer points (or pairs of points) described by affine
/// equalities and inequalities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegerRelation {
    /// Variables the constraints range over
    pub space: Space,
    equalities: IntMatrix,
    inequalities: IntMatrix,
}

/// A relation without domain variables.
pub type IntegerPolyhedron = IntegerRelation;

impl IntegerRelation {
    /// The universe over `space`.
    pub fn new(space: Space) -> Self {
        let cols = space.num_vars() + 1;
        Self {
            space,
            equalities: IntMatrix::zeros(0, cols),
            inequalities: IntMatrix::zeros(0, cols),
        }
    }

    /// The universe over `n_dim` set dimensions.
    pub fn universe(n_dim: usize) -> Self {
        Self::new(Space::set(n_dim))
    }

    pub fn num_vars(&self) -> usize {
        self.space.num_vars()
    }

    pub fn num_equalities(&self) -> usize {
        self.equalities.num_rows()
    }

    pub fn num_inequalities(&self) -> usize {
        self.inequalities.num_rows()
    }

    pub fn num_constraints(&self) -> usize {
        self.num_equalities() + self.num_inequalities()
    }

    pub fn equality(&self, i: usize) -> &[BigInt] {
        self.equalities.row(i)
    }

    pub fn inequality(&self, i: usize) -> &[BigInt] {
        self.inequalities.row(i)
    }

    pub fn equalities(&self) -> &IntMatrix {
        &self.equalities
    }

    pub fn inequalities(&self) -> &IntMatrix {
        &self.inequalities
    }

    fn check_row(&self, row: &[BigInt]) {
        assert_eq!(
            row.len(),
            self.num_vars() + 1,
            "constraint row must hold one coefficient per variable plus a constant"
        );
    }

    /// Add `row == 0`.
    pub fn add_equality(&mut self, row: &[BigInt]) {
        self.check_row(row);
        self.equalities.add_row(row.to_vec());
    }

    /// Add `row >= 0`.
    pub fn add_inequality(&mut self, row: &[BigInt]) {
        self.check_row(row);
        self.inequalities.add_row(row.to_vec());
    }

    /// Add a constraint over this relation's variables.
    pub fn add_constraint(&mut self, constraint: &Constraint) {
        let row = constraint.to_row();
        match constraint.kind {
            ConstraintKind::Equality => self.add_equality(&row),
            ConstraintKind::Inequality => self.add_inequality(&row),
        }
    }

    /// Every constraint, equalities first.
    pub fn constraints(&self) -> Vec<Constraint> {
        let equalities = self
            .equalities
            .rows()
            .map(|row| Constraint::eq_zero(AffineExpr::from_row(row)));
        let inequalities = self
            .inequalities
            .rows()
            .map(|row| Constraint::ge_zero(AffineExpr::from_row(row)));
        equalities.chain(inequalities).collect()
    }

    /// Drop the variables in `start..end` together with their coefficients.
    pub fn remove_var_range(&mut self, start: usize, end: usize) {
        assert!(start <= end && end <= self.num_vars(), "invalid variable range");
        self.equalities.remove_columns(start, end);
        self.inequalities.remove_columns(start, end);
        self.space.remove_var_range(start, end);
    }

    /// Drop every constraint with a nonzero coefficient on a variable in
    /// `start..end`.
    pub fn remove_constraints_involving_var_range(&mut self, start: usize, end: usize) {
        assert!(start <= end && end <= self.num_vars(), "invalid variable range");
        let independent = |row: &[BigInt]| row[start..end].iter().all(Zero::is_zero);
        self.equalities.retain_rows(independent);
        self.inequalities.retain_rows(independent);
    }

    /// Fix the variables from `pos` on to `values` and eliminate them.
    pub fn set_and_eliminate(&mut self, pos: usize, values: &[BigInt]) {
        let end = pos + values.len();
        assert!(end <= self.num_vars(), "too many values for the variables");
        let constant_col = self.num_vars();
        for matrix in [&mut self.equalities, &mut self.inequalities] {
            for i in 0..matrix.num_rows() {
                let row = matrix.row_mut(i);
                let shift: BigInt = row[pos..end].iter().zip(values).map(|(a, v)| a * v).sum();
                row[constant_col] += shift;
            }
        }
        self.remove_var_range(pos, end);
    }

    /// Whether `point` satisfies every constraint.
    pub fn contains_point(&self, point: &[BigInt]) -> bool {
        let n = self.num_vars();
        assert_eq!(point.len(), n, "point must assign every variable");
        let value = |row: &[BigInt]| -> BigInt {
            row[..n]
                .iter()
                .zip(point)
                .fold(row[n].clone(), |acc, (a, x)| acc + a * x)
        };
        self.equalities.rows().all(|row| value(row).is_zero())
            && self.inequalities.rows().all(|row| !value(row).is_negative())
    }

    /// Cheap emptiness check: some equality's coefficient gcd does not
    /// divide its constant.
    pub fn is_empty_by_gcd_test(&self) -> bool {
        let n = self.num_vars();
        self.equalities.rows().any(|row| {
            let gcd = vector_gcd(&row[..n]);
            if gcd.is_zero() {
                !row[n].is_zero()
            } else {
                !row[n].is_multiple_of(&gcd)
            }
        })
    }

    /// Whether the relation has no integer point.
    pub fn is_empty(&self) -> bool {
        self.find_integer_sample().is_none()
    }

    /// The conjunction of both relations' constraints.
    pub fn intersect(&self, other: &IntegerRelation) -> IntegerRelation {
        assert_eq!(
            self.num_vars(),
            other.num_vars(),
            "relations must range over the same variables"
        );
        let mut result = self.clone();
        for row in other.equalities.rows() {
            result.add_equality(row);
        }
        for row in other.inequalities.rows() {
            result.add_inequality(row);
        }
        result
    }

    /// Whether the rational relaxation of `self` lies inside that of `other`.
    pub fn is_rational_subset_of(&self, other: &IntegerRelation) -> bool {
        Simplex::from_relation(self).is_rational_subset_of(other)
    }

    /// Drop constraints implied by the others. Of two identical
    /// constraints the first is kept. An equality goes only when both of
    /// its halves are implied.
    pub fn remove_redundant_constraints(&mut self) {
        let mut simplex = Simplex::from_relation(self);
        simplex.detect_redundant();

        let n_ineq = self.num_inequalities();
        let keep_ineq: Vec<bool> = (0..n_ineq)
            .map(|i| !simplex.is_marked_redundant(i))
            .collect();
        let keep_eq: Vec<bool> = (0..self.num_equalities())
            .map(|r| {
                !(simplex.is_marked_redundant(n_ineq + 2 * r)
                    && simplex.is_marked_redundant(n_ineq + 2 * r + 1))
            })
            .collect();

        let before = self.num_constraints();
        let mut keep = keep_ineq.into_iter();
        self.inequalities
            .retain_rows(|_| keep.next().unwrap_or(true));
        let mut keep = keep_eq.into_iter();
        self.equalities.retain_rows(|_| keep.next().unwrap_or(true));
        debug!(
            "removed {} redundant constraint(s)",
            before - self.num_constraints()
        );
    }

    /// Directions along which the rational relaxation is bounded: the
    /// normals of inequalities bounded from above, then every equality.
    pub fn bounded_directions(&self) -> IntMatrix {
        let n = self.num_vars();
        // Equalities take part in deciding boundedness, so the solver
        // carries them too.
        let mut simplex = Simplex::from_relation(self);
        let mut directions = IntMatrix::zeros(0, n);
        for i in 0..self.num_inequalities() {
            if simplex.is_bounded_along_constraint(i) {
                directions.add_row(self.inequality(i)[..n].to_vec());
            }
        }
        for row in self.equalities.rows() {
            directions.add_row(row[..n].to_vec());
        }
        directions
    }

    /// An integer point of the relation, or `None` if there is none.
    ///
    /// Bounded relations are searched directly. Otherwise the relation is
    /// transformed so that its bounded directions become the leading
    /// coordinates; those are sampled as a bounded set and the remaining
    /// cone, which holds infinitely many integer points, is sampled by
    /// rounding up a rational point of a shrunken copy.
    pub fn find_integer_sample(&self) -> Option<Vec<BigInt>> {
        if self.is_empty_by_gcd_test() {
            return None;
        }
        let mut simplex = Simplex::from_relation(self);
        if simplex.is_empty() {
            return None;
        }
        let n = self.num_vars();
        if n == 0 {
            return Some(Vec::new());
        }
        if !simplex.is_unbounded() {
            return simplex.find_bounded_integer_sample();
        }

        let (n_bounded, transform) =
            LinearTransform::make_transform_to_column_echelon(&self.bounded_directions());
        debug!(
            "sampling unbounded relation: {} bounded of {} direction(s)",
            n_bounded, n
        );
        let mut cone = transform.apply_to(self);

        let mut bounded = cone.clone();
        bounded.remove_constraints_involving_var_range(n_bounded, n);
        bounded.remove_var_range(n_bounded, n);
        let mut sample = Simplex::from_relation(&bounded).find_bounded_integer_sample()?;
        debug_assert!(bounded.contains_point(&sample));

        cone.set_and_eliminate(0, &sample);
        // Tighten each inequality by the most that rounding a point up can
        // lose, so the rounded point stays inside the original cone.
        let cone_vars = cone.num_vars();
        for i in 0..cone.num_inequalities() {
            let row = cone.inequalities.row_mut(i);
            let shift = negative_sum(&row[..cone_vars]);
            row[cone_vars] += shift;
        }
        let cone_sample = Simplex::from_relation(&cone).get_rational_sample()?;
        sample.extend(cone_sample.iter().map(ceil));

        Some(transform.post_multiply_with_column(&sample))
    }

    fn var_names(&self) -> Vec<String> {
        (0..self.num_vars()).map(|i| self.space.var_name(i)).collect()
    }
}

impl fmt::Display for IntegerRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.var_names();
        let n_set = self.space.n_in + self.space.n_dim;
        write!(f, "({})", names[..n_set].join(", "))?;
        if self.space.n_param > 0 {
            write!(f, "[{}]", names[n_set..].join(", "))?;
        }
        let constraints = self.constraints();
        if constraints.is_empty() {
            return Ok(());
        }
        let rendered: Vec<String> = constraints
            .iter()
            .map(|c| c.to_string_with_names(&names))
            .collect();
        write!(f, " : ({})", rendered.join(", "))
    }
}
