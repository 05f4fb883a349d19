//! Rational simplex: feasibility, optima and inequality classification.
//!
//! The tableau is kept *consistent* at all times: every restricted row
//! has a non-negative sample value, so the sample point satisfies every
//! constraint. Adding an inequality pivots until its row becomes
//! non-negative again, or marks the region empty when no pivot can.
//!
//! Pivots follow Bland's rule (smallest unknown identity first) so that
//! degenerate tableaus cannot cycle.

use crate::polyhedral::{IntegerRelation, Space};
use crate::simplex::tableau::{division_inequalities, Orientation, Tableau};
use crate::simplex::{Direction, IneqType, MaybeOptimum, Snapshot};
use crate::utils::fraction::{to_integer, Fraction};
use log::debug;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

/// Incremental rational simplex over a fixed-but-growable set of variables.
///
/// Constraints are rows `coeffs[..n] . x + coeffs[n]`; an inequality asks
/// for the row to be `>= 0`, an equality for it to be `== 0`. Equalities
/// are stored as two opposite inequalities, so each one counts as two
/// constraints.
#[derive(Debug, Clone)]
pub struct Simplex {
    pub(crate) tableau: Tableau,
    /// Every constraint row in insertion order, as given by the caller.
    constraints: Vec<Vec<BigInt>>,
}

impl Simplex {
    /// A solver over `n_var` unconstrained variables.
    pub fn new(n_var: usize) -> Self {
        Self {
            tableau: Tableau::new(n_var, false),
            constraints: Vec::new(),
        }
    }

    /// A solver over the variables of `relation`, constrained by its
    /// inequalities followed by its equalities.
    pub fn from_relation(relation: &IntegerRelation) -> Self {
        let mut simplex = Self::new(relation.num_vars());
        simplex.intersect_integer_relation(relation);
        simplex
    }

    /// Number of variables.
    pub fn num_variables(&self) -> usize {
        self.tableau.num_variables()
    }

    /// Number of constraints (an equality counts twice).
    pub fn num_constraints(&self) -> usize {
        self.tableau.num_constraints()
    }

    /// Whether the rational region is known to be empty.
    pub fn is_empty(&self) -> bool {
        self.tableau.is_empty()
    }

    /// Token for the current state.
    pub fn get_snapshot(&self) -> Snapshot {
        self.tableau.snapshot()
    }

    /// Restore the exact state at which `snapshot` was taken.
    ///
    /// Panics if the snapshot belongs to another solver or to a state that
    /// was already rolled back past.
    pub fn rollback(&mut self, snapshot: Snapshot) {
        self.tableau.rollback(snapshot);
        self.constraints.truncate(self.tableau.num_constraints());
    }

    /// Append `count` unconstrained variables after the existing ones.
    pub fn append_variable(&mut self, count: usize) {
        self.tableau.append_variable(count);
    }

    /// Add `coeffs . x + c >= 0`.
    pub fn add_inequality(&mut self, coeffs: &[BigInt]) {
        let index = self.tableau.add_row(coeffs, true);
        self.constraints.push(coeffs.to_vec());
        if self.is_empty() {
            return;
        }
        if !self.restore_row(index) {
            self.tableau.mark_empty();
        }
    }

    /// Add `coeffs . x + c == 0` as two inequalities.
    pub fn add_equality(&mut self, coeffs: &[BigInt]) {
        let negated: Vec<BigInt> = coeffs.iter().map(|c| -c).collect();
        self.add_inequality(coeffs);
        self.add_inequality(&negated);
    }

    /// Append a variable `q` constrained to `floor(f / denom)`, where `f`
    /// is the affine function `coeffs` of the existing variables.
    ///
    /// Panics if `denom` is not positive.
    pub fn add_division_variable(&mut self, coeffs: &[BigInt], denom: &BigInt) {
        assert_eq!(
            coeffs.len(),
            self.num_variables() + 1,
            "division numerator must hold one coefficient per variable plus a constant"
        );
        let (lower, upper) = division_inequalities(coeffs, denom);
        self.append_variable(1);
        self.add_inequality(&lower);
        self.add_inequality(&upper);
    }

    /// Add every constraint of `relation`: inequalities first, then
    /// equalities.
    pub fn intersect_integer_relation(&mut self, relation: &IntegerRelation) {
        assert_eq!(
            relation.num_vars(),
            self.num_variables(),
            "relation must range over the solver's variables"
        );
        for row in relation.inequalities().rows() {
            self.add_inequality(row);
        }
        for row in relation.equalities().rows() {
            self.add_equality(row);
        }
    }

    /// Pivot until the row of constraint `index` is non-negative. Returns
    /// false if that is impossible.
    pub(crate) fn restore_row(&mut self, index: usize) -> bool {
        loop {
            let unknown = self.tableau.con(index);
            if unknown.orientation == Orientation::Column
                || !self.tableau.constant(unknown.pos).is_negative()
            {
                return true;
            }
            match self.find_pivot(unknown.pos, Direction::Up) {
                Some((row, col)) => self.tableau.pivot(row, col),
                None => return false,
            }
        }
    }

    /// A pivot that moves `row` in `direction` while keeping every other
    /// restricted row non-negative. The pivot row equals `row` itself when
    /// nothing limits the move.
    fn find_pivot(&self, row: usize, direction: Direction) -> Option<(usize, usize)> {
        let tableau = &self.tableau;
        let mut chosen: Option<usize> = None;
        for col in tableau.first_unknown_col()..tableau.num_columns() {
            let elem = tableau.entry(row, col);
            if elem.is_zero() {
                continue;
            }
            // A restricted column may only increase.
            let restricted = tableau.unknown(tableau.col_unknown(col)).restricted;
            if restricted && !direction.agrees_with(elem) {
                continue;
            }
            if chosen.map_or(true, |best| tableau.col_unknown(col) < tableau.col_unknown(best)) {
                chosen = Some(col);
            }
        }
        let col = chosen?;
        let col_direction = if tableau.entry(row, col).is_negative() {
            direction.flipped()
        } else {
            direction
        };
        let pivot_row = tableau
            .find_pivot_row(Some(row), col_direction, col)
            .unwrap_or(row);
        Some((pivot_row, col))
    }

    /// Optimize the unknown in `row` without ever pivoting it out.
    pub(crate) fn compute_row_optimum(
        &mut self,
        direction: Direction,
        row: usize,
    ) -> MaybeOptimum<Fraction> {
        while let Some((pivot_row, pivot_col)) = self.find_pivot(row, direction) {
            if pivot_row == row {
                return MaybeOptimum::Unbounded;
            }
            self.tableau.pivot(pivot_row, pivot_col);
        }
        MaybeOptimum::Bounded(self.tableau.constant(row).clone())
    }

    /// Optimum of the affine function `coeffs` over the region.
    ///
    /// The region itself is left unchanged; only the basis may differ
    /// afterwards.
    pub fn compute_optimum(
        &mut self,
        direction: Direction,
        coeffs: &[BigInt],
    ) -> MaybeOptimum<Fraction> {
        if self.is_empty() {
            return MaybeOptimum::Empty;
        }
        let snapshot = self.tableau.snapshot();
        let index = self.tableau.add_row(coeffs, false);
        let row = self.tableau.con(index).pos;
        let optimum = self.compute_row_optimum(direction, row);
        self.tableau.rollback(snapshot);
        optimum
    }

    /// Optimum of constraint `index` over the region with that constraint
    /// relaxed.
    pub(crate) fn compute_constraint_optimum(
        &mut self,
        direction: Direction,
        index: usize,
    ) -> MaybeOptimum<Fraction> {
        if self.is_empty() {
            return MaybeOptimum::Empty;
        }
        let unknown = self.tableau.con(index);
        if unknown.orientation == Orientation::Column {
            match self.tableau.find_pivot_row(None, direction, unknown.pos) {
                Some(row) => self.tableau.pivot(row, unknown.pos),
                None => return MaybeOptimum::Unbounded,
            }
        }
        let row = self.tableau.con(index).pos;
        let optimum = self.compute_row_optimum(direction, row);
        let went_negative = match &optimum {
            MaybeOptimum::Unbounded => true,
            MaybeOptimum::Bounded(value) => value.is_negative(),
            MaybeOptimum::Empty => false,
        };
        if unknown.restricted && direction == Direction::Down && went_negative {
            let restored = self.restore_row(index);
            debug_assert!(restored, "a satisfiable constraint must be restorable");
        }
        optimum
    }

    /// Whether constraint `index` has a finite maximum over the region.
    pub fn is_bounded_along_constraint(&mut self, index: usize) -> bool {
        assert!(index < self.num_constraints(), "constraint index out of range");
        self.compute_constraint_optimum(Direction::Up, index)
            .is_bounded()
    }

    /// Whether some variable is unbounded above or below.
    ///
    /// An empty region is never unbounded. With no variables, the region is
    /// unbounded exactly when it also has no constraints.
    pub fn is_unbounded(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        let n = self.num_variables();
        if n == 0 {
            return self.num_constraints() == 0;
        }
        let mut dir = vec![BigInt::zero(); n + 1];
        for i in 0..n {
            dir[i] = BigInt::one();
            if self.compute_optimum(Direction::Up, &dir).is_unbounded()
                || self.compute_optimum(Direction::Down, &dir).is_unbounded()
            {
                return true;
            }
            dir[i] = BigInt::zero();
        }
        false
    }

    /// Classify the inequality `coeffs >= 0` against the region.
    ///
    /// Every inequality is `Redundant` for an empty region.
    pub fn find_ineq_type(&mut self, coeffs: &[BigInt]) -> IneqType {
        if self.is_empty() {
            return IneqType::Redundant;
        }
        if let MaybeOptimum::Bounded(minimum) = self.compute_optimum(Direction::Down, coeffs) {
            if !minimum.is_negative() {
                return IneqType::Redundant;
            }
        }
        match self.compute_optimum(Direction::Up, coeffs) {
            MaybeOptimum::Bounded(maximum) if maximum.is_negative() => IneqType::Separate,
            _ => IneqType::Cut,
        }
    }

    /// Whether every point of the region satisfies `coeffs >= 0`.
    pub fn is_redundant_inequality(&mut self, coeffs: &[BigInt]) -> bool {
        self.find_ineq_type(coeffs) == IneqType::Redundant
    }

    /// Whether no point of the region satisfies `coeffs >= 0`.
    pub fn is_separate_inequality(&mut self, coeffs: &[BigInt]) -> bool {
        self.find_ineq_type(coeffs) == IneqType::Separate
    }

    /// Whether every point of the region satisfies `coeffs == 0`.
    pub fn is_redundant_equality(&mut self, coeffs: &[BigInt]) -> bool {
        if self.is_empty() {
            return true;
        }
        let minimum = self.compute_optimum(Direction::Down, coeffs);
        let maximum = self.compute_optimum(Direction::Up, coeffs);
        match (minimum, maximum) {
            (MaybeOptimum::Bounded(min), MaybeOptimum::Bounded(max)) => {
                min.is_zero() && max.is_zero()
            }
            _ => false,
        }
    }

    /// Whether the rational region lies inside `relation`'s rational
    /// relaxation. An empty region is a subset of everything.
    pub fn is_rational_subset_of(&mut self, relation: &IntegerRelation) -> bool {
        assert_eq!(
            relation.num_vars(),
            self.num_variables(),
            "relation must range over the solver's variables"
        );
        if self.is_empty() {
            return true;
        }
        let inequalities_hold = relation
            .inequalities()
            .rows()
            .all(|row| self.find_ineq_type(row) == IneqType::Redundant);
        inequalities_hold
            && relation
                .equalities()
                .rows()
                .all(|row| self.is_redundant_equality(row))
    }

    /// The current sample point, or `None` if the region is empty.
    pub fn get_rational_sample(&self) -> Option<Vec<Fraction>> {
        if self.is_empty() {
            return None;
        }
        Some(
            (0..self.num_variables())
                .map(|i| self.tableau.sample_value(i))
                .collect(),
        )
    }

    /// The current sample point if it is non-empty and integral.
    pub fn get_sample_point_if_integral(&self) -> Option<Vec<BigInt>> {
        self.get_rational_sample()?.iter().map(to_integer).collect()
    }

    /// The constraints added so far as a relation over the current
    /// variables. Equalities appear as their two inequalities.
    pub(crate) fn constraint_system(&self) -> IntegerRelation {
        let n = self.num_variables();
        let mut relation = IntegerRelation::new(Space::set(n));
        for coeffs in &self.constraints {
            // Rows added before later variables were appended lack their
            // coefficients; those are zero.
            let width = coeffs.len() - 1;
            let mut row = coeffs[..width].to_vec();
            row.resize(n, BigInt::zero());
            row.push(coeffs[width].clone());
            relation.add_inequality(&row);
        }
        debug!(
            "rebuilt {} constraint(s) over {} variable(s)",
            self.constraints.len(),
            n
        );
        relation
    }
}

impl From<&IntegerRelation> for Simplex {
    fn from(relation: &IntegerRelation) -> Self {
        Self::from_relation(relation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fraction::{frac, int_vec};

    #[test]
    fn test_bounded_interval_optimum() {
        let mut simplex = Simplex::new(1);
        simplex.add_inequality(&int_vec(&[1, -2])); // x >= 2
        simplex.add_inequality(&int_vec(&[-1, 5])); // x <= 5
        assert_eq!(
            simplex.compute_optimum(Direction::Up, &int_vec(&[1, 0])),
            MaybeOptimum::Bounded(frac(5, 1))
        );
        assert_eq!(
            simplex.compute_optimum(Direction::Down, &int_vec(&[2, 1])),
            MaybeOptimum::Bounded(frac(5, 1))
        );
    }

    #[test]
    fn test_unbounded_optimum() {
        let mut simplex = Simplex::new(2);
        simplex.add_inequality(&int_vec(&[1, 0, 0]));
        assert!(simplex
            .compute_optimum(Direction::Up, &int_vec(&[1, 0, 0]))
            .is_unbounded());
        assert!(simplex
            .compute_optimum(Direction::Down, &int_vec(&[0, 1, 0]))
            .is_unbounded());
    }

    #[test]
    fn test_empty_and_rollback() {
        let mut simplex = Simplex::new(1);
        simplex.add_inequality(&int_vec(&[1, 0]));
        let snapshot = simplex.get_snapshot();
        simplex.add_inequality(&int_vec(&[-1, -1]));
        assert!(simplex.is_empty());
        assert!(simplex
            .compute_optimum(Direction::Up, &int_vec(&[1, 0]))
            .is_empty());
        simplex.rollback(snapshot);
        assert!(!simplex.is_empty());
        assert_eq!(simplex.num_constraints(), 1);
    }

    #[test]
    fn test_constraints_after_empty_are_tracked() {
        let mut simplex = Simplex::new(1);
        let snapshot = simplex.get_snapshot();
        simplex.add_equality(&int_vec(&[0, 1]));
        assert!(simplex.is_empty());
        simplex.add_inequality(&int_vec(&[1, 0]));
        assert_eq!(simplex.num_constraints(), 3);
        simplex.rollback(snapshot);
        assert!(!simplex.is_empty());
        assert_eq!(simplex.num_constraints(), 0);
    }

    #[test]
    fn test_sample_satisfies_constraints() {
        let mut simplex = Simplex::new(2);
        simplex.add_inequality(&int_vec(&[1, 1, -3])); // x + y >= 3
        simplex.add_inequality(&int_vec(&[1, -1, 0])); // x >= y
        simplex.add_inequality(&int_vec(&[0, 1, -1])); // y >= 1
        let sample = simplex.get_rational_sample().unwrap();
        let (x, y) = (&sample[0], &sample[1]);
        assert!(x + y >= frac(3, 1));
        assert!(x >= y);
        assert!(*y >= frac(1, 1));
    }

    #[test]
    fn test_constraint_system_pads_appended_variables() {
        let mut simplex = Simplex::new(1);
        simplex.add_inequality(&int_vec(&[1, 0]));
        simplex.append_variable(1);
        simplex.add_inequality(&int_vec(&[0, 1, 2]));
        let relation = simplex.constraint_system();
        assert_eq!(relation.num_inequalities(), 2);
        assert_eq!(relation.inequality(0), int_vec(&[1, 0, 0]).as_slice());
        assert_eq!(relation.inequality(1), int_vec(&[0, 1, 2]).as_slice());
    }

    #[test]
    fn test_bounded_along_constraint() {
        let mut simplex = Simplex::new(2);
        simplex.add_inequality(&int_vec(&[1, 0, 0])); // x >= 0
        simplex.add_inequality(&int_vec(&[-1, 0, 3])); // x <= 3
        simplex.add_inequality(&int_vec(&[0, 1, 0])); // y >= 0
        assert!(simplex.is_bounded_along_constraint(0));
        assert!(simplex.is_bounded_along_constraint(1));
        assert!(!simplex.is_bounded_along_constraint(2));
        // The queries leave the region intact.
        assert!(simplex.is_redundant_inequality(&int_vec(&[1, 0, 1])));
        assert!(!simplex.is_empty());
    }
}
