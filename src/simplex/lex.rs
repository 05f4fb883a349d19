//! Lexicographic simplex.
//!
//! Each variable `x` is tracked as `y = x + M`, where `M` is a symbolic
//! parameter larger than any other quantity, and every `y` is restricted
//! to be non-negative. A row value is therefore a pair `(m, c)` standing
//! for `m*M + c`, compared lexicographically. The sample point is the
//! lexicographic minimum of the region as long as every column is
//! lexicographically positive in terms of the variables; the dual-simplex
//! pivots used here preserve that property.
//!
//! Integer lexicographic minima add Gomory cuts until the rational
//! minimum becomes integral.

use crate::polyhedral::IntegerRelation;
use crate::simplex::tableau::{division_inequalities, Orientation, Tableau, UnknownId};
use crate::simplex::{MaybeOptimum, Snapshot};
use crate::utils::fraction::{fract, to_integer, Fraction};
use log::{debug, trace};
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;

/// Incremental solver for lexicographic minima.
#[derive(Debug, Clone)]
pub struct LexSimplex {
    tableau: Tableau,
}

impl LexSimplex {
    /// A solver over `n_var` unconstrained variables.
    pub fn new(n_var: usize) -> Self {
        Self {
            tableau: Tableau::new(n_var, true),
        }
    }

    /// A solver over the variables of `relation`, constrained by its
    /// inequalities followed by its equalities.
    pub fn from_relation(relation: &IntegerRelation) -> Self {
        let mut simplex = Self::new(relation.num_vars());
        for row in relation.inequalities().rows() {
            simplex.add_inequality(row);
        }
        for row in relation.equalities().rows() {
            simplex.add_equality(row);
        }
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

    /// Restore the exact region at which `snapshot` was taken.
    pub fn rollback(&mut self, snapshot: Snapshot) {
        self.tableau.rollback(snapshot);
        self.reset_basis();
    }

    /// Append `count` unconstrained variables after the existing ones.
    pub fn append_variable(&mut self, count: usize) {
        self.tableau.append_variable(count);
    }

    /// Add `coeffs . x + c >= 0`.
    pub fn add_inequality(&mut self, coeffs: &[BigInt]) {
        self.tableau.add_row(coeffs, true);
        if self.is_empty() {
            return;
        }
        if !self.restore_rational_consistency() {
            self.tableau.mark_empty();
        }
    }

    /// Add `coeffs . x + c == 0` as two inequalities.
    pub fn add_equality(&mut self, coeffs: &[BigInt]) {
        let negated: Vec<BigInt> = coeffs.iter().map(|c| -c).collect();
        self.add_inequality(coeffs);
        self.add_inequality(&negated);
    }

    /// Append a variable `q` constrained to `floor(f / denom)`.
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

    /// The lexicographically smallest rational point of the region.
    pub fn find_rational_lex_min(&self) -> MaybeOptimum<Vec<Fraction>> {
        if self.is_empty() {
            return MaybeOptimum::Empty;
        }
        let mut sample = Vec::with_capacity(self.num_variables());
        for index in 0..self.num_variables() {
            let unknown = self.tableau.var(index);
            // A column variable sits at y = 0, that is x = -M.
            if unknown.orientation == Orientation::Column
                || !self.tableau.big_m(unknown.pos).is_one()
            {
                return MaybeOptimum::Unbounded;
            }
            sample.push(self.tableau.constant(unknown.pos).clone());
        }
        MaybeOptimum::Bounded(sample)
    }

    /// The lexicographically smallest integer point of the region.
    ///
    /// The region is unchanged afterwards.
    pub fn find_integer_lex_min(&mut self) -> MaybeOptimum<Vec<BigInt>> {
        if self.is_empty() {
            return MaybeOptimum::Empty;
        }
        let snapshot = self.get_snapshot();
        let result = self.cut_until_integral();
        self.rollback(snapshot);
        result
    }

    /// Whether no integer point of the region satisfies `coeffs >= 0`.
    pub fn is_separate_inequality(&mut self, coeffs: &[BigInt]) -> bool {
        let snapshot = self.get_snapshot();
        self.add_inequality(coeffs);
        let separate = self.find_integer_lex_min().is_empty();
        self.rollback(snapshot);
        separate
    }

    /// Whether every integer point of the region satisfies `coeffs >= 0`,
    /// i.e. its integer complement `-coeffs - 1 >= 0` is separate.
    pub fn is_redundant_inequality(&mut self, coeffs: &[BigInt]) -> bool {
        let mut complement: Vec<BigInt> = coeffs.iter().map(|c| -c).collect();
        if let Some(constant) = complement.last_mut() {
            *constant -= BigInt::one();
        }
        self.is_separate_inequality(&complement)
    }

    fn cut_until_integral(&mut self) -> MaybeOptimum<Vec<BigInt>> {
        while let Some(row) = self.first_non_integral_var_row() {
            if !self.add_cut(row) || !self.restore_rational_consistency() {
                self.tableau.mark_empty();
                return MaybeOptimum::Empty;
            }
        }
        match self.find_rational_lex_min() {
            MaybeOptimum::Bounded(sample) => match sample.iter().map(to_integer).collect() {
                Some(point) => MaybeOptimum::Bounded(point),
                None => unreachable!("integral rows must give an integral sample"),
            },
            MaybeOptimum::Unbounded => MaybeOptimum::Unbounded,
            MaybeOptimum::Empty => MaybeOptimum::Empty,
        }
    }

    fn first_non_integral_var_row(&self) -> Option<usize> {
        (0..self.num_variables())
            .map(|index| self.tableau.var(index))
            .filter(|unknown| unknown.orientation == Orientation::Row)
            .map(|unknown| unknown.pos)
            .find(|&row| !self.tableau.constant(row).is_integer())
    }

    /// Add the Gomory cut derived from `row` and move it to a column.
    /// Returns false if the cut leaves no point.
    fn add_cut(&mut self, row: usize) -> bool {
        let source = self.tableau.row(row);
        let mut cut = vec![Fraction::zero(); self.tableau.num_columns()];
        // M is taken to be divisible by every denominator, so the big-M
        // term contributes nothing fractional.
        cut[0] = -fract(&-&source[0]);
        for col in self.tableau.first_unknown_col()..source.len() {
            cut[col] = fract(&source[col]);
        }
        trace!("gomory cut from row {}: {:?}", row, cut);
        let index = self.tableau.add_raw_row(cut, true);
        let cut_row = self.tableau.con(index).pos;
        self.move_row_unknown_to_column(cut_row)
    }

    fn is_lex_negative(&self, row: usize) -> bool {
        let m = self.tableau.big_m(row);
        m.is_negative() || (m.is_zero() && self.tableau.constant(row).is_negative())
    }

    /// Dual-simplex until every row is lexicographically non-negative.
    /// Returns false if some row cannot be repaired.
    fn restore_rational_consistency(&mut self) -> bool {
        while let Some(row) = (0..self.tableau.num_rows()).find(|&row| self.is_lex_negative(row)) {
            if !self.move_row_unknown_to_column(row) {
                return false;
            }
        }
        true
    }

    /// Pivot the unknown of `row` into a column, choosing the column that
    /// raises the sample least in lexicographic order.
    fn move_row_unknown_to_column(&mut self, row: usize) -> bool {
        let tableau = &self.tableau;
        let mut chosen: Option<usize> = None;
        for col in tableau.first_unknown_col()..tableau.num_columns() {
            if !tableau.entry(row, col).is_positive() {
                continue;
            }
            chosen = Some(match chosen {
                Some(best) if self.compare_pivot_columns(row, col, best) != Ordering::Less => best,
                _ => col,
            });
        }
        match chosen {
            Some(col) => {
                self.tableau.pivot(row, col);
                true
            }
            None => false,
        }
    }

    /// Compare the change in sample value caused by pivoting `row` with
    /// column `a` versus column `b`, variable by variable.
    fn compare_pivot_columns(&self, row: usize, a: usize, b: usize) -> Ordering {
        let tableau = &self.tableau;
        let (pivot_a, pivot_b) = (tableau.entry(row, a), tableau.entry(row, b));
        for index in 0..tableau.num_variables() {
            let unknown = tableau.var(index);
            let direction = |col: usize| -> Fraction {
                match unknown.orientation {
                    Orientation::Column if unknown.pos == col => Fraction::one(),
                    Orientation::Column => Fraction::zero(),
                    Orientation::Row => tableau.entry(unknown.pos, col).clone(),
                }
            };
            // Compare direction(a) / pivot_a with direction(b) / pivot_b;
            // both pivots are positive.
            let ordering = (direction(a) * pivot_b).cmp(&(direction(b) * pivot_a));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Pivot every variable back into a column and re-solve. Rollback can
    /// leave a basis whose columns are not lexicographically positive,
    /// from which the sample would not be the minimum.
    fn reset_basis(&mut self) {
        for index in 0..self.num_variables() {
            let unknown = self.tableau.var(index);
            if unknown.orientation == Orientation::Column {
                continue;
            }
            let row = unknown.pos;
            let col = (self.tableau.first_unknown_col()..self.tableau.num_columns()).find(|&col| {
                matches!(self.tableau.col_unknown(col), UnknownId::Con(_))
                    && !self.tableau.entry(row, col).is_zero()
            });
            match col {
                Some(col) => self.tableau.pivot(row, col),
                None => unreachable!("variable row {} depends on no constraint column", row),
            }
        }
        if self.is_empty() {
            return;
        }
        let restored = self.restore_rational_consistency();
        debug_assert!(restored, "a non-empty region must have a consistent basis");
        debug!("lexicographic basis reset over {} constraint(s)", self.num_constraints());
    }
}

impl From<&IntegerRelation> for LexSimplex {
    fn from(relation: &IntegerRelation) -> Self {
        Self::from_relation(relation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fraction::{frac, int_vec};

    #[test]
    fn test_rational_lex_min_of_interval() {
        let mut simplex = LexSimplex::new(1);
        simplex.add_inequality(&int_vec(&[2, -1])); // 2x >= 1
        simplex.add_inequality(&int_vec(&[-1, 5])); // x <= 5
        assert_eq!(
            simplex.find_rational_lex_min(),
            MaybeOptimum::Bounded(vec![frac(1, 2)])
        );
        assert_eq!(
            simplex.find_integer_lex_min(),
            MaybeOptimum::Bounded(int_vec(&[1]))
        );
    }

    #[test]
    fn test_unbounded_below() {
        let mut simplex = LexSimplex::new(2);
        simplex.add_inequality(&int_vec(&[1, 0, 0])); // x >= 0
        assert!(simplex.find_rational_lex_min().is_unbounded());
        simplex.add_inequality(&int_vec(&[0, 1, 3])); // y >= -3
        assert_eq!(
            simplex.find_rational_lex_min(),
            MaybeOptimum::Bounded(vec![frac(0, 1), frac(-3, 1)])
        );
    }

    #[test]
    fn test_lex_order_prefers_first_variable() {
        // x + y >= 4, x >= 0, y >= 0: minimum is x = 0, y = 4.
        let mut simplex = LexSimplex::new(2);
        simplex.add_inequality(&int_vec(&[1, 1, -4]));
        simplex.add_inequality(&int_vec(&[1, 0, 0]));
        simplex.add_inequality(&int_vec(&[0, 1, 0]));
        assert_eq!(
            simplex.find_integer_lex_min(),
            MaybeOptimum::Bounded(int_vec(&[0, 4]))
        );
    }

    #[test]
    fn test_integer_lex_min_needs_cuts() {
        // 2x + 2y == 1 has rational points only.
        let mut simplex = LexSimplex::new(2);
        simplex.add_inequality(&int_vec(&[1, 0, 0]));
        simplex.add_inequality(&int_vec(&[0, 1, 0]));
        simplex.add_equality(&int_vec(&[2, 2, -1]));
        assert!(!simplex.is_empty());
        assert!(simplex.find_integer_lex_min().is_empty());
        // The cuts were rolled back.
        assert_eq!(simplex.num_constraints(), 4);
        assert!(simplex.find_rational_lex_min().is_bounded());
    }

    #[test]
    fn test_rollback_restores_minimum() {
        let mut simplex = LexSimplex::new(1);
        simplex.add_inequality(&int_vec(&[1, 0])); // x >= 0
        simplex.add_inequality(&int_vec(&[-1, 10])); // x <= 10
        let snapshot = simplex.get_snapshot();
        simplex.add_inequality(&int_vec(&[1, -7])); // x >= 7
        assert_eq!(
            simplex.find_rational_lex_min(),
            MaybeOptimum::Bounded(vec![frac(7, 1)])
        );
        simplex.rollback(snapshot);
        assert_eq!(
            simplex.find_rational_lex_min(),
            MaybeOptimum::Bounded(vec![frac(0, 1)])
        );
    }

    #[test]
    fn test_empty_region() {
        let mut simplex = LexSimplex::new(1);
        simplex.add_inequality(&int_vec(&[1, -3]));
        simplex.add_inequality(&int_vec(&[-1, 1]));
        assert!(simplex.is_empty());
        assert!(simplex.find_rational_lex_min().is_empty());
        assert!(simplex.find_integer_lex_min().is_empty());
    }
}
