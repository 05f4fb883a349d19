//! Generalized basis reduction.
//!
//! The width of a region along an integer direction `d` is
//! `max d.x - min d.x`. Reduction turns the identity basis into a
//! unimodular basis whose leading directions are narrow, so branching on
//! them visits few values no matter how wide the region is along the
//! coordinate axes.
//!
//! Widths are computed on the product of the region with itself, where
//! the width along `d` is `max d.(x - y)`. Fixing earlier directions adds
//! the equalities `b.(x - y) == 0`; their duals at an optimum give the
//! multiple of an earlier direction that best narrows a later one.

use crate::simplex::tableau::Orientation;
use crate::simplex::{Direction, MaybeOptimum, Simplex, Snapshot};
use crate::utils::fraction::{floor, frac, Fraction};
use crate::utils::matrix::IntMatrix;
use log::trace;
use num_bigint::BigInt;
use num_traits::{One, Zero};

/// Width oracle over two copies of a region.
struct WidthSimplex {
    simplex: Simplex,
    /// Constraints belonging to the copies; direction equalities follow.
    offset: usize,
    snapshots: Vec<Snapshot>,
}

impl WidthSimplex {
    fn new(region: &Simplex) -> Self {
        let system = region.constraint_system();
        let n = system.num_vars();
        let mut simplex = Simplex::new(2 * n);
        for row in system.inequalities().rows() {
            let zeros = std::iter::repeat(BigInt::zero()).take(n);
            let first: Vec<BigInt> = row[..n]
                .iter()
                .cloned()
                .chain(zeros.clone())
                .chain(std::iter::once(row[n].clone()))
                .collect();
            let second: Vec<BigInt> = zeros.chain(row.iter().cloned()).collect();
            simplex.add_inequality(&first);
            simplex.add_inequality(&second);
        }
        let offset = simplex.num_constraints();
        Self {
            simplex,
            offset,
            snapshots: Vec::new(),
        }
    }

    /// `dir . (x - y)` as a constraint row.
    fn direction_row(dir: &[BigInt]) -> Vec<BigInt> {
        dir.iter()
            .cloned()
            .chain(dir.iter().map(|c| -c))
            .chain(std::iter::once(BigInt::zero()))
            .collect()
    }

    fn add_equality_for_direction(&mut self, dir: &[BigInt]) {
        self.snapshots.push(self.simplex.get_snapshot());
        self.simplex.add_equality(&Self::direction_row(dir));
    }

    fn remove_last_equality(&mut self) {
        if let Some(snapshot) = self.snapshots.pop() {
            self.simplex.rollback(snapshot);
        }
    }

    /// Width along `dir`, together with the dual value of every direction
    /// equality at the optimum.
    ///
    /// An equality is stored as `e >= 0` then `-e >= 0`. At most one of the
    /// two can be a column; when neither is, its dual is zero.
    fn width_and_duals(&mut self, dir: &[BigInt]) -> (Fraction, Vec<Fraction>) {
        let tableau_snapshot = self.simplex.tableau.snapshot();
        let index = self
            .simplex
            .tableau
            .add_row(&Self::direction_row(dir), false);
        let row = self.simplex.tableau.con(index).pos;
        let width = match self.simplex.compute_row_optimum(Direction::Up, row) {
            MaybeOptimum::Bounded(width) => width,
            _ => unreachable!("width of a bounded region must be finite"),
        };

        let row = self.simplex.tableau.con(index).pos;
        let duals = (self.offset..index)
            .step_by(2)
            .map(|i| {
                let positive = self.simplex.tableau.con(i);
                let negative = self.simplex.tableau.con(i + 1);
                debug_assert!(
                    !(positive.orientation == Orientation::Column
                        && negative.orientation == Orientation::Column),
                    "both halves of an equality are columns"
                );
                if positive.orientation == Orientation::Column {
                    -self.simplex.tableau.entry(row, positive.pos)
                } else if negative.orientation == Orientation::Column {
                    self.simplex.tableau.entry(row, negative.pos).clone()
                } else {
                    Fraction::zero()
                }
            })
            .collect();
        self.simplex.tableau.rollback(tableau_snapshot);
        (width, duals)
    }
}

impl Simplex {
    /// Reduce rows `level..` of the unimodular `basis` against the current
    /// region, which must be bounded and non-empty.
    ///
    /// Afterwards no row `i + 1` can be narrowed (with rows `level..i`
    /// fixed) by more than a factor of 3/4 by swapping it with row `i`.
    pub(crate) fn reduce_basis(&self, basis: &mut IntMatrix, level: usize) {
        let n = basis.num_rows();
        if level + 1 >= n {
            return;
        }
        let epsilon = frac(3, 4);
        let mut oracle = WidthSimplex::new(self);
        // width[k]: width of row level + k with rows level..level + k fixed.
        let mut width: Vec<Fraction> = Vec::new();
        // dual[k]: dual of the equality fixing row level + k.
        let mut dual: Vec<Fraction> = Vec::new();

        // The oracle holds equalities for rows level..i.
        let mut i = level;
        while i + 1 < n {
            if i >= level + width.len() {
                let (w, _) = oracle.width_and_duals(basis.row(i));
                width.push(w);
            }
            if i >= level + dual.len() {
                oracle.add_equality_for_direction(basis.row(i));
                let (w, d) = oracle.width_and_duals(basis.row(i + 1));
                width.push(w);
                dual = d;
                oracle.remove_last_equality();
            }

            let candidate = narrow_next_row(&mut oracle, basis, i, level, &mut dual, &width);
            if candidate < &epsilon * &width[i - level] {
                trace!("basis reduction: swapping rows {} and {}", i, i + 1);
                basis.swap_rows(i, i + 1);
                width[i - level] = candidate;
                width.truncate(i - level + 1);
                if i == level {
                    dual.clear();
                    continue;
                }
                oracle.remove_last_equality();
                i -= 1;
                continue;
            }

            dual.clear();
            oracle.add_equality_for_direction(basis.row(i));
            i += 1;
        }
    }
}

/// Replace row `i + 1` by `row[i + 1] + u * row[i]` for the integer `u`
/// that minimizes its width with rows `level..i` fixed, and return that
/// width.
///
/// The minimizing rational multiple is the dual of row `i`'s equality, so
/// the integer one is its floor or its ceiling. For an integral dual the
/// width equals the cached width of row `i + 1` with row `i` fixed, and
/// the cached duals stay valid.
fn narrow_next_row(
    oracle: &mut WidthSimplex,
    basis: &mut IntMatrix,
    i: usize,
    level: usize,
    dual: &mut Vec<Fraction>,
    width: &[Fraction],
) -> Fraction {
    let multiple = &dual[i - level];
    let integral = multiple.is_integer();
    basis.add_to_row(i, i + 1, &floor(multiple));
    if integral {
        return width[i + 1 - level].clone();
    }

    let (width_floor, dual_floor) = oracle.width_and_duals(basis.row(i + 1));
    basis.add_to_row(i, i + 1, &BigInt::one());
    let (width_ceil, dual_ceil) = oracle.width_and_duals(basis.row(i + 1));
    if width_floor < width_ceil {
        basis.add_to_row(i, i + 1, &-BigInt::one());
        *dual = dual_floor;
        width_floor
    } else {
        *dual = dual_ceil;
        width_ceil
    }
}
