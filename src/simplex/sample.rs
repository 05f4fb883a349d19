//! Integer bounds and integer sample search.
//!
//! Bounded regions are searched directly on the tableau along the
//! directions of a reduced basis (see `basis`), so thin regions are decided
//! after a few branches however far they extend. Unbounded regions are
//! split into a bounded part and a cone by
//! [`IntegerRelation::find_integer_sample`].
//!
//! [`IntegerRelation::find_integer_sample`]: crate::polyhedral::IntegerRelation::find_integer_sample

use crate::simplex::{Direction, MaybeOptimum, Simplex, Snapshot};
use crate::utils::fraction::{ceil, floor};
use crate::utils::matrix::IntMatrix;
use log::{debug, trace};
use num_bigint::BigInt;
use num_traits::{One, Zero};

impl Simplex {
    /// Integer bounds of the affine function `coeffs`: the ceiling of its
    /// minimum and the floor of its maximum.
    pub fn compute_integer_bounds(
        &mut self,
        coeffs: &[BigInt],
    ) -> (MaybeOptimum<BigInt>, MaybeOptimum<BigInt>) {
        let lower = self
            .compute_optimum(Direction::Down, coeffs)
            .map(|value| ceil(&value));
        let upper = self
            .compute_optimum(Direction::Up, coeffs)
            .map(|value| floor(&value));
        (lower, upper)
    }

    /// An integer point of the region, or `None` if there is none.
    ///
    /// The region is unchanged afterwards.
    pub fn find_integer_sample(&mut self) -> Option<Vec<BigInt>> {
        if self.is_empty() {
            return None;
        }
        if self.num_variables() == 0 {
            return Some(Vec::new());
        }
        if self.is_unbounded() {
            debug!("integer sample: region is unbounded, sampling through its constraint system");
            return self.constraint_system().find_integer_sample();
        }
        self.find_bounded_integer_sample()
    }

    /// Integer sample search for a region whose variables all have finite
    /// bounds.
    ///
    /// Each level fixes one direction of a reduced basis to each of its
    /// integer values in turn, then reduces the remaining directions again
    /// under that choice. Once every direction is fixed the sample point is
    /// the only candidate; it is integral because the basis is unimodular.
    pub(crate) fn find_bounded_integer_sample(&mut self) -> Option<Vec<BigInt>> {
        if self.is_empty() {
            return None;
        }
        let n = self.num_variables();
        let outer = self.get_snapshot();
        let mut basis = IntMatrix::identity(n);
        let mut levels: Vec<Level> = Vec::new();
        let mut found = None;
        let mut descend = true;

        loop {
            if descend {
                let level = levels.len();
                if level == n {
                    if let Some(sample) = self.get_sample_point_if_integral() {
                        found = Some(sample);
                        break;
                    }
                } else if !self.is_empty() {
                    self.reduce_basis(&mut basis, level);
                    let direction = with_constant(basis.row(level), BigInt::zero());
                    match self.compute_integer_bounds(&direction) {
                        (MaybeOptimum::Bounded(lower), MaybeOptimum::Bounded(upper)) => {
                            trace!(
                                "level {}: direction {:?} over [{}, {}]",
                                level,
                                basis.row(level),
                                lower,
                                upper
                            );
                            levels.push(Level {
                                snapshot: self.get_snapshot(),
                                next: lower,
                                upper,
                            });
                        }
                        (lower, upper) => {
                            debug_assert!(
                                !lower.is_unbounded() && !upper.is_unbounded(),
                                "bounded search over an unbounded region"
                            );
                        }
                    }
                }
            }

            let Some(top) = levels.last_mut() else {
                break;
            };
            self.rollback(top.snapshot);
            if top.next > top.upper {
                levels.pop();
                descend = false;
                continue;
            }
            let value = top.next.clone();
            top.next += BigInt::one();
            let level = levels.len() - 1;
            self.add_equality(&with_constant(basis.row(level), -value));
            descend = true;
        }

        self.rollback(outer);
        debug!(
            "bounded integer sample search: {}",
            if found.is_some() { "found" } else { "none" }
        );
        found
    }
}

/// One fixed direction of the search: the state before fixing it and the
/// integer values still to try.
struct Level {
    snapshot: Snapshot,
    next: BigInt,
    upper: BigInt,
}

/// The row `dir . x + constant`.
fn with_constant(dir: &[BigInt], constant: BigInt) -> Vec<BigInt> {
    dir.iter().cloned().chain(std::iter::once(constant)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fraction::int_vec;

    #[test]
    fn test_integer_bounds() {
        let mut simplex = Simplex::new(1);
        simplex.add_inequality(&int_vec(&[2, -3])); // 2x >= 3
        simplex.add_inequality(&int_vec(&[-2, 9])); // 2x <= 9
        let (lower, upper) = simplex.compute_integer_bounds(&int_vec(&[1, 0]));
        assert_eq!(lower, MaybeOptimum::Bounded(BigInt::from(2)));
        assert_eq!(upper, MaybeOptimum::Bounded(BigInt::from(4)));
    }

    #[test]
    fn test_integer_bounds_unbounded_and_empty() {
        let mut simplex = Simplex::new(1);
        simplex.add_inequality(&int_vec(&[1, 0]));
        let (lower, upper) = simplex.compute_integer_bounds(&int_vec(&[1, 0]));
        assert_eq!(lower, MaybeOptimum::Bounded(BigInt::from(0)));
        assert!(upper.is_unbounded());

        simplex.add_inequality(&int_vec(&[-1, -1]));
        let (lower, upper) = simplex.compute_integer_bounds(&int_vec(&[1, 0]));
        assert!(lower.is_empty() && upper.is_empty());
    }

    #[test]
    fn test_sample_in_thin_triangle() {
        // 3x - 2y >= 1, x <= 3, y >= 1: rational vertices are not integral.
        let mut simplex = Simplex::new(2);
        simplex.add_inequality(&int_vec(&[3, -2, -1]));
        simplex.add_inequality(&int_vec(&[-1, 0, 3]));
        simplex.add_inequality(&int_vec(&[0, 1, -1]));
        let sample = simplex.find_integer_sample().unwrap();
        let (x, y) = (&sample[0], &sample[1]);
        assert!(BigInt::from(3) * x - BigInt::from(2) * y >= BigInt::one());
        assert!(*x <= BigInt::from(3));
        assert!(*y >= BigInt::one());
        // The search leaves the region untouched.
        assert_eq!(simplex.num_constraints(), 3);
    }

    #[test]
    fn test_no_integer_point_between_bounds() {
        // 1 <= 3x <= 2
        let mut simplex = Simplex::new(1);
        simplex.add_inequality(&int_vec(&[3, -1]));
        simplex.add_inequality(&int_vec(&[-3, 2]));
        assert!(!simplex.is_empty());
        assert_eq!(simplex.find_integer_sample(), None);
    }

    #[test]
    fn test_no_integer_point_in_bounded_strip() {
        // 0 <= x <= 10, 1 <= 2y - 2x <= 1
        let mut simplex = Simplex::new(2);
        simplex.add_inequality(&int_vec(&[1, 0, 0]));
        simplex.add_inequality(&int_vec(&[-1, 0, 10]));
        simplex.add_equality(&int_vec(&[-2, 2, -1]));
        assert_eq!(simplex.find_integer_sample(), None);
    }

    #[test]
    fn test_wide_strip_without_integer_points() {
        // 0 <= x <= 10^12, 2y == 2x + 1
        let mut simplex = Simplex::new(2);
        simplex.add_inequality(&int_vec(&[1, 0, 0]));
        simplex.add_inequality(&int_vec(&[-1, 0, 1_000_000_000_000]));
        simplex.add_equality(&int_vec(&[-2, 2, -1]));
        assert_eq!(simplex.find_integer_sample(), None);
        assert_eq!(simplex.num_constraints(), 4);
    }

    #[test]
    fn test_wide_full_dimensional_strip_without_integer_points() {
        // |x|, |y| <= 10^9, 1 <= 3x - 3y <= 2
        let bound = 1_000_000_000;
        let mut simplex = Simplex::new(2);
        simplex.add_inequality(&int_vec(&[1, 0, bound]));
        simplex.add_inequality(&int_vec(&[-1, 0, bound]));
        simplex.add_inequality(&int_vec(&[0, 1, bound]));
        simplex.add_inequality(&int_vec(&[0, -1, bound]));
        simplex.add_inequality(&int_vec(&[3, -3, -1]));
        simplex.add_inequality(&int_vec(&[-3, 3, 2]));
        assert!(!simplex.is_empty());
        assert_eq!(simplex.find_integer_sample(), None);
    }

    #[test]
    fn test_sample_in_far_corner() {
        // x, y <= 10^9, x + y >= 2 * 10^9 - 1, 7x - 5y >= 0
        let bound = 1_000_000_000i64;
        let mut simplex = Simplex::new(3);
        simplex.add_inequality(&int_vec(&[-1, 0, 0, bound]));
        simplex.add_inequality(&int_vec(&[0, -1, 0, bound]));
        simplex.add_inequality(&int_vec(&[1, 1, 0, 1 - 2 * bound]));
        simplex.add_inequality(&int_vec(&[7, -5, 0, 0]));
        // 0 <= 2z - x <= 1 ties z to x.
        simplex.add_inequality(&int_vec(&[-1, 0, 2, 0]));
        simplex.add_inequality(&int_vec(&[1, 0, -2, 1]));

        let sample = simplex.find_integer_sample().unwrap();
        let (x, y, z) = (&sample[0], &sample[1], &sample[2]);
        let bound = BigInt::from(bound);
        assert!(*x <= bound && *y <= bound);
        assert!(x + y >= BigInt::from(2) * &bound - 1);
        assert!(BigInt::from(2) * z - x >= BigInt::zero());
        assert!(BigInt::from(2) * z - x <= BigInt::one());
    }

    #[test]
    fn test_zero_variable_region() {
        let mut simplex = Simplex::new(0);
        assert_eq!(simplex.find_integer_sample(), Some(Vec::new()));
        simplex.add_inequality(&int_vec(&[-1]));
        assert_eq!(simplex.find_integer_sample(), None);
    }
}
