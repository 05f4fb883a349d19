//! # presburger - exact simplex for integer sets
//!
//! An incremental simplex engine over arbitrary-precision rationals for
//! reasoning about sets of integer points described by affine
//! constraints:
//! - Rational feasibility, optima and inequality classification
//! - Redundant constraint detection
//! - Integer sample search, including unbounded sets
//! - Lexicographic minima, rational and integer
//! - Unimodular coordinate transforms through the Hermite normal form
//!
//! Every mutation can be undone by rolling back to a snapshot.
//!
//! ## Example
//!
//! ```rust
//! use presburger::prelude::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let set = presburger::parse_polyhedron("(x, y) : (x == y - 2, x + y == 2)")?;
//! assert_eq!(set.find_integer_sample(), Some(vec![0.into(), 2.into()]));
//!
//! let mut simplex = Simplex::from_relation(&set);
//! let snapshot = simplex.get_snapshot();
//! simplex.add_inequality(&int_vec(&[1, 0, -1])); // x >= 1
//! assert!(simplex.is_empty());
//! simplex.rollback(snapshot);
//! assert!(!simplex.is_empty());
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod frontend;
pub mod polyhedral;
pub mod simplex;
pub mod utils;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::frontend::parse_polyhedron;
    pub use crate::polyhedral::{
        AffineExpr, Constraint, ConstraintKind, IntegerPolyhedron, IntegerRelation,
        LinearTransform, Space,
    };
    pub use crate::simplex::{Direction, IneqType, LexSimplex, MaybeOptimum, Simplex, Snapshot};
    pub use crate::utils::errors::*;
    pub use crate::utils::fraction::{frac, int_vec, Fraction};
    pub use crate::utils::matrix::IntMatrix;
}

use anyhow::{Context, Result};

/// Main entry point for reading a constraint system from text.
pub fn parse_polyhedron(source: &str) -> Result<polyhedral::IntegerPolyhedron> {
    frontend::parse_polyhedron(source)
        .with_context(|| format!("failed to parse constraint system `{}`", source.trim()))
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_parse_error_context() {
        let err = parse_polyhedron("(x) : (x >= y)").unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
        assert!(err.root_cause().to_string().contains("Unknown variable"));
    }
}
