//! Constraint systems over integer variables.
//!
//! This module provides the data the solvers consume:
//! - Spaces, affine expressions and constraints
//! - Integer relations and polyhedra
//! - Unimodular coordinate transforms
//! - Operations on polyhedra

pub mod constraint;
pub mod expr;
pub mod operations;
pub mod relation;
pub mod space;
pub mod transform;

pub use constraint::{Constraint, ConstraintKind};
pub use expr::AffineExpr;
pub use relation::{IntegerPolyhedron, IntegerRelation};
pub use space::{Space, VarKind};
pub use transform::LinearTransform;
