//! Utility modules shared by the solver.
//!
//! This module contains common utilities used throughout the codebase:
//! - Error types
//! - Exact fractions
//! - Integer matrices and the Hermite normal form
//! - Source location tracking

pub mod errors;
pub mod fraction;
pub mod location;
pub mod matrix;

// Re-exports
pub use errors::*;
pub use fraction::{frac, int_vec, Fraction};
pub use location::{SourceLocation, Span};
pub use matrix::IntMatrix;
