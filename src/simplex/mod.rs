//! Incremental simplex solvers over exact rationals.
//!
//! This module provides:
//! - [`Simplex`]: rational feasibility, optima, inequality classification,
//!   redundancy detection and integer sample search
//! - [`LexSimplex`]: lexicographic minima, rational and integer
//!
//! Both share a tableau core (see `tableau`) that records every structural
//! change in an undo log, so callers can take a [`Snapshot`] and later
//! [`rollback`](Simplex::rollback) to it exactly.

mod basis;
mod lex;
mod rational;
mod redundancy;
mod sample;
mod tableau;

pub use lex::LexSimplex;
pub use rational::Simplex;

use crate::utils::fraction::Fraction;
use num_traits::Signed;
use std::fmt;

/// Direction of an optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Maximize
    Up,
    /// Minimize
    Down,
}

impl Direction {
    /// The opposite direction.
    pub fn flipped(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Whether moving a column with coefficient `value` upwards moves the
    /// row in this direction.
    pub(crate) fn agrees_with(self, value: &Fraction) -> bool {
        match self {
            Direction::Up => value.is_positive(),
            Direction::Down => value.is_negative(),
        }
    }
}

/// Outcome of an optimization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MaybeOptimum<T> {
    /// The region is empty
    Empty,
    /// The objective is unbounded in the requested direction
    Unbounded,
    /// The optimum exists and is attained
    Bounded(T),
}

impl<T> MaybeOptimum<T> {
    /// Whether the region was empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, MaybeOptimum::Empty)
    }

    /// Whether the optimum is unbounded.
    pub fn is_unbounded(&self) -> bool {
        matches!(self, MaybeOptimum::Unbounded)
    }

    /// Whether an optimum was found.
    pub fn is_bounded(&self) -> bool {
        matches!(self, MaybeOptimum::Bounded(_))
    }

    /// Borrow the optimum if there is one.
    pub fn bounded(&self) -> Option<&T> {
        match self {
            MaybeOptimum::Bounded(value) => Some(value),
            _ => None,
        }
    }

    /// Take the optimum if there is one.
    pub fn into_bounded(self) -> Option<T> {
        match self {
            MaybeOptimum::Bounded(value) => Some(value),
            _ => None,
        }
    }

    /// Transform a bounded optimum, keeping `Empty` and `Unbounded`.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> MaybeOptimum<U> {
        match self {
            MaybeOptimum::Empty => MaybeOptimum::Empty,
            MaybeOptimum::Unbounded => MaybeOptimum::Unbounded,
            MaybeOptimum::Bounded(value) => MaybeOptimum::Bounded(f(value)),
        }
    }
}

impl<T: fmt::Display> fmt::Display for MaybeOptimum<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaybeOptimum::Empty => write!(f, "empty"),
            MaybeOptimum::Unbounded => write!(f, "unbounded"),
            MaybeOptimum::Bounded(value) => write!(f, "{}", value),
        }
    }
}

/// How an inequality relates to the current region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IneqType {
    /// Satisfied by every point of the region
    Redundant,
    /// Satisfied by some points and violated by others
    Cut,
    /// Violated by every point of the region
    Separate,
}

/// Opaque token naming a point in a solver's history.
///
/// Only valid for the solver that produced it, and only until that solver
/// is rolled back to an earlier point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Snapshot {
    owner: u64,
    position: usize,
}
