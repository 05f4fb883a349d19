//! Spaces describe the variables a constraint system ranges over.
//!
//! Variables are laid out in a fixed order:
//! - Domain variables (relations only)
//! - Range variables, the dimensions of a set
//! - Symbols (parameters that are fixed but unknown)

use serde::{Deserialize, Serialize};
use std::fmt;

/// The role of a variable in a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarKind {
    /// Input variable of a relation
    Domain,
    /// Set dimension or output variable of a relation
    Range,
    /// Symbolic parameter
    Symbol,
}

/// Dimensionality and naming of a constraint system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Space {
    /// Number of domain variables (relations only)
    pub n_in: usize,
    /// Number of range variables
    pub n_dim: usize,
    /// Number of symbols
    pub n_param: usize,
    /// Names of range variables (optional)
    pub dim_names: Vec<String>,
    /// Names of symbols (optional)
    pub param_names: Vec<String>,
}

impl Space {
    /// Create a set space with the given dimensions.
    pub fn set(n_dim: usize) -> Self {
        Self::set_with_params(n_dim, 0)
    }

    /// Create a set space with symbols.
    pub fn set_with_params(n_dim: usize, n_param: usize) -> Self {
        Self {
            n_in: 0,
            n_dim,
            n_param,
            dim_names: Vec::new(),
            param_names: Vec::new(),
        }
    }

    /// Create a relation space.
    pub fn relation(n_in: usize, n_out: usize) -> Self {
        Self {
            n_in,
            ..Self::set(n_out)
        }
    }

    /// Check if this is a set space (no domain variables).
    pub fn is_set(&self) -> bool {
        self.n_in == 0
    }

    /// Total number of variables of every kind.
    pub fn num_vars(&self) -> usize {
        self.n_in + self.n_dim + self.n_param
    }

    /// Set range variable names.
    pub fn with_dim_names(mut self, names: Vec<String>) -> Self {
        self.dim_names = names;
        self
    }

    /// Set symbol names.
    pub fn with_param_names(mut self, names: Vec<String>) -> Self {
        self.param_names = names;
        self
    }

    /// Get the name of a range variable.
    pub fn dim_name(&self, idx: usize) -> Option<&str> {
        self.dim_names.get(idx).map(String::as_str)
    }

    /// Get the name of a symbol.
    pub fn param_name(&self, idx: usize) -> Option<&str> {
        self.param_names.get(idx).map(String::as_str)
    }

    /// Role of the variable at `index` in the flat variable order.
    pub fn var_kind(&self, index: usize) -> VarKind {
        assert!(index < self.num_vars(), "variable index out of range");
        if index < self.n_in {
            VarKind::Domain
        } else if index < self.n_in + self.n_dim {
            VarKind::Range
        } else {
            VarKind::Symbol
        }
    }

    /// Display name of the variable at `index`, with generated defaults.
    pub fn var_name(&self, index: usize) -> String {
        match self.var_kind(index) {
            VarKind::Domain => format!("i{}", index),
            VarKind::Range => {
                let pos = index - self.n_in;
                self.dim_name(pos)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("d{}", pos))
            }
            VarKind::Symbol => {
                let pos = index - self.n_in - self.n_dim;
                self.param_name(pos)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("p{}", pos))
            }
        }
    }

    /// Drop the variables in `start..end`, shrinking each kind by its
    /// overlap with the range.
    pub fn remove_var_range(&mut self, start: usize, end: usize) {
        assert!(start <= end && end <= self.num_vars(), "invalid variable range");
        let overlap = |lo: usize, hi: usize| (start.max(lo), end.min(hi));

        let (in_lo, in_hi) = overlap(0, self.n_in);
        let (dim_lo, dim_hi) = overlap(self.n_in, self.n_in + self.n_dim);
        let (param_lo, param_hi) = overlap(self.n_in + self.n_dim, self.num_vars());

        let dim_base = self.n_in;
        let param_base = self.n_in + self.n_dim;
        if dim_lo < dim_hi {
            drain_names(&mut self.dim_names, dim_lo - dim_base, dim_hi - dim_base);
            self.n_dim -= dim_hi - dim_lo;
        }
        if param_lo < param_hi {
            drain_names(&mut self.param_names, param_lo - param_base, param_hi - param_base);
            self.n_param -= param_hi - param_lo;
        }
        if in_lo < in_hi {
            self.n_in -= in_hi - in_lo;
        }
    }
}

fn drain_names(names: &mut Vec<String>, start: usize, end: usize) {
    let end = end.min(names.len());
    if start < end {
        names.drain(start..end);
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_set() {
            write!(f, "[{}]", self.n_dim)?;
        } else {
            write!(f, "[{}] -> [{}]", self.n_in, self.n_dim)?;
        }
        if self.n_param > 0 {
            write!(f, " : {} params", self.n_param)?;
        }
        Ok(())
    }
}
