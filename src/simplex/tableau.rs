//! Tableau core shared by the rational and lexicographic solvers.
//!
//! Every unknown (a variable or a constraint) is either *basic*, with a
//! row expressing it in terms of the non-basic unknowns, or *non-basic*,
//! owning a column. Rows are kept as exact fractions:
//!
//! - column 0 holds the constant term
//! - column 1 holds the coefficient of the big-M parameter when the
//!   lexicographic solver uses one
//! - the remaining columns hold the coefficients of non-basic unknowns
//!
//! The current sample point sets every column unknown to zero, so the
//! value of a row unknown is its constant term (plus its big-M multiple).
//!
//! Structural changes push onto an undo log. Pivots are not logged: they
//! never change the represented region, only its basis.

use crate::simplex::{Direction, Snapshot};
use crate::utils::fraction::Fraction;
use log::{debug, trace};
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TABLEAU_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Orientation {
    Row,
    Column,
}

/// Identity of an unknown. The derived order is the pivoting priority:
/// variables before constraints, each by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum UnknownId {
    Var(usize),
    Con(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Unknown {
    pub orientation: Orientation,
    pub pos: usize,
    /// Restricted unknowns must stay non-negative.
    pub restricted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UndoEntry {
    RemoveLastConstraint,
    RemoveLastVariable,
    UnmarkEmpty,
    UnmarkLastRedundant,
    ForgetRedundancyDetection,
}

#[derive(Debug, Clone)]
pub(crate) struct Tableau {
    id: u64,
    rows: Vec<Vec<Fraction>>,
    num_columns: usize,
    /// Index of the first column that belongs to an unknown.
    first_unknown_col: usize,
    uses_big_m: bool,
    row_unknown: Vec<UnknownId>,
    /// Indexed by `column - first_unknown_col`.
    col_unknown: Vec<UnknownId>,
    var: Vec<Unknown>,
    con: Vec<Unknown>,
    /// Rows `0..n_redundant` hold constraints marked redundant.
    n_redundant: usize,
    /// Set once redundancy detection has run on this state.
    redundancy_detected: bool,
    empty: bool,
    undo_log: Vec<UndoEntry>,
}

impl Tableau {
    /// A tableau over `n_var` variables and no constraints. With
    /// `uses_big_m` every variable is tracked as `x + M` and is restricted.
    pub(crate) fn new(n_var: usize, uses_big_m: bool) -> Self {
        let first_unknown_col = if uses_big_m { 2 } else { 1 };
        let mut tableau = Self {
            id: NEXT_TABLEAU_ID.fetch_add(1, Ordering::Relaxed),
            rows: Vec::new(),
            num_columns: first_unknown_col,
            first_unknown_col,
            uses_big_m,
            row_unknown: Vec::new(),
            col_unknown: Vec::new(),
            var: Vec::new(),
            con: Vec::new(),
            n_redundant: 0,
            redundancy_detected: false,
            empty: false,
            undo_log: Vec::new(),
        };
        tableau.push_variables(n_var);
        tableau
    }

    pub(crate) fn num_variables(&self) -> usize {
        self.var.len()
    }

    pub(crate) fn num_constraints(&self) -> usize {
        self.con.len()
    }

    pub(crate) fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn num_columns(&self) -> usize {
        self.num_columns
    }

    pub(crate) fn first_unknown_col(&self) -> usize {
        self.first_unknown_col
    }

    pub(crate) fn n_redundant(&self) -> usize {
        self.n_redundant
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.empty
    }

    pub(crate) fn redundancy_detected(&self) -> bool {
        self.redundancy_detected
    }

    pub(crate) fn entry(&self, row: usize, col: usize) -> &Fraction {
        &self.rows[row][col]
    }

    pub(crate) fn row(&self, row: usize) -> &[Fraction] {
        &self.rows[row]
    }

    pub(crate) fn constant(&self, row: usize) -> &Fraction {
        &self.rows[row][0]
    }

    /// Coefficient of the big-M parameter in `row`.
    pub(crate) fn big_m(&self, row: usize) -> &Fraction {
        debug_assert!(self.uses_big_m);
        &self.rows[row][1]
    }

    pub(crate) fn var(&self, index: usize) -> Unknown {
        self.var[index]
    }

    pub(crate) fn con(&self, index: usize) -> Unknown {
        self.con[index]
    }

    pub(crate) fn unknown(&self, id: UnknownId) -> Unknown {
        match id {
            UnknownId::Var(i) => self.var[i],
            UnknownId::Con(i) => self.con[i],
        }
    }

    fn unknown_mut(&mut self, id: UnknownId) -> &mut Unknown {
        match id {
            UnknownId::Var(i) => &mut self.var[i],
            UnknownId::Con(i) => &mut self.con[i],
        }
    }

    pub(crate) fn col_unknown(&self, col: usize) -> UnknownId {
        self.col_unknown[col - self.first_unknown_col]
    }

    /// Sample value of variable `index`, ignoring any big-M multiple.
    pub(crate) fn sample_value(&self, index: usize) -> Fraction {
        let unknown = self.var[index];
        match unknown.orientation {
            Orientation::Column => Fraction::zero(),
            Orientation::Row => self.rows[unknown.pos][0].clone(),
        }
    }

    /// Whether constraint `index` currently sits in the redundant block.
    pub(crate) fn is_con_marked_redundant(&self, index: usize) -> bool {
        let unknown = self.con[index];
        unknown.orientation == Orientation::Row && unknown.pos < self.n_redundant
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            owner: self.id,
            position: self.undo_log.len(),
        }
    }

    /// Undo every logged change made after `snapshot` was taken.
    pub(crate) fn rollback(&mut self, snapshot: Snapshot) {
        assert_eq!(
            snapshot.owner, self.id,
            "snapshot was taken from a different solver"
        );
        assert!(
            snapshot.position <= self.undo_log.len(),
            "snapshot refers to a state that was already rolled back"
        );
        debug!(
            "rolling back {} change(s)",
            self.undo_log.len() - snapshot.position
        );
        while self.undo_log.len() > snapshot.position {
            if let Some(entry) = self.undo_log.pop() {
                self.undo(entry);
            }
        }
    }

    fn undo(&mut self, entry: UndoEntry) {
        trace!("undo {:?}", entry);
        match entry {
            UndoEntry::RemoveLastConstraint => self.remove_last_constraint(),
            UndoEntry::RemoveLastVariable => self.remove_last_variable(),
            UndoEntry::UnmarkEmpty => self.empty = false,
            UndoEntry::UnmarkLastRedundant => self.n_redundant -= 1,
            UndoEntry::ForgetRedundancyDetection => self.redundancy_detected = false,
        }
    }

    fn push_variables(&mut self, count: usize) {
        for _ in 0..count {
            let index = self.var.len();
            self.var.push(Unknown {
                orientation: Orientation::Column,
                pos: self.num_columns,
                restricted: self.uses_big_m,
            });
            self.col_unknown.push(UnknownId::Var(index));
            self.num_columns += 1;
        }
        for row in &mut self.rows {
            row.resize(self.num_columns, Fraction::zero());
        }
    }

    /// Append `count` unconstrained variables after the existing ones.
    pub(crate) fn append_variable(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.push_variables(count);
        self.undo_log
            .extend(std::iter::repeat(UndoEntry::RemoveLastVariable).take(count));
    }

    /// Add a constraint row `coeffs[..n] . x + coeffs[n]` in terms of the
    /// current columns and return its constraint index.
    pub(crate) fn add_row(&mut self, coeffs: &[BigInt], restricted: bool) -> usize {
        let n_var = self.var.len();
        assert_eq!(
            coeffs.len(),
            n_var + 1,
            "constraint row must hold one coefficient per variable plus a constant"
        );

        let mut row = vec![Fraction::zero(); self.num_columns];
        row[0] = Fraction::from_integer(coeffs[n_var].clone());
        if self.uses_big_m {
            // x = y - M for every variable y tracked by the tableau.
            let total: BigInt = coeffs[..n_var].iter().sum();
            row[1] = Fraction::from_integer(-total);
        }
        for (index, coeff) in coeffs[..n_var].iter().enumerate() {
            if coeff.is_zero() {
                continue;
            }
            let coeff = Fraction::from_integer(coeff.clone());
            let unknown = self.var[index];
            match unknown.orientation {
                Orientation::Column => row[unknown.pos] += &coeff,
                Orientation::Row => {
                    for (out, value) in row.iter_mut().zip(&self.rows[unknown.pos]) {
                        if !value.is_zero() {
                            *out += &coeff * value;
                        }
                    }
                }
            }
        }
        self.push_row(row, restricted)
    }

    /// Add a row already expressed in terms of the current columns.
    pub(crate) fn add_raw_row(&mut self, row: Vec<Fraction>, restricted: bool) -> usize {
        assert_eq!(row.len(), self.num_columns, "raw row must span every column");
        self.push_row(row, restricted)
    }

    fn push_row(&mut self, row: Vec<Fraction>, restricted: bool) -> usize {
        let index = self.con.len();
        self.con.push(Unknown {
            orientation: Orientation::Row,
            pos: self.rows.len(),
            restricted,
        });
        self.rows.push(row);
        self.row_unknown.push(UnknownId::Con(index));
        self.undo_log.push(UndoEntry::RemoveLastConstraint);
        index
    }

    pub(crate) fn mark_empty(&mut self) {
        if self.empty {
            return;
        }
        debug!(
            "region became empty after {} constraint(s)",
            self.con.len()
        );
        self.undo_log.push(UndoEntry::UnmarkEmpty);
        self.empty = true;
    }

    /// Record that redundancy detection ran. Rolling back past this point
    /// forgets it again.
    pub(crate) fn mark_redundancy_detected(&mut self) {
        if self.redundancy_detected {
            return;
        }
        self.undo_log.push(UndoEntry::ForgetRedundancyDetection);
        self.redundancy_detected = true;
    }

    /// Move `row` into the redundant block at the top of the tableau.
    pub(crate) fn mark_row_redundant(&mut self, row: usize) {
        debug_assert!(row >= self.n_redundant, "row is already marked redundant");
        self.swap_rows(row, self.n_redundant);
        self.n_redundant += 1;
        self.undo_log.push(UndoEntry::UnmarkLastRedundant);
    }

    /// Exchange the roles of the unknowns at `pivot_row` and `pivot_col`.
    pub(crate) fn pivot(&mut self, pivot_row: usize, pivot_col: usize) {
        debug_assert!(pivot_col >= self.first_unknown_col);
        let slot = pivot_col - self.first_unknown_col;
        let leaving = self.row_unknown[pivot_row];
        let entering = self.col_unknown[slot];
        trace!("pivot {:?} out of row {}, {:?} in", leaving, pivot_row, entering);

        self.row_unknown[pivot_row] = entering;
        self.col_unknown[slot] = leaving;
        let unknown = self.unknown_mut(leaving);
        unknown.orientation = Orientation::Column;
        unknown.pos = pivot_col;
        let unknown = self.unknown_mut(entering);
        unknown.orientation = Orientation::Row;
        unknown.pos = pivot_row;

        let pivot_value = self.rows[pivot_row][pivot_col].clone();
        debug_assert!(!pivot_value.is_zero(), "pivot on a zero entry");
        let inverse = pivot_value.recip();
        let neg_inverse = -&inverse;
        for (col, value) in self.rows[pivot_row].iter_mut().enumerate() {
            if col == pivot_col {
                *value = inverse.clone();
            } else if !value.is_zero() {
                *value *= &neg_inverse;
            }
        }

        let pivot_entries = self.rows[pivot_row].clone();
        for (index, row) in self.rows.iter_mut().enumerate() {
            if index == pivot_row || row[pivot_col].is_zero() {
                continue;
            }
            let factor = row[pivot_col].clone();
            for (col, value) in row.iter_mut().enumerate() {
                if col == pivot_col {
                    *value = &factor * &pivot_entries[col];
                } else if !pivot_entries[col].is_zero() {
                    *value += &factor * &pivot_entries[col];
                }
            }
        }
    }

    /// Ratio test: the restricted, non-redundant row that first reaches
    /// zero when column `col` moves in `direction`. Ties go to the row
    /// whose unknown has the smallest identity.
    pub(crate) fn find_pivot_row(
        &self,
        skip_row: Option<usize>,
        direction: Direction,
        col: usize,
    ) -> Option<usize> {
        let mut best: Option<(usize, Fraction)> = None;
        for row in self.n_redundant..self.rows.len() {
            if Some(row) == skip_row {
                continue;
            }
            let elem = &self.rows[row][col];
            if elem.is_zero() || !self.unknown(self.row_unknown[row]).restricted {
                continue;
            }
            // Rows that move in the same direction as the column never limit it.
            if direction.agrees_with(elem) {
                continue;
            }
            let step = &self.rows[row][0] / elem.abs();
            let better = match &best {
                None => true,
                Some((best_row, best_step)) => {
                    step < *best_step
                        || (step == *best_step
                            && self.row_unknown[row] < self.row_unknown[*best_row])
                }
            };
            if better {
                best = Some((row, step));
            }
        }
        best.map(|(row, _)| row)
    }

    /// Any non-redundant row with a nonzero entry in `col`.
    fn find_any_pivot_row(&self, col: usize) -> Option<usize> {
        (self.n_redundant..self.rows.len()).find(|&row| !self.rows[row][col].is_zero())
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.rows.swap(a, b);
        self.row_unknown.swap(a, b);
        self.unknown_mut(self.row_unknown[a]).pos = a;
        self.unknown_mut(self.row_unknown[b]).pos = b;
    }

    fn swap_columns(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for row in &mut self.rows {
            row.swap(a, b);
        }
        let base = self.first_unknown_col;
        self.col_unknown.swap(a - base, b - base);
        self.unknown_mut(self.col_unknown[a - base]).pos = a;
        self.unknown_mut(self.col_unknown[b - base]).pos = b;
    }

    fn remove_last_constraint(&mut self) {
        let index = self.con.len() - 1;
        let unknown = self.con[index];
        if unknown.orientation == Orientation::Column {
            let col = unknown.pos;
            let row = self
                .find_pivot_row(None, Direction::Up, col)
                .or_else(|| self.find_pivot_row(None, Direction::Down, col))
                .or_else(|| self.find_any_pivot_row(col));
            match row {
                Some(row) => self.pivot(row, col),
                None => unreachable!("constraint column {} has no nonzero row", col),
            }
        }
        let last = self.rows.len() - 1;
        self.swap_rows(self.con[index].pos, last);
        self.rows.pop();
        self.row_unknown.pop();
        self.con.pop();
    }

    fn remove_last_variable(&mut self) {
        let index = self.var.len() - 1;
        let unknown = self.var[index];
        if unknown.orientation == Orientation::Row {
            let row = unknown.pos;
            let col = (self.first_unknown_col..self.num_columns)
                .find(|&col| !self.rows[row][col].is_zero());
            match col {
                Some(col) => self.pivot(row, col),
                None => unreachable!("variable row {} has no nonzero column", row),
            }
        }
        let last = self.num_columns - 1;
        self.swap_columns(self.var[index].pos, last);
        for row in &mut self.rows {
            row.pop();
        }
        self.num_columns -= 1;
        self.col_unknown.pop();
        self.var.pop();
    }
}

/// The two inequalities `f - d*q >= 0` and `-f + d*q + d - 1 >= 0` that
/// pin a new trailing variable `q` to `floor(f / d)`, where `f` is
/// `coeffs` over the existing variables.
pub(crate) fn division_inequalities(
    coeffs: &[BigInt],
    denom: &BigInt,
) -> (Vec<BigInt>, Vec<BigInt>) {
    assert!(denom.is_positive(), "division denominator must be positive");
    let n = coeffs.len() - 1;
    let mut lower = coeffs[..n].to_vec();
    lower.push(-denom);
    lower.push(coeffs[n].clone());
    let mut upper: Vec<BigInt> = lower.iter().map(|c| -c).collect();
    upper[n + 1] += denom - BigInt::one();
    (lower, upper)
}
