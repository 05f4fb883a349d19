//! Redundancy detection.
//!
//! A constraint is redundant when the other (unmarked) constraints already
//! imply it. Marked rows move to a block at the top of the tableau that
//! pivot selection never touches, which is what lets later checks treat
//! them as removed.

use crate::simplex::tableau::Orientation;
use crate::simplex::{Direction, MaybeOptimum, Simplex};
use log::debug;
use num_traits::Signed;

impl Simplex {
    /// Mark every constraint that the remaining ones imply.
    ///
    /// Constraints are visited newest first on purpose. Among equivalent
    /// constraints the earliest one is kept, so a relation simplified by
    /// dropping marked rows keeps the constraints as they were first written.
    pub fn detect_redundant(&mut self) {
        let count = self.num_constraints();
        self.detect_redundant_range(0, count);
    }

    /// Mark redundant constraints among `offset..offset + count`.
    ///
    /// Constraints are visited newest first: of two identical constraints
    /// the later one is marked and the earlier one is kept. Each check sees
    /// the constraints marked so far as removed. An empty region marks
    /// nothing.
    pub fn detect_redundant_range(&mut self, offset: usize, count: usize) {
        assert!(
            offset + count <= self.num_constraints(),
            "constraint range out of bounds"
        );
        self.tableau.mark_redundancy_detected();
        if self.is_empty() {
            return;
        }

        for index in (offset..offset + count).rev() {
            if self.tableau.is_con_marked_redundant(index) {
                continue;
            }
            let unknown = self.tableau.con(index);
            if unknown.orientation == Orientation::Column {
                // A column that can decrease without hitting another row can
                // go negative, so the constraint is not implied.
                match self
                    .tableau
                    .find_pivot_row(None, Direction::Down, unknown.pos)
                {
                    Some(row) => self.tableau.pivot(row, unknown.pos),
                    None => continue,
                }
            }

            let row = self.tableau.con(index).pos;
            match self.compute_row_optimum(Direction::Down, row) {
                MaybeOptimum::Bounded(minimum) if !minimum.is_negative() => {
                    debug!("constraint {} is redundant (minimum {})", index, minimum);
                    let row = self.tableau.con(index).pos;
                    self.tableau.mark_row_redundant(row);
                }
                _ => {
                    let restored = self.restore_row(index);
                    debug_assert!(restored, "a satisfiable constraint must be restorable");
                }
            }
        }
    }

    /// Whether constraint `index` was marked by the last redundancy
    /// detection. Marks go stale once more constraints are added.
    ///
    /// Panics if redundancy detection never ran.
    pub fn is_marked_redundant(&self, index: usize) -> bool {
        assert!(
            self.tableau.redundancy_detected(),
            "redundancy detection must run before querying marks"
        );
        assert!(index < self.num_constraints(), "constraint index out of range");
        self.tableau.is_con_marked_redundant(index)
    }
}
