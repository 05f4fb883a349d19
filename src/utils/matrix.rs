//! Integer matrices for constraint systems and unimodular transforms.
//!
//! Constraint systems store one row per constraint with one column per
//! variable followed by the constant term. The same type carries the
//! unimodular matrices produced by the Hermite normal form.

use crate::utils::fraction::Fraction;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// A dense matrix of arbitrary precision integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntMatrix {
    data: Vec<Vec<BigInt>>,
    cols: usize,
}

impl IntMatrix {
    /// Create a new matrix with the given dimensions, initialized to zero.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![vec![BigInt::zero(); cols]; rows],
            cols,
        }
    }

    /// Create an identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut mat = Self::zeros(n, n);
        for i in 0..n {
            mat.data[i][i] = BigInt::one();
        }
        mat
    }

    /// Create a matrix from rows of machine integers.
    ///
    /// Panics if the rows have different lengths.
    pub fn from_vec(data: Vec<Vec<i64>>) -> Self {
        let cols = data.first().map_or(0, Vec::len);
        let rows = data
            .into_iter()
            .map(|row| row.into_iter().map(BigInt::from).collect())
            .collect();
        Self::from_rows(rows, cols)
    }

    /// Create a matrix from rows that each hold `cols` entries.
    pub fn from_rows(rows: Vec<Vec<BigInt>>, cols: usize) -> Self {
        assert!(
            rows.iter().all(|row| row.len() == cols),
            "every row must have {} entries",
            cols
        );
        Self { data: rows, cols }
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.data.len()
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.cols
    }

    /// Borrow a row.
    pub fn row(&self, row: usize) -> &[BigInt] {
        &self.data[row]
    }

    /// Borrow a row mutably.
    pub fn row_mut(&mut self, row: usize) -> &mut [BigInt] {
        &mut self.data[row]
    }

    /// Iterate over the rows.
    pub fn rows(&self) -> impl Iterator<Item = &[BigInt]> + '_ {
        self.data.iter().map(Vec::as_slice)
    }

    /// Copy out a column.
    pub fn column(&self, col: usize) -> Vec<BigInt> {
        self.data.iter().map(|row| row[col].clone()).collect()
    }

    /// Append a row.
    pub fn add_row(&mut self, row: Vec<BigInt>) {
        assert_eq!(row.len(), self.cols, "row length must match the column count");
        self.data.push(row);
    }

    /// Remove a row, shifting later rows up.
    pub fn remove_row(&mut self, row: usize) {
        self.data.remove(row);
    }

    /// Keep only the rows for which `keep` returns true.
    pub fn retain_rows(&mut self, mut keep: impl FnMut(&[BigInt]) -> bool) {
        self.data.retain(|row| keep(row));
    }

    /// Remove the columns in `start..end`.
    pub fn remove_columns(&mut self, start: usize, end: usize) {
        assert!(start <= end && end <= self.cols, "invalid column range");
        for row in &mut self.data {
            row.drain(start..end);
        }
        self.cols -= end - start;
    }

    /// Insert `count` zero columns before column `pos`.
    pub fn insert_columns(&mut self, pos: usize, count: usize) {
        assert!(pos <= self.cols, "column position out of range");
        for row in &mut self.data {
            row.splice(pos..pos, std::iter::repeat(BigInt::zero()).take(count));
        }
        self.cols += count;
    }

    /// Swap two rows.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        self.data.swap(a, b);
    }

    /// `row[dst] += scale * row[src]`.
    pub fn add_to_row(&mut self, src: usize, dst: usize, scale: &BigInt) {
        if scale.is_zero() {
            return;
        }
        for col in 0..self.cols {
            let delta = scale * &self.data[src][col];
            self.data[dst][col] += delta;
        }
    }

    /// Swap two columns.
    pub fn swap_columns(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for row in &mut self.data {
            row.swap(a, b);
        }
    }

    /// Negate every entry of a column.
    pub fn negate_column(&mut self, col: usize) {
        for row in &mut self.data {
            row[col] = -&row[col];
        }
    }

    /// `column[dst] += scale * column[src]`.
    pub fn add_to_column(&mut self, src: usize, dst: usize, scale: &BigInt) {
        if scale.is_zero() {
            return;
        }
        for row in &mut self.data {
            let delta = scale * &row[src];
            row[dst] += delta;
        }
    }

    /// Replace columns `a` and `b` by `(s*a + t*b, p*a + q*b)`.
    fn combine_columns(
        &mut self,
        a: usize,
        b: usize,
        (s, t): (&BigInt, &BigInt),
        (p, q): (&BigInt, &BigInt),
    ) {
        for row in &mut self.data {
            let (x, y) = (row[a].clone(), row[b].clone());
            row[a] = s * &x + t * &y;
            row[b] = p * &x + q * &y;
        }
    }

    /// Matrix multiplication.
    pub fn mul(&self, other: &Self) -> Option<Self> {
        if self.cols != other.num_rows() {
            return None;
        }
        let mut result = Self::zeros(self.num_rows(), other.cols);
        for (i, row) in self.data.iter().enumerate() {
            for j in 0..other.cols {
                result.data[i][j] = row
                    .iter()
                    .zip(&other.data)
                    .map(|(a, other_row)| a * &other_row[j])
                    .sum();
            }
        }
        Some(result)
    }

    /// Row vector times matrix: `row^T * self`.
    pub fn pre_multiply_with_row(&self, row: &[BigInt]) -> Vec<BigInt> {
        assert_eq!(row.len(), self.num_rows(), "row length must match the row count");
        let mut result = vec![BigInt::zero(); self.cols];
        for (scale, mat_row) in row.iter().zip(&self.data) {
            if scale.is_zero() {
                continue;
            }
            for (out, value) in result.iter_mut().zip(mat_row) {
                *out += scale * value;
            }
        }
        result
    }

    /// Matrix times column vector: `self * col`.
    pub fn post_multiply_with_column(&self, col: &[BigInt]) -> Vec<BigInt> {
        assert_eq!(col.len(), self.cols, "column length must match the column count");
        self.data
            .iter()
            .map(|row| row.iter().zip(col).map(|(a, b)| a * b).sum())
            .collect()
    }

    /// Compute the determinant of a square matrix.
    pub fn determinant(&self) -> Option<BigInt> {
        if self.num_rows() != self.cols {
            return None;
        }
        let n = self.cols;
        let mut lu: Vec<Vec<Fraction>> = self
            .data
            .iter()
            .map(|row| row.iter().cloned().map(Fraction::from_integer).collect())
            .collect();
        let mut det = Fraction::one();

        for k in 0..n {
            let Some(pivot) = (k..n).find(|&i| !lu[i][k].is_zero()) else {
                return Some(BigInt::zero());
            };
            if pivot != k {
                lu.swap(k, pivot);
                det = -det;
            }
            det *= &lu[k][k];
            let pivot_row = lu[k].clone();
            for row in lu.iter_mut().skip(k + 1) {
                if row[k].is_zero() {
                    continue;
                }
                let factor = &row[k] / &pivot_row[k];
                for j in k..n {
                    row[j] -= &factor * &pivot_row[j];
                }
            }
        }

        Some(det.to_integer())
    }

    /// Check if the matrix is unimodular (determinant is +1 or -1).
    pub fn is_unimodular(&self) -> bool {
        self.determinant().map_or(false, |det| det.abs().is_one())
    }

    /// Column-style Hermite normal form.
    ///
    /// Returns `(h, u)` with `h = self * u`, `u` unimodular and `h` lower
    /// triangular in column echelon form: each pivot is positive, the
    /// entries left of a pivot lie in `[0, pivot)`, and zero columns come
    /// last.
    pub fn hermite_normal_form(&self) -> (Self, Self) {
        let mut h = self.clone();
        let mut u = Self::identity(self.cols);

        let mut echelon_col = 0;
        for row in 0..h.num_rows() {
            if echelon_col == h.cols {
                break;
            }

            // Collect the gcd of the row tail into the echelon column.
            for col in (echelon_col + 1)..h.cols {
                if h.data[row][col].is_zero() {
                    continue;
                }
                let a = h.data[row][echelon_col].clone();
                let b = h.data[row][col].clone();
                let (g, s, t) = extended_gcd(&a, &b);
                let (a_g, neg_b_g) = (&a / &g, -(&b / &g));
                let keep = (&s, &t);
                let cancel = (&neg_b_g, &a_g);
                h.combine_columns(echelon_col, col, keep, cancel);
                u.combine_columns(echelon_col, col, keep, cancel);
            }

            if h.data[row][echelon_col].is_zero() {
                continue;
            }
            if h.data[row][echelon_col].is_negative() {
                h.negate_column(echelon_col);
                u.negate_column(echelon_col);
            }

            let pivot = h.data[row][echelon_col].clone();
            for col in 0..echelon_col {
                let quotient = -h.data[row][col].div_floor(&pivot);
                h.add_to_column(echelon_col, col, &quotient);
                u.add_to_column(echelon_col, col, &quotient);
            }

            echelon_col += 1;
        }

        (h, u)
    }
}

impl Index<(usize, usize)> for IntMatrix {
    type Output = BigInt;

    fn index(&self, (row, col): (usize, usize)) -> &BigInt {
        &self.data[row][col]
    }
}

impl IndexMut<(usize, usize)> for IntMatrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut BigInt {
        &mut self.data[row][col]
    }
}

impl fmt::Display for IntMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[")?;
        for row in &self.data {
            write!(f, "  [")?;
            for (j, val) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", val)?;
            }
            writeln!(f, "]")?;
        }
        write!(f, "]")
    }
}

/// Compute the GCD of a vector of integers (zero for an all-zero vector).
pub fn vector_gcd(v: &[BigInt]) -> BigInt {
    v.iter().fold(BigInt::zero(), |acc, x| acc.gcd(x))
}

/// Extended Euclidean algorithm: returns `(g, x, y)` with `a*x + b*y = g`
/// and `g >= 0`.
pub fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    if b.is_zero() {
        (a.abs(), a.signum(), BigInt::zero())
    } else {
        let (g, x, y) = extended_gcd(b, &(a % b));
        let next = x - (a / b) * &y;
        (g, y, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fraction::int_vec;

    fn is_column_echelon(h: &IntMatrix) -> bool {
        let mut last_pivot_row: Option<usize> = None;
        for col in 0..h.num_columns() {
            let first_nonzero = (0..h.num_rows()).find(|&r| !h[(r, col)].is_zero());
            match (first_nonzero, last_pivot_row) {
                (None, _) => {
                    // Zero columns must all come last.
                    if (col..h.num_columns()).any(|c| (0..h.num_rows()).any(|r| !h[(r, c)].is_zero())) {
                        return false;
                    }
                    return true;
                }
                (Some(row), Some(prev)) if row <= prev => return false,
                (Some(row), _) => {
                    if !h[(row, col)].is_positive() {
                        return false;
                    }
                    for left in 0..col {
                        let v = &h[(row, left)];
                        if v.is_negative() || v >= &h[(row, col)] {
                            return false;
                        }
                    }
                    last_pivot_row = Some(row);
                }
            }
        }
        true
    }

    #[test]
    fn test_matrix_creation() {
        let m = IntMatrix::from_vec(vec![vec![1, 2, 3], vec![4, 5, 6]]);
        assert_eq!(m.num_rows(), 2);
        assert_eq!(m.num_columns(), 3);
        assert_eq!(m[(1, 2)], BigInt::from(6));
    }

    #[test]
    fn test_matrix_multiply() {
        let a = IntMatrix::from_vec(vec![vec![1, 2], vec![3, 4]]);
        let b = IntMatrix::from_vec(vec![vec![5, 6], vec![7, 8]]);
        let c = a.mul(&b).unwrap();
        assert_eq!(c, IntMatrix::from_vec(vec![vec![19, 22], vec![43, 50]]));
        assert!(a.mul(&IntMatrix::zeros(3, 1)).is_none());
    }

    #[test]
    fn test_row_and_column_products() {
        let m = IntMatrix::from_vec(vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(m.pre_multiply_with_row(&int_vec(&[1, 1])), int_vec(&[4, 6]));
        assert_eq!(m.post_multiply_with_column(&int_vec(&[1, 1])), int_vec(&[3, 7]));
    }

    #[test]
    fn test_determinant() {
        let m = IntMatrix::from_vec(vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(m.determinant(), Some(BigInt::from(-2)));
        let singular = IntMatrix::from_vec(vec![vec![1, 2, 3], vec![2, 4, 6], vec![0, 1, 1]]);
        assert_eq!(singular.determinant(), Some(BigInt::zero()));
        assert_eq!(IntMatrix::zeros(2, 3).determinant(), None);
    }

    #[test]
    fn test_unimodular() {
        let m = IntMatrix::from_vec(vec![vec![1, 1], vec![0, 1]]);
        assert!(m.is_unimodular());
        assert!(!IntMatrix::from_vec(vec![vec![2, 0], vec![0, 1]]).is_unimodular());
    }

    #[test]
    fn test_extended_gcd() {
        for (a, b) in [(12, 8), (0, 5), (0, -5), (-7, 3), (9, 0), (17, -4)] {
            let (a, b) = (BigInt::from(a), BigInt::from(b));
            let (g, x, y) = extended_gcd(&a, &b);
            assert_eq!(&a * &x + &b * &y, g);
            assert_eq!(g, a.gcd(&b));
        }
    }

    #[test]
    fn test_column_manipulation() {
        let mut m = IntMatrix::from_vec(vec![vec![1, 2, 3], vec![4, 5, 6]]);
        m.remove_columns(0, 1);
        assert_eq!(m, IntMatrix::from_vec(vec![vec![2, 3], vec![5, 6]]));
        m.insert_columns(1, 2);
        assert_eq!(m, IntMatrix::from_vec(vec![vec![2, 0, 0, 3], vec![5, 0, 0, 6]]));
        m.swap_columns(0, 3);
        m.negate_column(0);
        assert_eq!(m.row(0), int_vec(&[-3, 0, 0, 2]).as_slice());
    }

    #[test]
    fn test_row_operations_keep_unimodularity() {
        let mut m = IntMatrix::identity(2);
        m.add_to_row(0, 1, &BigInt::from(-3));
        assert_eq!(m, IntMatrix::from_vec(vec![vec![1, 0], vec![-3, 1]]));
        m.swap_rows(0, 1);
        assert_eq!(m.row(0), int_vec(&[-3, 1]).as_slice());
        assert!(m.is_unimodular());
    }

    #[test]
    fn test_hermite_normal_form_full_rank() {
        let m = IntMatrix::from_vec(vec![vec![2, 3, 6], vec![5, 1, 0], vec![8, 0, 1]]);
        let (h, u) = m.hermite_normal_form();
        assert_eq!(m.mul(&u).unwrap(), h);
        assert!(u.is_unimodular());
        assert!(is_column_echelon(&h));
    }

    #[test]
    fn test_hermite_normal_form_rank_deficient() {
        let m = IntMatrix::from_vec(vec![vec![1, 2, 3], vec![2, 4, 6]]);
        let (h, u) = m.hermite_normal_form();
        assert_eq!(m.mul(&u).unwrap(), h);
        assert!(u.is_unimodular());
        assert!(is_column_echelon(&h));
        assert!(h.column(1).iter().all(Zero::is_zero));
        assert!(h.column(2).iter().all(Zero::is_zero));
        assert_eq!(h[(0, 0)], BigInt::from(1));
    }

    #[test]
    fn test_hermite_normal_form_of_empty_matrix() {
        let m = IntMatrix::zeros(0, 3);
        let (h, u) = m.hermite_normal_form();
        assert_eq!(h.num_rows(), 0);
        assert_eq!(u, IntMatrix::identity(3));
    }
}
