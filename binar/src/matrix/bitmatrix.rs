use crate::{BitVec, Bitwise, BitwiseMut, BitwisePair, BitwisePairMut};
use std::fmt::{Debug, Display, Formatter};
use std::ops::{Index, Mul, Range};

/// A row-major matrix over GF(2).
///
/// Rows are [`BitVec`]s of length [`BitMatrix::column_count`]. The matrix is the collaborator
/// used for every null-space and rank computation in the workspace.
///
/// # Example
///
/// ```
/// use binar::{BitMatrix, Bitwise};
///
/// let matrix = BitMatrix::from_iter(
///     vec![
///         vec![true, true, false],
///         vec![false, true, true],
///     ],
///     3,
/// );
/// assert_eq!(matrix.rank(), 2);
/// let kernel = matrix.kernel();
/// assert_eq!(kernel.row_count(), 1);
/// assert_eq!(kernel.row(0).weight(), 3);
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct BitMatrix {
    rows: Vec<BitVec>,
    column_count: usize,
}

/// Elementary row operation performed during echelonization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowOperation {
    Swap(usize, usize),
    Add { to: usize, from: usize },
}

static TRUE: bool = true;
static FALSE: bool = false;

impl BitMatrix {
    #[must_use]
    pub fn zeros(row_count: usize, column_count: usize) -> BitMatrix {
        BitMatrix {
            rows: vec![BitVec::zeros(column_count); row_count],
            column_count,
        }
    }

    #[must_use]
    pub fn identity(dimension: usize) -> BitMatrix {
        let mut matrix = BitMatrix::zeros(dimension, dimension);
        for index in 0..dimension {
            matrix.set((index, index), true);
        }
        matrix
    }

    /// Builds a matrix from its rows.
    ///
    /// # Panics
    ///
    /// Panics if a row does not have `column_count` bits.
    #[must_use]
    pub fn from_row_iter(rows: impl IntoIterator<Item = BitVec>, column_count: usize) -> BitMatrix {
        let rows: Vec<BitVec> = rows.into_iter().collect();
        for row in &rows {
            assert_eq!(row.len(), column_count, "row length does not match column count");
        }
        BitMatrix { rows, column_count }
    }

    /// Builds a matrix from rows of booleans.
    ///
    /// # Panics
    ///
    /// Panics if a row does not have `column_count` entries.
    #[must_use]
    pub fn from_iter<Row>(rows: impl IntoIterator<Item = Row>, column_count: usize) -> BitMatrix
    where
        Row: IntoIterator<Item = bool>,
    {
        BitMatrix::from_row_iter(rows.into_iter().map(|row| row.into_iter().collect()), column_count)
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count)
    }

    #[must_use]
    pub fn get(&self, (row, column): (usize, usize)) -> bool {
        self.rows[row].index(column)
    }

    pub fn set(&mut self, (row, column): (usize, usize), to: bool) {
        self.rows[row].assign_index(column, to);
    }

    pub fn negate(&mut self, (row, column): (usize, usize)) {
        self.rows[row].negate_index(column);
    }

    #[must_use]
    pub fn row(&self, index: usize) -> &BitVec {
        &self.rows[index]
    }

    pub fn row_mut(&mut self, index: usize) -> &mut BitVec {
        &mut self.rows[index]
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = &BitVec> {
        self.rows.iter()
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<BitVec> {
        self.rows
    }

    /// # Panics
    ///
    /// Panics if the row does not have [`BitMatrix::column_count`] bits.
    pub fn push_row(&mut self, row: BitVec) {
        assert_eq!(row.len(), self.column_count, "row length does not match column count");
        self.rows.push(row);
    }

    pub fn swap_rows(&mut self, first: usize, second: usize) {
        self.rows.swap(first, second);
    }

    /// Adds row `from` onto row `to`.
    pub fn add_into_row(&mut self, to: usize, from: usize) {
        if to == from {
            self.rows[to].clear_bits();
            return;
        }
        let source = self.rows[from].clone();
        self.rows[to].bitxor_assign(&source);
    }

    #[must_use]
    pub fn column(&self, index: usize) -> BitVec {
        self.rows.iter().map(|row| row.index(index)).collect()
    }

    #[must_use]
    pub fn transposed(&self) -> BitMatrix {
        let mut transposed = BitMatrix::zeros(self.column_count, self.row_count());
        for (row_index, row) in self.rows.iter().enumerate() {
            for column_index in row.support() {
                transposed.set((column_index, row_index), true);
            }
        }
        transposed
    }

    /// The rows in `rows` restricted to the columns in `columns`.
    #[must_use]
    pub fn submatrix(&self, rows: Range<usize>, columns: Range<usize>) -> BitMatrix {
        let column_count = columns.len();
        BitMatrix {
            rows: self.rows[rows].iter().map(|row| row.extract(columns.clone())).collect(),
            column_count,
        }
    }

    /// Keeps only the given columns, in the given order.
    #[must_use]
    pub fn selected_columns(&self, columns: &[usize]) -> BitMatrix {
        BitMatrix {
            rows: self.rows.iter().map(|row| row.selected(columns)).collect(),
            column_count: columns.len(),
        }
    }

    /// Keeps only the given rows, in the given order.
    #[must_use]
    pub fn selected_rows(&self, rows: &[usize]) -> BitMatrix {
        BitMatrix {
            rows: rows.iter().map(|index| self.rows[*index].clone()).collect(),
            column_count: self.column_count,
        }
    }

    /// `self` on top of `other`.
    ///
    /// # Panics
    ///
    /// Panics if the column counts differ.
    #[must_use]
    pub fn row_stacked(&self, other: &BitMatrix) -> BitMatrix {
        assert_eq!(self.column_count, other.column_count, "column counts must agree");
        BitMatrix {
            rows: self.rows.iter().chain(&other.rows).cloned().collect(),
            column_count: self.column_count,
        }
    }

    /// `self` to the left of `other`.
    ///
    /// # Panics
    ///
    /// Panics if the row counts differ.
    #[must_use]
    pub fn column_stacked(&self, other: &BitMatrix) -> BitMatrix {
        assert_eq!(self.row_count(), other.row_count(), "row counts must agree");
        BitMatrix {
            rows: self.rows.iter().zip(&other.rows).map(|(left, right)| left.concat(right)).collect(),
            column_count: self.column_count + other.column_count,
        }
    }

    /// Reduces the matrix to reduced row echelon form in place and returns the pivot columns.
    ///
    /// Row `k` of the result has its leading one in column `pivots[k]`, all other rows are zero in
    /// that column, and the rows past `pivots.len()` are zero.
    ///
    /// # Example
    ///
    /// ```
    /// use binar::BitMatrix;
    ///
    /// let mut m = BitMatrix::from_iter(
    ///     vec![
    ///         vec![true, false, true],
    ///         vec![true, false, false],
    ///     ],
    ///     3,
    /// );
    /// let pivots = m.echelonize();
    /// assert_eq!(pivots, vec![0, 2]);
    /// ```
    pub fn echelonize(&mut self) -> Vec<usize> {
        self.echelonize_tracked(|_| {})
    }

    /// Reduced row echelon form reporting every elementary row operation, in order.
    pub(crate) fn echelonize_tracked(&mut self, mut on_operation: impl FnMut(RowOperation)) -> Vec<usize> {
        let mut pivots = Vec::new();
        let mut next_row = 0;
        for column in 0..self.column_count {
            if next_row == self.row_count() {
                break;
            }
            let Some(pivot_row) = (next_row..self.row_count()).find(|row| self.rows[*row].index(column)) else {
                continue;
            };
            if pivot_row != next_row {
                self.swap_rows(pivot_row, next_row);
                on_operation(RowOperation::Swap(pivot_row, next_row));
            }
            for row in 0..self.row_count() {
                if row != next_row && self.rows[row].index(column) {
                    self.add_into_row(row, next_row);
                    on_operation(RowOperation::Add { to: row, from: next_row });
                }
            }
            pivots.push(column);
            next_row += 1;
        }
        pivots
    }

    /// Dimension of the row space.
    ///
    /// ```
    /// use binar::BitMatrix;
    ///
    /// assert_eq!(BitMatrix::identity(5).rank(), 5);
    /// assert_eq!(BitMatrix::zeros(5, 5).rank(), 0);
    /// ```
    #[must_use]
    pub fn rank(&self) -> usize {
        self.clone().echelonize().len()
    }

    /// Basis of the right null space `{x : M x = 0}`, one basis vector per row.
    ///
    /// There is one basis vector per non-pivot column of the echelon form, with a single one
    /// among the non-pivot coordinates.
    ///
    /// ```
    /// use binar::BitMatrix;
    ///
    /// let kernel = BitMatrix::zeros(2, 3).kernel();
    /// assert_eq!(kernel.row_count(), 3);
    /// ```
    #[must_use]
    pub fn kernel(&self) -> BitMatrix {
        let mut reduced = self.clone();
        let pivots = reduced.echelonize();
        let mut is_pivot = vec![false; self.column_count];
        for pivot in &pivots {
            is_pivot[*pivot] = true;
        }
        let mut basis = BitMatrix::zeros(0, self.column_count);
        for free_column in (0..self.column_count).filter(|column| !is_pivot[*column]) {
            let mut vector = BitVec::zeros(self.column_count);
            vector.assign_index(free_column, true);
            for (row_index, pivot) in pivots.iter().enumerate() {
                if reduced.rows[row_index].index(free_column) {
                    vector.assign_index(*pivot, true);
                }
            }
            basis.push_row(vector);
        }
        basis
    }

    /// Computes `left` times `self`, the sum of the rows selected by `left`.
    ///
    /// # Panics
    ///
    /// Panics if `left.len() != self.row_count()`.
    #[must_use]
    pub fn right_multiply(&self, left: &BitVec) -> BitVec {
        assert_eq!(left.len(), self.row_count());
        let mut result = BitVec::zeros(self.column_count);
        for row in left.support() {
            result.bitxor_assign(&self.rows[row]);
        }
        result
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.rows.iter().all(Bitwise::is_zero)
    }
}

impl Index<(usize, usize)> for BitMatrix {
    type Output = bool;

    fn index(&self, index: (usize, usize)) -> &bool {
        if self.get(index) { &TRUE } else { &FALSE }
    }
}

impl Mul for &BitMatrix {
    type Output = BitMatrix;

    /// # Panics
    ///
    /// Panics if the inner dimensions differ.
    fn mul(self, other: &BitMatrix) -> BitMatrix {
        assert_eq!(self.column_count, other.row_count(), "inner dimensions must agree");
        BitMatrix {
            rows: self.rows.iter().map(|row| other.right_multiply(row)).collect(),
            column_count: other.column_count,
        }
    }
}

impl Mul<&BitVec> for &BitMatrix {
    type Output = BitVec;

    /// # Panics
    ///
    /// Panics if `vector.len() != self.column_count()`.
    fn mul(self, vector: &BitVec) -> BitVec {
        assert_eq!(self.column_count, vector.len());
        let mut result = BitVec::zeros(self.row_count());
        for (index, row) in self.rows.iter().enumerate() {
            if row.dot(vector) {
                result.assign_index(index, true);
            }
        }
        result
    }
}

impl Display for BitMatrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

impl Debug for BitMatrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "BitMatrix {}x{}", self.row_count(), self.column_count)?;
        Display::fmt(self, f)
    }
}
