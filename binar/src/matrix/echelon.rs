use super::RowOperation;
use crate::{BitMatrix, BitVec, Bitwise, BitwisePairMut};

/// Reduced row echelon form of a matrix together with the row operations that produced it.
///
/// `transform * original == reduced` holds, so solutions found against the reduced rows can be
/// expressed as combinations of the original rows.
///
/// # Example
///
/// ```
/// use binar::{BitMatrix, BitVec, EchelonForm};
///
/// let rows = vec![
///     vec![true, true, false],
///     vec![false, true, true],
/// ];
/// let echelon = EchelonForm::new(BitMatrix::from_iter(rows, 3));
///
/// // The first plus the second row
/// let target: BitVec = [true, false, true].into_iter().collect();
/// let coefficients = echelon.solve(&target).unwrap();
/// assert_eq!(coefficients, [true, true].into_iter().collect::<BitVec>());
///
/// let unreachable: BitVec = [true, false, false].into_iter().collect();
/// assert!(echelon.solve(&unreachable).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct EchelonForm {
    pub reduced: BitMatrix,
    pub transform: BitMatrix,
    pub pivots: Vec<usize>,
    original: BitMatrix,
}

impl EchelonForm {
    #[must_use]
    pub fn new(matrix: BitMatrix) -> Self {
        let mut reduced = matrix.clone();
        let mut transform = BitMatrix::identity(matrix.row_count());
        let pivots = reduced.echelonize_tracked(|operation| match operation {
            RowOperation::Swap(first, second) => transform.swap_rows(first, second),
            RowOperation::Add { to, from } => transform.add_into_row(to, from),
        });
        EchelonForm {
            reduced,
            transform,
            pivots,
            original: matrix,
        }
    }

    #[must_use]
    pub fn rank(&self) -> usize {
        self.pivots.len()
    }

    #[must_use]
    pub fn original(&self) -> &BitMatrix {
        &self.original
    }

    /// Finds coefficients `x` with `x[0] * row[0] + x[1] * row[1] + ... == target`.
    ///
    /// Returns `None` if `target` is not in the row space.
    ///
    /// # Panics
    ///
    /// Panics if `target.len()` differs from the column count.
    #[must_use]
    pub fn solve(&self, target: &BitVec) -> Option<BitVec> {
        assert_eq!(target.len(), self.reduced.column_count());
        let mut residual = target.clone();
        let mut coefficients = BitVec::zeros(self.reduced.row_count());
        for (row, pivot) in self.pivots.iter().enumerate() {
            if residual.index(*pivot) {
                residual.bitxor_assign(self.reduced.row(row));
                coefficients.bitxor_assign(self.transform.row(row));
            }
        }
        residual.is_zero().then_some(coefficients)
    }

    /// Finds `x` with `original * x == target`.
    ///
    /// Returns `None` if `target` is not in the column space.
    ///
    /// # Panics
    ///
    /// Panics if `target.len()` differs from the row count.
    #[must_use]
    pub fn transpose_solve(&self, target: &BitVec) -> Option<BitVec> {
        assert_eq!(target.len(), self.reduced.row_count());
        EchelonForm::new(self.original.transposed()).solve(target)
    }

    /// Reduces `vector` against the pivot rows, so that it is zero on every pivot column.
    #[must_use]
    pub fn reduce(&self, vector: &BitVec) -> BitVec {
        let mut reduced = vector.clone();
        for (row, pivot) in self.pivots.iter().enumerate() {
            if reduced.index(*pivot) {
                reduced.bitxor_assign(self.reduced.row(row));
            }
        }
        reduced
    }

    #[must_use]
    pub fn contains(&self, vector: &BitVec) -> bool {
        self.reduce(vector).is_zero()
    }
}
