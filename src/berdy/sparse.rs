//! Assembly of sparse matrices from triplets.

use nalgebra::{Dim, Matrix, RawStorage};
use nalgebra_sparse::{CooMatrix, CscMatrix};

#[cfg(test)]
#[path = "sparse_tests.rs"]
mod sparse_tests;

/// Collects the entries of a sparse matrix before it is converted to the compressed column
/// format.
///
/// Entries that are exactly zero are never stored. Entries that are added more than once for the
/// same row and column are summed.
#[derive(Clone, Debug)]
pub(crate) struct MatrixBuilder {
    matrix: CooMatrix<f64>,
}

impl MatrixBuilder {
    /// Adds a single entry.
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(row < self.matrix.nrows());
        debug_assert!(col < self.matrix.ncols());
        if value != 0.0 {
            self.matrix.push(row, col, value);
        }
    }

    /// Adds a dense block with its top left corner at the given row and column.
    pub fn add_block<R, C, S>(&mut self, row: usize, col: usize, block: &Matrix<f64, R, C, S>)
    where
        R: Dim,
        C: Dim,
        S: RawStorage<f64, R, C>,
    {
        for c in 0..block.ncols() {
            for r in 0..block.nrows() {
                self.add(row + r, col + c, block[(r, c)]);
            }
        }
    }

    /// Adds `value` times the identity matrix of the given size.
    pub fn add_diagonal(&mut self, row: usize, col: usize, size: usize, value: f64) {
        for i in 0..size {
            self.add(row + i, col + i, value);
        }
    }

    /// Converts the collected entries to a matrix in the compressed column format.
    pub fn build(self) -> CscMatrix<f64> {
        CscMatrix::from(&self.matrix)
    }

    /// Creates a builder for a matrix with the given size.
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            matrix: CooMatrix::new(nrows, ncols),
        }
    }
}

/// Returns a sparse matrix with `value` on the diagonal.
pub fn set_diagonal_matrix(size: usize, value: f64) -> CscMatrix<f64> {
    let mut builder = MatrixBuilder::new(size, size);
    builder.add_diagonal(0, 0, size, value);
    builder.build()
}
