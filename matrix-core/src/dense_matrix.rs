use crate::error::MatrixCoreError;
use crate::traits::Matrix;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// A dense matrix of `f64` values stored in row-major order on the CPU.
///
/// Serializes as a list of rows (`[[1.0, 2.0], [3.0, 4.0]]`); deserializing
/// goes through [`DenseMatrix::from_rows`] so ragged input is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    /// Row-major values, `rows * cols` long.
    values: Vec<f64>,
}

impl DenseMatrix {
    /// Builds a matrix from a list of rows.
    ///
    /// # Errors
    /// Returns `InvalidDimensions` when there are no rows, no columns, or the
    /// rows have different lengths.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, MatrixCoreError> {
        let row_count = rows.len();
        if row_count == 0 {
            return Err(MatrixCoreError::InvalidDimensions(
                "Matrix must have at least one row".to_string(),
            ));
        }
        let cols = rows[0].len();
        if cols == 0 {
            return Err(MatrixCoreError::InvalidDimensions(
                "Matrix must have at least one column".to_string(),
            ));
        }

        let mut values = Vec::with_capacity(row_count * cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(MatrixCoreError::InvalidDimensions(format!(
                    "Row {} has {} elements, expected {} (rows must have equal length)",
                    i,
                    row.len(),
                    cols
                )));
            }
            values.extend(row);
        }

        Ok(Self {
            rows: row_count,
            cols,
            values,
        })
    }

    /// Creates a matrix from row-major values.
    pub fn from_row_major(
        rows: usize,
        cols: usize,
        values: Vec<f64>,
    ) -> Result<Self, MatrixCoreError> {
        if rows == 0 || cols == 0 {
            return Err(MatrixCoreError::InvalidDimensions(format!(
                "Matrix dimensions must be non-zero, got {}x{}",
                rows, cols
            )));
        }
        if values.len() != rows * cols {
            return Err(MatrixCoreError::InvalidDimensions(format!(
                "Data length ({}) does not match dimensions ({}x{})",
                values.len(),
                rows,
                cols
            )));
        }
        Ok(Self { rows, cols, values })
    }

    /// A `rows x cols` matrix of zeros. Panics if either dimension is zero.
    pub(crate) fn zeros(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "zero-sized matrix");
        Self {
            rows,
            cols,
            values: vec![0.0; rows * cols],
        }
    }

    /// The `n x n` identity matrix.
    ///
    /// # Errors
    /// Returns `InvalidDimensions` for `n == 0`.
    pub fn identity(n: usize) -> Result<Self, MatrixCoreError> {
        if n == 0 {
            return Err(MatrixCoreError::InvalidDimensions(
                "Identity matrix order must be at least 1".to_string(),
            ));
        }
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.values[i * n + i] = 1.0;
        }
        Ok(m)
    }

    /// Borrow row `i` as a slice.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.cols..(i + 1) * self.cols]
    }

    /// Row-major view of all values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: f64) {
        self.values[row * self.cols + col] = value;
    }

    /// Copies the matrix out as a list of rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.values
            .chunks(self.cols)
            .map(|chunk| chunk.to_vec())
            .collect()
    }

    /// Checks that every element is finite.
    pub fn ensure_finite(&self) -> Result<(), MatrixCoreError> {
        if self.values.iter().all(|v| v.is_finite()) {
            Ok(())
        } else {
            Err(MatrixCoreError::NonFinite)
        }
    }

    /// True when both matrices have the same shape and every pair of elements
    /// differs by at most `tolerance`.
    pub fn approx_eq(&self, other: &DenseMatrix, tolerance: f64) -> bool {
        self.dims() == other.dims()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

impl Matrix for DenseMatrix {
    fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

impl Index<(usize, usize)> for DenseMatrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({}, {}) out of bounds for {}x{} matrix",
            row,
            col,
            self.rows,
            self.cols
        );
        &self.values[row * self.cols + col]
    }
}

impl TryFrom<Vec<Vec<f64>>> for DenseMatrix {
    type Error = MatrixCoreError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        DenseMatrix::from_rows(rows)
    }
}

impl From<DenseMatrix> for Vec<Vec<f64>> {
    fn from(matrix: DenseMatrix) -> Self {
        matrix.to_rows()
    }
}

#[cfg(test)]
mod tests {
    use crate::{DenseMatrix, Matrix, MatrixCoreError};

    #[test]
    fn test_dense_matrix_from_rows_valid() {
        let m = DenseMatrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.dims(), (2, 3));
        assert_eq!(m.values(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m[(1, 2)], 6.0);
        assert!(!m.is_square());
    }

    #[test]
    fn test_dense_matrix_from_rows_ragged() {
        let m = DenseMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        match m.err().unwrap() {
            MatrixCoreError::InvalidDimensions(msg) => assert!(msg.contains("Row 1")),
            other => panic!("Expected InvalidDimensions error, got {:?}", other),
        }
    }

    #[test]
    fn test_dense_matrix_from_rows_empty() {
        assert!(DenseMatrix::from_rows(vec![]).is_err());
        assert!(DenseMatrix::from_rows(vec![vec![]]).is_err());
    }

    #[test]
    fn test_dense_matrix_from_row_major_length_mismatch() {
        let m = DenseMatrix::from_row_major(2, 2, vec![1.0, 2.0, 3.0]);
        match m.err().unwrap() {
            MatrixCoreError::InvalidDimensions(msg) => assert!(msg.contains("Data length")),
            other => panic!("Expected InvalidDimensions error, got {:?}", other),
        }
    }

    #[test]
    fn test_identity() {
        let i3 = DenseMatrix::identity(3).unwrap();
        assert_eq!(
            i3.to_rows(),
            vec![
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.0, 0.0, 1.0]
            ]
        );
        assert!(DenseMatrix::identity(0).is_err());
    }

    #[test]
    fn test_serde_as_rows() {
        let m: DenseMatrix = serde_json::from_str("[[1.0, 2.0], [3.0, 4.0]]").unwrap();
        assert_eq!(m.dims(), (2, 2));
        assert_eq!(serde_json::to_string(&m).unwrap(), "[[1.0,2.0],[3.0,4.0]]");

        let ragged: Result<DenseMatrix, _> = serde_json::from_str("[[1.0, 2.0], [3.0]]");
        assert!(ragged.is_err());
    }

    #[test]
    fn test_ensure_finite() {
        let m = DenseMatrix::from_rows(vec![vec![1.0, f64::INFINITY]]).unwrap();
        assert_eq!(m.ensure_finite(), Err(MatrixCoreError::NonFinite));
    }
}
