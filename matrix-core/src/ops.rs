// Numeric kernels on `DenseMatrix`. Every function validates shapes first and
// returns `MatrixCoreError` instead of panicking.

use crate::{
    dense_matrix::DenseMatrix, error::MatrixCoreError, traits::Matrix, SINGULAR_TOLERANCE,
};

fn ensure_same_shape(
    a: &DenseMatrix,
    b: &DenseMatrix,
    verb: &str,
) -> Result<(), MatrixCoreError> {
    if a.dims() != b.dims() {
        return Err(MatrixCoreError::InvalidDimensions(format!(
            "Matrix dimensions must match to {}: {}x{} vs {}x{}",
            verb,
            a.rows(),
            a.cols(),
            b.rows(),
            b.cols()
        )));
    }
    Ok(())
}

fn ensure_square(a: &DenseMatrix) -> Result<usize, MatrixCoreError> {
    let (rows, cols) = a.dims();
    if !a.is_square() {
        return Err(MatrixCoreError::NotSquare { rows, cols });
    }
    Ok(rows)
}

fn zip_with(
    a: &DenseMatrix,
    b: &DenseMatrix,
    f: impl Fn(f64, f64) -> f64,
) -> Result<DenseMatrix, MatrixCoreError> {
    let values = a
        .values()
        .iter()
        .zip(b.values())
        .map(|(&x, &y)| f(x, y))
        .collect();
    let result = DenseMatrix::from_row_major(a.rows(), a.cols(), values)?;
    result.ensure_finite()?;
    Ok(result)
}

/// `C[i,j] = A[i,j] + B[i,j]`
pub fn add(a: &DenseMatrix, b: &DenseMatrix) -> Result<DenseMatrix, MatrixCoreError> {
    ensure_same_shape(a, b, "add")?;
    zip_with(a, b, |x, y| x + y)
}

/// `C[i,j] = A[i,j] - B[i,j]`
pub fn subtract(a: &DenseMatrix, b: &DenseMatrix) -> Result<DenseMatrix, MatrixCoreError> {
    ensure_same_shape(a, b, "subtract")?;
    zip_with(a, b, |x, y| x - y)
}

/// Standard matrix product `C[i,j] = Σ_k A[i,k]·B[k,j]`.
///
/// # Errors
/// `InvalidDimensions` when the columns of `a` differ from the rows of `b`.
pub fn multiply(a: &DenseMatrix, b: &DenseMatrix) -> Result<DenseMatrix, MatrixCoreError> {
    if a.cols() != b.rows() {
        return Err(MatrixCoreError::InvalidDimensions(format!(
            "Columns of A must equal rows of B: {}x{} × {}x{}",
            a.rows(),
            a.cols(),
            b.rows(),
            b.cols()
        )));
    }
    let mut c = DenseMatrix::zeros(a.rows(), b.cols());
    for i in 0..a.rows() {
        for j in 0..b.cols() {
            let sum = (0..a.cols()).map(|k| a[(i, k)] * b[(k, j)]).sum();
            c.set(i, j, sum);
        }
    }
    c.ensure_finite()?;
    Ok(c)
}

/// `Aᵗ[i,j] = A[j,i]`. Any shape is accepted.
pub fn transpose(a: &DenseMatrix) -> DenseMatrix {
    let mut t = DenseMatrix::zeros(a.cols(), a.rows());
    for i in 0..a.rows() {
        for j in 0..a.cols() {
            t.set(j, i, a[(i, j)]);
        }
    }
    t
}

/// LU factorization with partial pivoting, stored in place.
/// Returns the packed factors and the sign of the row permutation, or `None`
/// for the permutation sign when a zero pivot column is hit.
fn lu_in_place(a: &DenseMatrix) -> (Vec<Vec<f64>>, Option<f64>) {
    let n = a.rows();
    let mut lu = a.to_rows();
    let mut sign = 1.0;
    for k in 0..n {
        let pivot_row = (k..n)
            .max_by(|&x, &y| lu[x][k].abs().total_cmp(&lu[y][k].abs()))
            .unwrap_or(k);
        if lu[pivot_row][k] == 0.0 {
            return (lu, None);
        }
        if pivot_row != k {
            lu.swap(pivot_row, k);
            sign = -sign;
        }
        for i in (k + 1)..n {
            let factor = lu[i][k] / lu[k][k];
            lu[i][k] = factor;
            for j in (k + 1)..n {
                lu[i][j] -= factor * lu[k][j];
            }
        }
    }
    (lu, Some(sign))
}

/// Determinant from an LU factorization with partial pivoting.
///
/// # Errors
/// `NotSquare` for rectangular input, `NonFinite` on overflow.
pub fn determinant(a: &DenseMatrix) -> Result<f64, MatrixCoreError> {
    let n = ensure_square(a)?;
    let (lu, sign) = lu_in_place(a);
    let det = match sign {
        Some(sign) => (0..n).fold(sign, |acc, i| acc * lu[i][i]),
        None => 0.0,
    };
    if !det.is_finite() {
        return Err(MatrixCoreError::NonFinite);
    }
    log::trace!("determinant of {}x{} matrix = {}", n, n, det);
    Ok(det)
}

/// Inverse via Gauss-Jordan elimination on `[A | I]` with partial pivoting.
///
/// # Errors
/// `NotSquare` for rectangular input, `SingularMatrix` when
/// `|det(A)| < SINGULAR_TOLERANCE`.
pub fn inverse(a: &DenseMatrix) -> Result<DenseMatrix, MatrixCoreError> {
    let det = determinant(a)?;
    inverse_with_determinant(a, det)
}

/// [`inverse`] for callers that already hold `det(A)`, skipping the second
/// factorization.
pub fn inverse_with_determinant(
    a: &DenseMatrix,
    det: f64,
) -> Result<DenseMatrix, MatrixCoreError> {
    let n = ensure_square(a)?;
    if det.abs() < SINGULAR_TOLERANCE {
        return Err(MatrixCoreError::SingularMatrix);
    }

    let mut augmented: Vec<Vec<f64>> = a
        .to_rows()
        .into_iter()
        .enumerate()
        .map(|(i, mut row)| {
            row.extend((0..n).map(|j| if i == j { 1.0 } else { 0.0 }));
            row
        })
        .collect();

    for i in 0..n {
        let pivot_row = (i..n)
            .max_by(|&x, &y| augmented[x][i].abs().total_cmp(&augmented[y][i].abs()))
            .unwrap_or(i);
        if augmented[pivot_row][i] == 0.0 {
            return Err(MatrixCoreError::SingularMatrix);
        }
        augmented.swap(i, pivot_row);

        let pivot = augmented[i][i];
        for value in augmented[i].iter_mut() {
            *value /= pivot;
        }

        for k in 0..n {
            if k != i {
                let factor = augmented[k][i];
                if factor == 0.0 {
                    continue;
                }
                for j in 0..2 * n {
                    augmented[k][j] -= factor * augmented[i][j];
                }
            }
        }
    }

    let values = augmented
        .into_iter()
        .flat_map(|row| row.into_iter().skip(n))
        .collect();
    let inv = DenseMatrix::from_row_major(n, n, values)?;
    inv.ensure_finite()?;
    Ok(inv)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: Vec<Vec<f64>>) -> DenseMatrix {
        DenseMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_add_and_subtract() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = m(vec![vec![5.0, 6.0], vec![7.0, 8.0]]);
        assert_eq!(add(&a, &b).unwrap().to_rows(), vec![vec![6.0, 8.0], vec![10.0, 12.0]]);
        assert_eq!(subtract(&b, &a).unwrap().to_rows(), vec![vec![4.0, 4.0], vec![4.0, 4.0]]);
    }

    #[test]
    fn test_add_shape_mismatch() {
        let a = m(vec![vec![1.0, 2.0]]);
        let b = m(vec![vec![1.0], vec![2.0]]);
        match add(&a, &b).err().unwrap() {
            MatrixCoreError::InvalidDimensions(msg) => assert!(msg.contains("must match to add")),
            other => panic!("Expected InvalidDimensions error, got {:?}", other),
        }
        assert!(subtract(&a, &b).is_err());
    }

    #[test]
    fn test_multiply() {
        let a = m(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let b = m(vec![vec![7.0, 8.0], vec![9.0, 10.0], vec![11.0, 12.0]]);
        let c = multiply(&a, &b).unwrap();
        assert_eq!(c.to_rows(), vec![vec![58.0, 64.0], vec![139.0, 154.0]]);
    }

    #[test]
    fn test_multiply_incompatible() {
        let a = m(vec![vec![1.0, 2.0]]);
        match multiply(&a, &a).err().unwrap() {
            MatrixCoreError::InvalidDimensions(msg) => assert!(msg.contains("Columns of A")),
            other => panic!("Expected InvalidDimensions error, got {:?}", other),
        }
    }

    #[test]
    fn test_multiply_overflow_is_non_finite() {
        let a = m(vec![vec![f64::MAX, f64::MAX]]);
        let b = m(vec![vec![2.0], vec![2.0]]);
        assert_eq!(multiply(&a, &b), Err(MatrixCoreError::NonFinite));
    }

    #[test]
    fn test_transpose() {
        let a = m(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let t = transpose(&a);
        assert_eq!(t.dims(), (3, 2));
        assert_eq!(t.to_rows(), vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]);
        assert_eq!(transpose(&t), a);
    }

    #[test]
    fn test_determinant() {
        let two = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert!((determinant(&two).unwrap() + 2.0).abs() < 1e-12);
        assert_eq!(determinant(&m(vec![vec![7.5]])).unwrap(), 7.5);
        let a = m(vec![
            vec![2.0, -3.0, 1.0],
            vec![2.0, 0.0, -1.0],
            vec![1.0, 4.0, 5.0],
        ]);
        assert!((determinant(&a).unwrap() - 49.0).abs() < 1e-9);
        // requires a row swap
        let p = m(vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
        assert!((determinant(&p).unwrap() + 1.0).abs() < 1e-12);
        let singular = m(vec![vec![1.0, 2.0], vec![2.0, 4.0]]);
        assert!(determinant(&singular).unwrap().abs() < SINGULAR_TOLERANCE);
    }

    #[test]
    fn test_determinant_not_square() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]);
        assert_eq!(determinant(&a), Err(MatrixCoreError::NotSquare { rows: 3, cols: 2 }));
    }

    #[test]
    fn test_inverse_2x2() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let inv = inverse(&a).unwrap();
        let expected = m(vec![vec![-2.0, 1.0], vec![1.5, -0.5]]);
        assert!(inv.approx_eq(&expected, 1e-12), "got {:?}", inv);
    }

    #[test]
    fn test_inverse_times_original_is_identity() {
        let a = m(vec![
            vec![4.0, 7.0, 2.0],
            vec![3.0, 6.0, 1.0],
            vec![2.0, 5.0, 3.0],
        ]);
        let product = multiply(&a, &inverse(&a).unwrap()).unwrap();
        assert!(product.approx_eq(&DenseMatrix::identity(3).unwrap(), 1e-9));
    }

    #[test]
    fn test_inverse_singular() {
        let a = m(vec![vec![1.0, 2.0], vec![2.0, 4.0]]);
        assert_eq!(inverse(&a), Err(MatrixCoreError::SingularMatrix));
    }

    #[test]
    fn test_inverse_with_known_determinant() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let det = determinant(&a).unwrap();
        assert_eq!(inverse_with_determinant(&a, det), inverse(&a));
        assert_eq!(
            inverse_with_determinant(&a, 1e-12),
            Err(MatrixCoreError::SingularMatrix)
        );
        let tall = m(vec![vec![1.0], vec![2.0]]);
        assert_eq!(
            inverse_with_determinant(&tall, 1.0),
            Err(MatrixCoreError::NotSquare { rows: 2, cols: 1 })
        );
    }
}
