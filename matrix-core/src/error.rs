use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixCoreError {
    #[error("Invalid matrix dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("Matrix is not invertible (determinant = 0)")]
    SingularMatrix,

    #[error("Computation produced a non-finite value")]
    NonFinite,

    #[error("Internal error: {0}")]
    Internal(String),
}
