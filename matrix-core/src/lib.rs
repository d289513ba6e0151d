//! # Matrix Core Library
//!
//! Provides the dense matrix value type and the numeric kernels (element-wise
//! arithmetic, products, transpose, determinant, inverse) used by the
//! step-by-step engine.

pub mod dense_matrix;
pub mod error;
pub mod ops;
pub mod traits;

pub use dense_matrix::DenseMatrix;
pub use error::MatrixCoreError;
pub use traits::Matrix;

/// Absolute threshold under which a determinant is treated as zero.
pub const SINGULAR_TOLERANCE: f64 = 1e-10;
