mod store_error;

pub use store_error::StoreError;
use derive_more::From;

use matrix_core::MatrixCoreError;

pub type Result<T> = core::result::Result<T, StepsError>;

#[derive(Debug, From)]
pub enum StepsError {
    // -- Externals
    #[from]
    MatrixCore(MatrixCoreError),

    #[from]
    Store(StoreError),

    // -- Internal
    /// A kernel panicked; carries the panic payload when it was a string.
    Panicked(String),
}

// region:    --- Error Boilerplate

impl core::fmt::Display for StepsError {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        match self {
            StepsError::MatrixCore(e) => write!(fmt, "{e}"),
            StepsError::Store(e) => write!(fmt, "{e}"),
            StepsError::Panicked(msg) => write!(fmt, "Unexpected numeric failure: {msg}"),
        }
    }
}

impl std::error::Error for StepsError {}

// endregion: --- Error Boilerplate
