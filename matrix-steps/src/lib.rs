//! # Matrix Steps
//!
//! Explainable matrix arithmetic: every operation returns its result together
//! with a human-readable derivation, formatted according to the stored
//! display preferences, and is recorded in an operation history.

pub mod engine;
pub mod error;
pub mod format;
pub mod model;
pub mod narrative;
pub mod store;

pub use engine::OperationEngine;
pub use error::{StepsError, StoreError};
pub use format::NumberFormatter;
pub use model::{
    Computation, DisplayMatrix, DisplayPreferences, HistoryEntry, NumericValue, Operation,
    OperationResult, ResultValue, Step,
};
pub use store::{
    HistoryLedger, InMemoryHistory, InMemoryPreferences, JsonFileHistory, JsonFilePreferences,
    PreferenceStore, HISTORY_CAPACITY,
};
