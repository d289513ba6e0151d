//! Storage seams for operation history and display preferences.
//!
//! The engine only talks to the [`HistoryLedger`] and [`PreferenceStore`]
//! traits. In-memory implementations back tests; the JSON file
//! implementations replace their file atomically on every write.

mod json_file;
mod memory;

pub use json_file::{JsonFileHistory, JsonFilePreferences};
pub use memory::{InMemoryHistory, InMemoryPreferences};

use serde_json::{Map, Value};

use crate::{
    error::StoreError,
    model::{DisplayPreferences, HistoryEntry},
};

/// Maximum number of entries a ledger keeps.
pub const HISTORY_CAPACITY: usize = 50;

/// Append-only record of past operations, newest first.
pub trait HistoryLedger {
    /// Prepends `entry`, then drops everything past [`HISTORY_CAPACITY`].
    fn append(&mut self, entry: HistoryEntry) -> Result<(), StoreError>;

    /// All stored entries, newest first.
    fn list(&self) -> Result<Vec<HistoryEntry>, StoreError>;

    fn clear(&mut self) -> Result<(), StoreError>;
}

pub trait PreferenceStore {
    /// Current preferences, or the defaults when none were ever stored.
    fn get(&self) -> Result<DisplayPreferences, StoreError>;

    /// Shallow merge of `partial` over the stored preferences.
    fn update(&mut self, partial: Map<String, Value>) -> Result<(), StoreError>;
}
