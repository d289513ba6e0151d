use serde_json::{Map, Value};
use std::collections::VecDeque;

use super::{HistoryLedger, PreferenceStore, HISTORY_CAPACITY};
use crate::{
    error::StoreError,
    model::{DisplayPreferences, HistoryEntry},
};

#[derive(Debug, Default, Clone)]
pub struct InMemoryHistory {
    entries: VecDeque<HistoryEntry>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryLedger for InMemoryHistory {
    fn append(&mut self, entry: HistoryEntry) -> Result<(), StoreError> {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_CAPACITY);
        Ok(())
    }

    fn list(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        Ok(self.entries.iter().cloned().collect())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryPreferences {
    current: DisplayPreferences,
}

impl PreferenceStore for InMemoryPreferences {
    fn get(&self) -> Result<DisplayPreferences, StoreError> {
        Ok(self.current.clone())
    }

    fn update(&mut self, partial: Map<String, Value>) -> Result<(), StoreError> {
        self.current = self.current.merged(partial)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Operation, ResultValue};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn entry(tag: usize) -> HistoryEntry {
        HistoryEntry::now(
            Operation::Det,
            BTreeMap::new(),
            ResultValue::Scalar(tag.to_string()),
            vec![],
        )
    }

    #[test]
    fn test_history_newest_first_and_capped() {
        let mut history = InMemoryHistory::new();
        for i in 0..(HISTORY_CAPACITY + 5) {
            history.append(entry(i)).unwrap();
        }
        let entries = history.list().unwrap();
        assert_eq!(entries.len(), HISTORY_CAPACITY);
        assert_eq!(entries[0].result, ResultValue::Scalar((HISTORY_CAPACITY + 4).to_string()));
        assert_eq!(entries[HISTORY_CAPACITY - 1].result, ResultValue::Scalar("5".to_string()));

        history.clear().unwrap();
        assert!(history.list().unwrap().is_empty());
    }

    #[test]
    fn test_preferences_update_is_shallow_merge() {
        let mut prefs = InMemoryPreferences::default();
        prefs
            .update(json!({"decimal_places": 2, "accent": "teal"}).as_object().unwrap().clone())
            .unwrap();
        prefs
            .update(json!({"theme": "dark"}).as_object().unwrap().clone())
            .unwrap();
        let current = prefs.get().unwrap();
        assert_eq!(current.decimal_places, 2);
        assert_eq!(current.theme, "dark");
        assert_eq!(current.extra.get("accent"), Some(&json!("teal")));
    }

    #[test]
    fn test_preferences_invalid_update_leaves_store_untouched() {
        let mut prefs = InMemoryPreferences::default();
        let result = prefs.update(json!({"show_fractions": "yes"}).as_object().unwrap().clone());
        assert!(result.is_err());
        assert_eq!(prefs.get().unwrap(), DisplayPreferences::default());
    }
}
