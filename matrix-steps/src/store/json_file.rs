use serde::Serialize;
use serde_json::{Map, Value};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use super::{HistoryLedger, PreferenceStore, HISTORY_CAPACITY};
use crate::{
    error::StoreError,
    model::{DisplayPreferences, HistoryEntry},
};

/// Serializes `value` as pretty JSON into a sibling temp file and renames it
/// over `path`, so readers never observe a half-written file.
fn write_atomically<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// History kept as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileHistory {
    path: PathBuf,
}

impl JsonFileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl HistoryLedger for JsonFileHistory {
    /// A corrupt file is replaced by a fresh history holding `entry`.
    fn append(&mut self, entry: HistoryEntry) -> Result<(), StoreError> {
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(StoreError::Serialization(e)) => {
                log::warn!(
                    "Starting a new history over corrupt file {}: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        entries.insert(0, entry);
        entries.truncate(HISTORY_CAPACITY);
        write_atomically(&self.path, &entries)
    }

    /// An unreadable or corrupt file lists as empty.
    fn list(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        match self.read_entries() {
            Ok(entries) => Ok(entries),
            Err(e) => {
                log::warn!("Ignoring unreadable history file {}: {}", self.path.display(), e);
                Ok(Vec::new())
            }
        }
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Preferences kept as a JSON object in a single file, cached in memory.
#[derive(Debug, Clone)]
pub struct JsonFilePreferences {
    path: PathBuf,
    current: DisplayPreferences,
}

impl JsonFilePreferences {
    /// Loads preferences from `path`. A missing file is created with the
    /// defaults; an unreadable one is ignored and the defaults are used.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<DisplayPreferences>(&bytes)
                .map_err(StoreError::from)
                .and_then(|prefs| prefs.validate().map(|()| prefs))
            {
                Ok(prefs) => prefs,
                Err(e) => {
                    log::warn!("Invalid settings file {}, using defaults: {}", path.display(), e);
                    DisplayPreferences::default()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let defaults = DisplayPreferences::default();
                if let Err(e) = write_atomically(&path, &defaults) {
                    log::warn!("Could not write default settings to {}: {}", path.display(), e);
                }
                defaults
            }
            Err(e) => {
                log::warn!(
                    "Could not read settings file {}, using defaults: {}",
                    path.display(),
                    e
                );
                DisplayPreferences::default()
            }
        };
        Self { path, current }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for JsonFilePreferences {
    fn get(&self) -> Result<DisplayPreferences, StoreError> {
        Ok(self.current.clone())
    }

    fn update(&mut self, partial: Map<String, Value>) -> Result<(), StoreError> {
        let merged = self.current.merged(partial)?;
        write_atomically(&self.path, &merged)?;
        self.current = merged;
        Ok(())
    }
}
