//! Save State
//!
//! Best completion time per level, keyed by the lower-cased level title.
//! Abilities unlock by completing the level that shares their name. The
//! core only reads a [`SaveState`]; where it lives is up to a [`SaveStore`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::error::SaveError;
use crate::game::ability::AbilityId;

/// Persistent progress.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveState {
    /// Best completion time per level, in milliseconds
    pub level_completion_times: BTreeMap<String, u64>,
    /// When progress last changed
    pub last_update: Option<DateTime<Utc>>,
}

impl SaveState {
    /// Fresh save with nothing completed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Key a level title is stored under.
    pub fn level_key(title: &str) -> String {
        title.to_lowercase()
    }

    /// Whether the level has ever been completed.
    pub fn has_completed(&self, title: &str) -> bool {
        self.level_completion_times.contains_key(&Self::level_key(title))
    }

    /// Best time for a level.
    pub fn best_time(&self, title: &str) -> Option<u64> {
        self.level_completion_times.get(&Self::level_key(title)).copied()
    }

    /// Record a completion, keeping the lower of the old and new times.
    ///
    /// Returns true if `millis` is a new best.
    pub fn record_completion(&mut self, title: &str, millis: u64) -> bool {
        let key = Self::level_key(title);
        if self.level_completion_times.get(&key).is_some_and(|best| *best <= millis) {
            return false;
        }
        info!(level = %key, millis, "new best time");
        self.level_completion_times.insert(key, millis);
        self.last_update = Some(Utc::now());
        true
    }

    /// Abilities whose level has been completed, in catalogue order.
    pub fn unlocked_abilities(&self) -> Vec<AbilityId> {
        AbilityId::ALL
            .into_iter()
            .filter(|ability| self.level_completion_times.contains_key(ability.internal_name()))
            .collect()
    }
}

// =============================================================================
// STORES
// =============================================================================

/// Somewhere a save can be kept.
pub trait SaveStore {
    /// Read the save. A store with nothing saved yields an empty save.
    fn load(&self) -> Result<SaveState, SaveError>;

    /// Overwrite the save.
    fn save(&mut self, state: &SaveState) -> Result<(), SaveError>;
}

/// Save kept as a pretty-printed JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File the save lives in.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SaveError {
        SaveError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SaveStore for JsonFileStore {
    fn load(&self) -> Result<SaveState, SaveError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no save file");
            return Ok(SaveState::new());
        }
        let json = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&mut self, state: &SaveState) -> Result<(), SaveError> {
        let json = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))?;
        debug!(path = %self.path.display(), levels = state.level_completion_times.len(), "saved");
        Ok(())
    }
}

/// Save kept in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    state: Option<SaveState>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    fn load(&self) -> Result<SaveState, SaveError> {
        Ok(self.state.clone().unwrap_or_default())
    }

    fn save(&mut self, state: &SaveState) -> Result<(), SaveError> {
        self.state = Some(state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_best_time() {
        let mut save = SaveState::new();
        assert!(save.record_completion("Bowland", 5000));
        assert!(!save.record_completion("bowland", 6000));
        assert!(save.record_completion("BOWLAND", 4200));
        assert_eq!(save.best_time("Bowland"), Some(4200));
        assert!(save.last_update.is_some());
    }

    #[test]
    fn test_unlocks_follow_completed_levels() {
        let mut save = SaveState::new();
        assert!(save.unlocked_abilities().is_empty());
        save.record_completion("Pendle", 100);
        save.record_completion("Cartmel", 100);
        save.record_completion("Morecambe", 100);
        assert_eq!(save.unlocked_abilities(), vec![AbilityId::Cartmel, AbilityId::Pendle]);
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("save.json"));
        assert_eq!(store.load().unwrap(), SaveState::new());

        let mut save = SaveState::new();
        save.record_completion("Fylde", 31_337);
        store.save(&save).unwrap();
        assert_eq!(store.load().unwrap(), save);
    }

    #[test]
    fn test_json_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        std::fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(SaveError::Json(_))));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        let mut save = SaveState::new();
        save.record_completion("Lonsdale", 1);
        store.save(&save).unwrap();
        assert!(store.load().unwrap().has_completed("lonsdale"));
    }
}
