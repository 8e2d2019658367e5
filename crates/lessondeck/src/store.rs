//! Learner progress and achievements, persisted as JSON.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{DeckError, Result};

/// Levels in unlock order.
pub const LEVELS: [&str; 6] = [
    "level-1", "level-2", "level-3", "level-4", "level-5", "level-6",
];

pub const PROGRESS_STORE: &str = "progress";
pub const ACHIEVEMENTS_STORE: &str = "achievements";

/// Load/save access to one persisted record.
pub trait Store<T> {
    /// The stored value, or `T::default()` when nothing usable is stored.
    fn load(&self) -> Result<T>;
    fn save(&self, value: &T) -> Result<()>;
}

/// Directory holding the JSON stores.
pub fn store_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("lessondeck"))
}

fn decode_or_default<T: DeserializeOwned + Default>(json: &str, origin: &str) -> T {
    match serde_json::from_str(json) {
        Ok(value) => value,
        Err(e) => {
            warn!(store = origin, error = %e, "ignoring corrupt store");
            T::default()
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| DeckError::Store(e.to_string()))
}

pub struct JsonFileStore<T> {
    path: PathBuf,
    _record: PhantomData<T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    /// `<data dir>/lessondeck/<name>.json`
    pub fn named(name: &str) -> Result<Self> {
        let dir = store_dir()
            .ok_or_else(|| DeckError::Store("could not determine data directory".into()))?;
        Ok(Self::new(dir.join(format!("{name}.json"))))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T: Serialize + DeserializeOwned + Default> Store<T> for JsonFileStore<T> {
    fn load(&self) -> Result<T> {
        if !self.path.exists() {
            return Ok(T::default());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|source| DeckError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(decode_or_default(&content, &self.path.display().to_string()))
    }

    fn save(&self, value: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| DeckError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, encode(value)?).map_err(|source| DeckError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Keeps the serialized record in memory. Used by tests and when no data
/// directory is available.
pub struct MemoryStore<T> {
    json: RefCell<Option<String>>,
    _record: PhantomData<T>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            json: RefCell::new(None),
            _record: PhantomData,
        }
    }
}

impl<T> MemoryStore<T> {
    /// Start from raw stored text.
    pub fn with_raw(json: impl Into<String>) -> Self {
        Self {
            json: RefCell::new(Some(json.into())),
            _record: PhantomData,
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.json.borrow().clone()
    }
}

impl<T: Serialize + DeserializeOwned + Default> Store<T> for MemoryStore<T> {
    fn load(&self) -> Result<T> {
        Ok(match self.json.borrow().as_deref() {
            Some(json) => decode_or_default(json, "memory"),
            None => T::default(),
        })
    }

    fn save(&self, value: &T) -> Result<()> {
        *self.json.borrow_mut() = Some(encode(value)?);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(default)]
    pub completed_levels: Vec<String>,
    #[serde(default)]
    pub unlocked_levels: Vec<String>,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            completed_levels: Vec::new(),
            unlocked_levels: vec![LEVELS[0].to_string()],
        }
    }
}

impl ProgressRecord {
    /// Record `level` as complete and unlock the level after it.
    /// Returns false if it was already complete.
    pub fn complete_level(&mut self, level: &str) -> bool {
        self.unlock(level);
        if let Some(next) = next_level(level) {
            self.unlock(next);
        }
        if self.is_completed(level) {
            return false;
        }
        self.completed_levels.push(level.to_string());
        true
    }

    pub fn is_completed(&self, level: &str) -> bool {
        self.completed_levels.iter().any(|l| l == level)
    }

    pub fn is_unlocked(&self, level: &str) -> bool {
        self.unlocked_levels.iter().any(|l| l == level)
    }

    fn unlock(&mut self, level: &str) {
        if !self.is_unlocked(level) {
            self.unlocked_levels.push(level.to_string());
        }
    }
}

pub fn next_level(level: &str) -> Option<&'static str> {
    let i = LEVELS.iter().position(|l| *l == level)?;
    LEVELS.get(i + 1).copied()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub unlocked: bool,
    #[serde(
        default,
        rename = "unlockedAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Achievement id to unlock state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementRecord(pub BTreeMap<String, Achievement>);

impl AchievementRecord {
    /// Unlock `id` at `at`. The first unlock time is kept.
    pub fn unlock(&mut self, id: &str, at: DateTime<Utc>) -> bool {
        let entry = self.0.entry(id.to_string()).or_default();
        if entry.unlocked {
            return false;
        }
        entry.unlocked = true;
        entry.unlocked_at = Some(at);
        true
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.0.get(id).is_some_and(|a| a.unlocked)
    }

    pub fn unlocked_at(&self, id: &str) -> Option<DateTime<Utc>> {
        self.0.get(id).and_then(|a| a.unlocked_at)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Achievement)> {
        self.0.iter()
    }
}

/// What changed when a level was recorded as complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub newly_completed: bool,
    pub unlocked: Option<&'static str>,
    pub achievement: Option<String>,
}

/// Achievement id earned by finishing the slides of `level`.
pub fn deck_achievement(level: &str) -> String {
    format!("deck-{level}")
}

/// Record `level` as complete in both stores.
pub fn record_completion(
    progress: &dyn Store<ProgressRecord>,
    achievements: &dyn Store<AchievementRecord>,
    level: &str,
    at: DateTime<Utc>,
) -> Result<CompletionOutcome> {
    let mut record = progress.load()?;
    let next = next_level(level).filter(|next| !record.is_unlocked(next));
    let newly_completed = record.complete_level(level);
    progress.save(&record)?;

    let mut earned = achievements.load()?;
    let id = deck_achievement(level);
    let achievement = earned.unlock(&id, at).then_some(id);
    achievements.save(&earned)?;

    Ok(CompletionOutcome {
        newly_completed,
        unlocked: next,
        achievement,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_progress_unlocks_first_level() {
        let store = MemoryStore::<ProgressRecord>::default();
        let progress = store.load().unwrap();
        assert_eq!(progress.unlocked_levels, vec!["level-1"]);
        assert!(progress.completed_levels.is_empty());
    }

    #[test]
    fn test_complete_level_unlocks_next() {
        let mut progress = ProgressRecord::default();
        assert!(progress.complete_level("level-1"));
        assert!(!progress.complete_level("level-1"));
        assert!(progress.is_unlocked("level-2"));
        assert_eq!(progress.completed_levels, vec!["level-1"]);
        assert_eq!(progress.unlocked_levels, vec!["level-1", "level-2"]);

        assert!(progress.complete_level("level-6"));
        assert_eq!(next_level("level-6"), None);
        assert!(progress.complete_level("bonus"));
        assert!(progress.is_unlocked("bonus"));
    }

    #[test]
    fn test_progress_json_shape() {
        let store = MemoryStore::default();
        let mut progress = ProgressRecord::default();
        progress.complete_level("level-1");
        store.save(&progress).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&store.raw().unwrap()).unwrap();
        assert_eq!(raw["completedLevels"][0], "level-1");
        assert_eq!(raw["unlockedLevels"][1], "level-2");
        assert_eq!(store.load().unwrap(), progress);
    }

    #[test]
    fn test_corrupt_store_falls_back_to_default() {
        let store = MemoryStore::<ProgressRecord>::with_raw("{not json");
        assert_eq!(store.load().unwrap(), ProgressRecord::default());
    }

    #[test]
    fn test_achievement_keeps_first_unlock() {
        let first = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();
        let mut record = AchievementRecord::default();
        assert!(!record.is_unlocked("deck-level-1"));
        assert!(record.unlock("deck-level-1", first));
        assert!(!record.unlock("deck-level-1", later));
        assert_eq!(record.unlocked_at("deck-level-1"), Some(first));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["deck-level-1"]["unlocked"], true);
        assert!(json["deck-level-1"]["unlockedAt"].is_string());
    }

    #[test]
    fn test_achievement_without_time_parses() {
        let store = MemoryStore::<AchievementRecord>::with_raw(r#"{"first-steps":{"unlocked":false}}"#);
        let record = store.load().unwrap();
        assert!(!record.is_unlocked("first-steps"));
        assert_eq!(record.iter().count(), 1);
    }

    #[test]
    fn test_record_completion_updates_both_stores() {
        let progress = MemoryStore::<ProgressRecord>::default();
        let achievements = MemoryStore::<AchievementRecord>::default();
        let at = Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0).unwrap();

        let first = record_completion(&progress, &achievements, "level-1", at).unwrap();
        assert_eq!(
            first,
            CompletionOutcome {
                newly_completed: true,
                unlocked: Some("level-2"),
                achievement: Some("deck-level-1".to_string()),
            }
        );

        let again = record_completion(&progress, &achievements, "level-1", at).unwrap();
        assert!(!again.newly_completed);
        assert_eq!(again.unlocked, None);
        assert_eq!(again.achievement, None);
        assert!(achievements.load().unwrap().is_unlocked("deck-level-1"));
        assert!(progress.load().unwrap().is_completed("level-1"));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::<ProgressRecord>::new(dir.path().join("nested/progress.json"));
        assert_eq!(store.load().unwrap(), ProgressRecord::default());

        let mut progress = ProgressRecord::default();
        progress.complete_level("level-2");
        store.save(&progress).unwrap();
        assert!(store.path().exists());
        assert_eq!(store.load().unwrap(), progress);
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("achievements.json");
        std::fs::write(&path, "[1, 2").unwrap();
        let store = JsonFileStore::<AchievementRecord>::new(path);
        assert_eq!(store.load().unwrap(), AchievementRecord::default());
    }
}
