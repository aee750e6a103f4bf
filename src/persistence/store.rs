use super::files::{read_if_present, remove_if_present, write_atomic};
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Logical keys of the persisted state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// Full task list
    Tasks,
    /// Id of the current task (absent when none)
    CurrentTask,
    /// Countdown seconds
    Timer,
    /// Phase name
    TimerPhase,
    /// General settings record
    Settings,
}

impl StoreKey {
    pub fn name(&self) -> &'static str {
        match self {
            StoreKey::Tasks => "tasks",
            StoreKey::CurrentTask => "current_task",
            StoreKey::Timer => "timer",
            StoreKey::TimerPhase => "timer_phase",
            StoreKey::Settings => "settings",
        }
    }
}

/// Durable key-value storage for JSON values
///
/// Writes are synchronous. There is no transaction across keys.
pub trait KeyValueStore {
    fn save(&mut self, key: StoreKey, value: &Value) -> Result<()>;
    fn load(&self, key: StoreKey) -> Result<Option<Value>>;
    fn remove(&mut self, key: StoreKey) -> Result<()>;
}

/// One pretty-printed JSON file per key inside the data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: StoreKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.name()))
    }
}

impl KeyValueStore for FileStore {
    fn save(&mut self, key: StoreKey, value: &Value) -> Result<()> {
        let mut json = serde_json::to_vec_pretty(value)?;
        json.push(b'\n');
        write_atomic(&self.path_for(key), &json)
    }

    fn load(&self, key: StoreKey) -> Result<Option<Value>> {
        let path = self.path_for(key);
        let Some(content) = read_if_present(&path)? else {
            return Ok(None);
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        let value = serde_json::from_str(&content)
            .with_context(|| format!("Malformed JSON in {}", path.display()))?;
        Ok(Some(value))
    }

    fn remove(&mut self, key: StoreKey) -> Result<()> {
        remove_if_present(&self.path_for(key))
    }
}

/// Volatile store, for tests and throwaway sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<StoreKey, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn save(&mut self, key: StoreKey, value: &Value) -> Result<()> {
        self.entries.insert(key, value.clone());
        Ok(())
    }

    fn load(&self, key: StoreKey) -> Result<Option<Value>> {
        Ok(self.entries.get(&key).cloned())
    }

    fn remove(&mut self, key: StoreKey) -> Result<()> {
        self.entries.remove(&key);
        Ok(())
    }
}
