//! Typed reads and writes of the task list, current task and timer state
//!
//! Loads never fail: missing or malformed values fall back to a default with
//! a warning, so a damaged file costs at most the data under its own key.

use super::store::{KeyValueStore, StoreKey};
use crate::domain::{Phase, Task};
use crate::session::SessionSnapshot;
use anyhow::Result;
use serde_json::Value;
use uuid::Uuid;

/// Load a raw value, logging and swallowing store errors
fn load_value(store: &dyn KeyValueStore, key: StoreKey) -> Option<Value> {
    match store.load(key) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(key = key.name(), error = %format!("{error:#}"), "ignoring unreadable stored value");
            None
        }
    }
}

/// Load the task list, skipping records that do not parse or are out of range
pub fn load_tasks(store: &dyn KeyValueStore) -> Vec<Task> {
    let Some(value) = load_value(store, StoreKey::Tasks) else {
        return Vec::new();
    };
    let Value::Array(records) = value else {
        tracing::warn!("stored task list is not an array, starting empty");
        return Vec::new();
    };

    records
        .into_iter()
        .enumerate()
        .filter_map(|(idx, record)| match serde_json::from_value::<Task>(record) {
            Ok(task) => match task.validate() {
                Ok(()) => Some(task),
                Err(error) => {
                    tracing::warn!(index = idx, task_id = %task.id, %error, "skipping invalid task record");
                    None
                }
            },
            Err(error) => {
                tracing::warn!(index = idx, %error, "skipping malformed task record");
                None
            }
        })
        .collect()
}

pub fn save_tasks(store: &mut dyn KeyValueStore, tasks: &[Task]) -> Result<()> {
    store.save(StoreKey::Tasks, &serde_json::to_value(tasks)?)
}

pub fn load_current_id(store: &dyn KeyValueStore) -> Option<Uuid> {
    let value = load_value(store, StoreKey::CurrentTask)?;
    match value.as_str().map(Uuid::parse_str) {
        Some(Ok(id)) => Some(id),
        _ => {
            tracing::warn!("stored current task id is malformed, ignoring it");
            None
        }
    }
}

/// Store the current task id, or remove the key when there is none
pub fn save_current_id(store: &mut dyn KeyValueStore, id: Option<Uuid>) -> Result<()> {
    match id {
        Some(id) => store.save(StoreKey::CurrentTask, &Value::String(id.to_string())),
        None => store.remove(StoreKey::CurrentTask),
    }
}

/// Stored countdown and phase, each independently optional
pub fn load_session(store: &dyn KeyValueStore) -> (Option<u32>, Option<Phase>) {
    let remaining = load_value(store, StoreKey::Timer).and_then(|value| {
        // Older files kept the countdown as a string
        let parsed = match &value {
            Value::Number(number) => number.as_u64(),
            Value::String(text) => text.trim().parse::<u64>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            tracing::warn!("stored countdown is malformed, ignoring it");
        }
        parsed.and_then(|seconds| u32::try_from(seconds).ok())
    });

    let phase = load_value(store, StoreKey::TimerPhase).and_then(|value| {
        let parsed = value.as_str().and_then(Phase::from_name);
        if parsed.is_none() {
            tracing::warn!("stored phase is malformed, ignoring it");
        }
        parsed
    });

    (remaining, phase)
}

pub fn save_session(store: &mut dyn KeyValueStore, snapshot: SessionSnapshot) -> Result<()> {
    store.save(StoreKey::Timer, &Value::from(snapshot.remaining_seconds))?;
    store.save(StoreKey::TimerPhase, &Value::String(snapshot.phase.name().to_string()))
}
