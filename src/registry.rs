use crate::domain::{Task, TaskDraft, TaskPatch, ValidationError};
use std::collections::HashSet;
use uuid::Uuid;

/// Owns the task list and the single "current task" reference
///
/// The current task is held as an id and looked up on demand, so any merge
/// through [`TaskRegistry::update`] is immediately visible through
/// [`TaskRegistry::current`]. Every task's `is_current` flag mirrors that id.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
    current: Option<Uuid>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted parts
    ///
    /// The task list and the current id are stored under separate keys, so a
    /// crash between the two writes can leave a dangling id. A current id that
    /// no longer matches a task is dropped, and `is_current` flags are
    /// normalized to agree with the surviving id.
    ///
    /// A record repeating an earlier id is dropped, keeping the first.
    pub fn restore(tasks: Vec<Task>, current: Option<Uuid>) -> Self {
        let mut seen = HashSet::new();
        let tasks = tasks
            .into_iter()
            .filter(|task| {
                let first = seen.insert(task.id);
                if !first {
                    tracing::warn!(task_id = %task.id, "dropping task with duplicate id");
                }
                first
            })
            .collect();
        let mut registry = Self { tasks, current: None };
        let stored = current.filter(|id| registry.contains(*id));
        if current.is_some() && stored.is_none() {
            tracing::warn!("stored current task no longer exists, ignoring it");
        }
        let current = stored.or_else(|| {
            let recovered = current_flag_owner(&registry.tasks);
            if let Some(id) = recovered {
                tracing::debug!(task_id = %id, "recovered current task from task flags");
            }
            recovered
        });
        registry.mark_current(current);
        registry
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    pub fn current_id(&self) -> Option<Uuid> {
        self.current
    }

    pub fn current(&self) -> Option<&Task> {
        self.current.and_then(|id| self.get(id))
    }

    /// Create a task and append it to the list
    pub fn create(&mut self, draft: TaskDraft) -> Result<Task, ValidationError> {
        let task = Task::new(draft)?;
        tracing::info!(task_id = %task.id, name = %task.name, "task created");
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Merge `patch` into the task with `id`
    ///
    /// Returns `Ok(false)` when no task matches; the list is untouched.
    pub fn update(&mut self, id: Uuid, patch: &TaskPatch) -> Result<bool, ValidationError> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            tracing::debug!(task_id = %id, "update ignored: task not found");
            return Ok(false);
        };
        task.apply(patch)?;
        tracing::debug!(task_id = %id, "task updated");
        Ok(true)
    }

    /// Remove a task, clearing the current reference if it pointed at it
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        if self.tasks.len() == before {
            tracing::debug!(task_id = %id, "delete ignored: task not found");
            return false;
        }
        if self.current == Some(id) {
            self.current = None;
        }
        tracing::info!(task_id = %id, "task deleted");
        true
    }

    /// Select the current task, or clear it with `None`
    ///
    /// Returns `false` (and changes nothing) for an unknown id.
    pub fn set_current(&mut self, id: Option<Uuid>) -> bool {
        if let Some(id) = id {
            if !self.contains(id) {
                tracing::debug!(task_id = %id, "set_current ignored: task not found");
                return false;
            }
        }
        self.mark_current(id);
        match id {
            Some(id) => tracing::info!(task_id = %id, "current task selected"),
            None => tracing::info!("current task cleared"),
        }
        true
    }

    fn mark_current(&mut self, id: Option<Uuid>) {
        for task in &mut self.tasks {
            task.is_current = Some(task.id) == id;
        }
        self.current = id;
    }
}

/// First task carrying an `is_current` flag
fn current_flag_owner(tasks: &[Task]) -> Option<Uuid> {
    tasks.iter().find(|task| task.is_current).map(|task| task.id)
}
