use super::enums::TaskStatus;
use super::validation::{check_minutes, check_name, check_repeats, ValidationError};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Due time assumed for a scheduled task without a time of day
pub fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

/// A unit of work to time
///
/// Field names are persisted in camelCase so the stored task list keeps
/// the same shape regardless of which front end wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Assigned at creation, never changes
    pub id: Uuid,
    pub name: String,
    /// Focus duration in minutes
    pub focus_time: u32,
    /// Short break in minutes
    pub short_break: u32,
    /// Long break in minutes
    pub long_break: u32,
    /// Focus sessions per cycle before a long break
    pub repeats: u32,
    #[serde(default)]
    pub completed_sessions: u32,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "clock_time")]
    pub scheduled_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

/// Input for creating a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub name: String,
    pub focus_time: u32,
    pub short_break: u32,
    pub long_break: u32,
    pub repeats: u32,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
}

impl TaskDraft {
    pub fn new(name: impl Into<String>, focus_time: u32, short_break: u32, long_break: u32, repeats: u32) -> Self {
        Self {
            name: name.into(),
            focus_time,
            short_break,
            long_break,
            repeats,
            scheduled_date: None,
            scheduled_time: None,
        }
    }

    /// Attach a schedule (time is optional: all-day when absent)
    pub fn scheduled(mut self, date: NaiveDate, time: Option<NaiveTime>) -> Self {
        self.scheduled_date = Some(date);
        self.scheduled_time = time;
        self
    }
}

/// Partial update merged into an existing task
///
/// `None` leaves a field untouched. The schedule fields are doubly optional
/// so a patch can clear them with `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub focus_time: Option<u32>,
    pub short_break: Option<u32>,
    pub long_break: Option<u32>,
    pub repeats: Option<u32>,
    pub completed_sessions: Option<u32>,
    pub scheduled_date: Option<Option<NaiveDate>>,
    pub scheduled_time: Option<Option<NaiveTime>>,
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn completed_sessions(count: u32) -> Self {
        Self {
            completed_sessions: Some(count),
            ..Self::default()
        }
    }

    fn touches_schedule(&self) -> bool {
        self.scheduled_date.is_some() || self.scheduled_time.is_some()
    }
}

impl Task {
    /// Build a validated task with a fresh id
    pub fn new(draft: TaskDraft) -> Result<Self, ValidationError> {
        let name = check_name(&draft.name)?;
        let focus_time = check_minutes("focusTime", draft.focus_time)?;
        let short_break = check_minutes("shortBreak", draft.short_break)?;
        let long_break = check_minutes("longBreak", draft.long_break)?;
        let repeats = check_repeats(draft.repeats)?;

        // A time without a date has nothing to attach to
        let scheduled_time = draft.scheduled_date.and(draft.scheduled_time);
        let status = draft.scheduled_date.map(|_| TaskStatus::Pending);

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            focus_time,
            short_break,
            long_break,
            repeats,
            completed_sessions: 0,
            is_current: false,
            scheduled_date: draft.scheduled_date,
            scheduled_time,
            status,
        })
    }

    /// Check a record read back from storage against the limits of [`Task::new`]
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_name(&self.name)?;
        check_minutes("focusTime", self.focus_time)?;
        check_minutes("shortBreak", self.short_break)?;
        check_minutes("longBreak", self.long_break)?;
        check_repeats(self.repeats)?;
        Ok(())
    }

    /// Merge a patch, validating every field before anything is written
    pub fn apply(&mut self, patch: &TaskPatch) -> Result<(), ValidationError> {
        let name = patch.name.as_deref().map(check_name).transpose()?;
        let focus_time = patch
            .focus_time
            .map(|value| check_minutes("focusTime", value))
            .transpose()?;
        let short_break = patch
            .short_break
            .map(|value| check_minutes("shortBreak", value))
            .transpose()?;
        let long_break = patch
            .long_break
            .map(|value| check_minutes("longBreak", value))
            .transpose()?;
        let repeats = patch.repeats.map(check_repeats).transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(value) = focus_time {
            self.focus_time = value;
        }
        if let Some(value) = short_break {
            self.short_break = value;
        }
        if let Some(value) = long_break {
            self.long_break = value;
        }
        if let Some(value) = repeats {
            self.repeats = value;
        }
        if let Some(count) = patch.completed_sessions {
            self.completed_sessions = count;
        }

        if patch.touches_schedule() {
            if let Some(date) = patch.scheduled_date {
                self.scheduled_date = date;
            }
            if let Some(time) = patch.scheduled_time {
                self.scheduled_time = time;
            }
            if self.scheduled_date.is_none() {
                self.scheduled_time = None;
                self.status = None;
            } else if self.status != Some(TaskStatus::Completed) {
                // A moved deadline is re-evaluated from scratch
                self.status = Some(TaskStatus::Pending);
            }
        }

        if let Some(status) = patch.status {
            self.status = Some(status);
        }
        Ok(())
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled_date.is_some()
    }

    /// Moment the task is due, if scheduled (end of day when no time is set)
    pub fn due_at(&self) -> Option<NaiveDateTime> {
        self.scheduled_date
            .map(|date| date.and_time(self.scheduled_time.unwrap_or_else(end_of_day)))
    }

    /// Completed sessions over repeats (0.0 to 1.0+)
    pub fn progress_ratio(&self) -> f64 {
        if self.repeats == 0 {
            return 1.0;
        }
        self.completed_sessions as f64 / self.repeats as f64
    }
}

/// Serialize a time of day as "HH:MM" (seconds only when non-zero)
mod clock_time {
    use chrono::{NaiveTime, Timelike};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) if time.second() == 0 => serializer.serialize_some(&time.format("%H:%M").to_string()),
            Some(time) => serializer.serialize_some(&time.format("%H:%M:%S").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => NaiveTime::parse_from_str(text, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
                .map(Some)
                .map_err(|error| de::Error::custom(format!("invalid scheduledTime '{text}': {error}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn draft() -> TaskDraft {
        TaskDraft::new("Write report", 25, 5, 15, 4)
    }

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new(draft()).unwrap();
        assert_eq!(task.name, "Write report");
        assert_eq!(task.completed_sessions, 0);
        assert!(!task.is_current);
        assert_eq!(task.status, None);
        assert!(!task.is_scheduled());
    }

    #[test]
    fn test_scheduled_task_starts_pending() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let task = Task::new(draft().scheduled(date, None)).unwrap();
        assert_eq!(task.status, Some(TaskStatus::Pending));
        assert_eq!(
            task.due_at(),
            Some(date.and_hms_opt(23, 59, 59).unwrap())
        );
    }

    #[test]
    fn test_new_task_rejects_invalid_durations() {
        let mut bad = draft();
        bad.focus_time = 0;
        assert_eq!(
            Task::new(bad),
            Err(ValidationError::NonPositive { field: "focusTime" })
        );

        let mut bad = draft();
        bad.repeats = 0;
        assert!(Task::new(bad).is_err());
    }

    #[test]
    fn test_apply_is_all_or_nothing() {
        let mut task = Task::new(draft()).unwrap();
        let patch = TaskPatch {
            name: Some("Renamed".to_string()),
            short_break: Some(0),
            ..TaskPatch::default()
        };
        assert!(task.apply(&patch).is_err());
        assert_eq!(task.name, "Write report");
        assert_eq!(task.short_break, 5);
    }

    #[test]
    fn test_apply_schedule_changes() {
        let mut task = Task::new(draft()).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        task.apply(&TaskPatch {
            scheduled_date: Some(Some(date)),
            scheduled_time: Some(NaiveTime::from_hms_opt(9, 30, 0)),
            ..TaskPatch::default()
        })
        .unwrap();
        assert_eq!(task.status, Some(TaskStatus::Pending));

        task.apply(&TaskPatch::status(TaskStatus::Overdue)).unwrap();
        task.apply(&TaskPatch {
            scheduled_time: Some(NaiveTime::from_hms_opt(18, 0, 0)),
            ..TaskPatch::default()
        })
        .unwrap();
        assert_eq!(task.status, Some(TaskStatus::Pending));

        task.apply(&TaskPatch {
            scheduled_date: Some(None),
            ..TaskPatch::default()
        })
        .unwrap();
        assert_eq!(task.scheduled_time, None);
        assert_eq!(task.status, None);
    }

    #[test]
    fn test_serde_uses_camel_case_and_short_time() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let task = Task::new(draft().scheduled(date, NaiveTime::from_hms_opt(9, 0, 0))).unwrap();
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["focusTime"], 25);
        assert_eq!(json["completedSessions"], 0);
        assert_eq!(json["scheduledDate"], "2024-01-01");
        assert_eq!(json["scheduledTime"], "09:00");
        assert_eq!(json["status"], "pending");

        let back: Task = serde_json::from_value(json).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let id = Uuid::new_v4();
        let raw = format!(
            r#"{{"id":"{id}","name":"Read","focusTime":50,"shortBreak":10,"longBreak":20,"repeats":2}}"#
        );
        let task: Task = serde_json::from_str(&raw).unwrap();
        assert_eq!(task.completed_sessions, 0);
        assert!(!task.is_current);
        assert_eq!(task.scheduled_time, None);
    }
}
