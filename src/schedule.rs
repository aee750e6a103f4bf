//! Calendar projection of scheduled tasks

use crate::domain::{Task, TaskPatch, TaskStatus};
use crate::registry::TaskRegistry;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

/// Display style derived from a task's status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStyle {
    Default,
    Overdue,
    Completed,
}

impl EventStyle {
    pub fn for_status(status: Option<TaskStatus>) -> Self {
        match status {
            Some(TaskStatus::Overdue) => EventStyle::Overdue,
            Some(TaskStatus::Completed) => EventStyle::Completed,
            Some(TaskStatus::Pending) | None => EventStyle::Default,
        }
    }

    /// CSS-like class name for renderers that want one
    pub fn class_name(&self) -> &'static str {
        match self {
            EventStyle::Default => "",
            EventStyle::Overdue => "overdue-event",
            EventStyle::Completed => "completed-event",
        }
    }
}

/// A task as shown on the calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub task_id: Uuid,
    pub title: String,
    /// "YYYY-MM-DD" or "YYYY-MM-DDTHH:MM"
    pub start: String,
    pub all_day: bool,
    pub style: EventStyle,
    #[serde(skip)]
    pub date: NaiveDate,
    #[serde(skip)]
    pub time: Option<NaiveTime>,
}

impl CalendarEvent {
    fn from_task(task: &Task) -> Option<Self> {
        let date = task.scheduled_date?;
        let start = match task.scheduled_time {
            Some(time) => format!("{}T{}", date.format("%Y-%m-%d"), time.format("%H:%M")),
            None => date.format("%Y-%m-%d").to_string(),
        };
        Some(Self {
            task_id: task.id,
            title: task.name.clone(),
            start,
            all_day: task.scheduled_time.is_none(),
            style: EventStyle::for_status(task.status),
            date,
            time: task.scheduled_time,
        })
    }
}

/// Events for every scheduled task, ordered by date then time
/// (all-day events first within a day)
pub fn project_events(tasks: &[Task]) -> Vec<CalendarEvent> {
    let mut events: Vec<CalendarEvent> = tasks.iter().filter_map(CalendarEvent::from_task).collect();
    events.sort_by_key(|event| (event.date, event.time.is_some(), event.time));
    events
}

/// Events grouped by day, preserving order
pub fn group_by_date(events: &[CalendarEvent]) -> Vec<(NaiveDate, Vec<&CalendarEvent>)> {
    let mut groups: Vec<(NaiveDate, Vec<&CalendarEvent>)> = Vec::new();
    for event in events {
        match groups.last_mut() {
            Some((date, bucket)) if *date == event.date => bucket.push(event),
            _ => groups.push((event.date, vec![event])),
        }
    }
    groups
}

/// Whether a pending scheduled task's deadline is strictly before `now`
pub fn is_past_due(task: &Task, now: NaiveDateTime) -> bool {
    task.status == Some(TaskStatus::Pending) && task.due_at().is_some_and(|due| due < now)
}

/// Flip every past-due pending task to overdue
///
/// Returns the ids that changed. Completed and already-overdue tasks are left
/// alone, so running this repeatedly is harmless.
pub fn reconcile_overdue(registry: &mut TaskRegistry, now: NaiveDateTime) -> Vec<Uuid> {
    let due: Vec<Uuid> = registry
        .tasks()
        .iter()
        .filter(|task| is_past_due(task, now))
        .map(|task| task.id)
        .collect();

    let patch = TaskPatch::status(TaskStatus::Overdue);
    let mut flipped = Vec::with_capacity(due.len());
    for id in due {
        match registry.update(id, &patch) {
            Ok(true) => {
                tracing::info!(task_id = %id, "scheduled task is overdue");
                flipped.push(id);
            }
            Ok(false) => {}
            Err(error) => tracing::warn!(task_id = %id, %error, "could not mark task overdue"),
        }
    }
    flipped
}
