use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone};

use crate::domain::Task;

/// An external calendar that scheduled tasks can be pushed to
///
/// Implementations are swappable; the application only talks to this trait.
pub trait CalendarIntegration {
    fn is_authenticated(&self) -> bool;
    fn sign_in(&mut self) -> anyhow::Result<()>;
    fn sign_out(&mut self) -> anyhow::Result<()>;
    /// Create an event; `Ok(false)` when the integration declined (e.g. not signed in)
    fn create_calendar_event(
        &mut self,
        summary: &str,
        description: &str,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> anyhow::Result<bool>;
}

/// Placeholder integration: sign-in is simulated and event creation is only
/// logged
#[derive(Debug, Default)]
pub struct StubCalendar {
    authenticated: bool,
    created: Vec<String>,
}

impl StubCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Summaries of the events "created" so far
    pub fn created(&self) -> &[String] {
        &self.created
    }
}

impl CalendarIntegration for StubCalendar {
    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn sign_in(&mut self) -> anyhow::Result<()> {
        tracing::info!("signing in to external calendar (simulated)");
        self.authenticated = true;
        Ok(())
    }

    fn sign_out(&mut self) -> anyhow::Result<()> {
        tracing::info!("signing out of external calendar (simulated)");
        self.authenticated = false;
        Ok(())
    }

    fn create_calendar_event(
        &mut self,
        summary: &str,
        description: &str,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> anyhow::Result<bool> {
        if !self.authenticated {
            tracing::warn!("sign in to the external calendar first");
            return Ok(false);
        }
        tracing::info!(
            summary,
            description,
            start = %start.to_rfc3339(),
            end = %end.to_rfc3339(),
            "creating calendar event (simulated)"
        );
        self.created.push(summary.to_string());
        Ok(true)
    }
}

/// Start and end of the event a scheduled task maps to: from its due moment,
/// lasting one focus session
pub fn event_window(task: &Task) -> Option<(DateTime<Local>, DateTime<Local>)> {
    let due = task.due_at()?;
    let start = to_local(due)?;
    Some((start, start + Duration::minutes(i64::from(task.focus_time))))
}

fn to_local(naive: NaiveDateTime) -> Option<DateTime<Local>> {
    Local.from_local_datetime(&naive).earliest()
}

/// Push a scheduled task to `calendar`; `Ok(false)` if the task has no
/// schedule or the integration declined
pub fn push_task(calendar: &mut dyn CalendarIntegration, task: &Task) -> anyhow::Result<bool> {
    let Some((start, end)) = event_window(task) else {
        return Ok(false);
    };
    let description = format!(
        "{} min focus, {}/{} sessions",
        task.focus_time, task.completed_sessions, task.repeats
    );
    calendar.create_calendar_event(&task.name, &description, start, end)
}
