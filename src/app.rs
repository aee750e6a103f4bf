use crate::calendar::{self, CalendarIntegration};
use crate::domain::validation::{
    check_name, parse_minutes, parse_optional_date, parse_optional_time, parse_repeats,
};
use crate::domain::{display_order, Task, TaskDraft, TaskPatch, TaskStatus, UiMode, ValidationError, View};
use crate::notifications;
use crate::persistence::{
    load_current_id, load_session, load_settings, load_tasks, save_current_id, save_session, save_settings,
    save_tasks, KeyValueStore, SettingField, Settings,
};
use crate::registry::TaskRegistry;
use crate::schedule::{self, CalendarEvent};
use crate::session::{PhaseCompletion, PhaseDurations, SessionMachine, TickOutcome, DEFAULT_REPEATS};
use crate::ticker::Ticker;
use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::time::Instant;
use uuid::Uuid;

/// Fields of the task form, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Focus,
    ShortBreak,
    LongBreak,
    Repeats,
    Date,
    Time,
}

impl FormField {
    pub fn all() -> &'static [FormField] {
        &[
            FormField::Name,
            FormField::Focus,
            FormField::ShortBreak,
            FormField::LongBreak,
            FormField::Repeats,
            FormField::Date,
            FormField::Time,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Task name",
            FormField::Focus => "Focus time (min)",
            FormField::ShortBreak => "Short break (min)",
            FormField::LongBreak => "Long break (min)",
            FormField::Repeats => "Repeats",
            FormField::Date => "Date (YYYY-MM-DD)",
            FormField::Time => "Time (HH:MM)",
        }
    }
}

/// Input form state for adding or editing a task
#[derive(Debug, Clone)]
pub struct TaskFormState {
    /// Task being edited, `None` when adding
    pub task_id: Option<Uuid>,
    pub values: [String; 7],
    pub editing_field: usize,
    /// Last validation failure, shown under the form
    pub error: Option<String>,
}

/// Validated contents of the task form
#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedTaskForm {
    name: String,
    focus_time: u32,
    short_break: u32,
    long_break: u32,
    repeats: u32,
    scheduled_date: Option<NaiveDate>,
    scheduled_time: Option<NaiveTime>,
}

impl TaskFormState {
    fn blank(settings: &Settings) -> Self {
        Self {
            task_id: None,
            values: [
                String::new(),
                settings.work.to_string(),
                settings.short_break.to_string(),
                settings.long_break.to_string(),
                DEFAULT_REPEATS.to_string(),
                String::new(),
                String::new(),
            ],
            editing_field: 0,
            error: None,
        }
    }

    fn for_task(task: &Task) -> Self {
        Self {
            task_id: Some(task.id),
            values: [
                task.name.clone(),
                task.focus_time.to_string(),
                task.short_break.to_string(),
                task.long_break.to_string(),
                task.repeats.to_string(),
                task.scheduled_date
                    .map(|date| date.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                task.scheduled_time
                    .map(|time| time.format("%H:%M").to_string())
                    .unwrap_or_default(),
            ],
            editing_field: 0,
            error: None,
        }
    }

    pub fn field(&self) -> FormField {
        FormField::all()[self.editing_field % FormField::all().len()]
    }

    pub fn value(&self, field: FormField) -> &str {
        &self.values[field as usize]
    }

    pub fn is_editing(&self) -> bool {
        self.task_id.is_some()
    }

    fn parse(&self) -> Result<ParsedTaskForm, ValidationError> {
        let scheduled_date = parse_optional_date(self.value(FormField::Date))?;
        let scheduled_time = parse_optional_time(self.value(FormField::Time))?;
        Ok(ParsedTaskForm {
            name: check_name(self.value(FormField::Name))?,
            focus_time: parse_minutes("focusTime", self.value(FormField::Focus))?,
            short_break: parse_minutes("shortBreak", self.value(FormField::ShortBreak))?,
            long_break: parse_minutes("longBreak", self.value(FormField::LongBreak))?,
            repeats: parse_repeats(self.value(FormField::Repeats))?,
            scheduled_date,
            scheduled_time: scheduled_date.and(scheduled_time),
        })
    }
}

impl ParsedTaskForm {
    fn into_draft(self) -> TaskDraft {
        let mut draft = TaskDraft::new(self.name, self.focus_time, self.short_break, self.long_break, self.repeats);
        if let Some(date) = self.scheduled_date {
            draft = draft.scheduled(date, self.scheduled_time);
        }
        draft
    }

    /// Patch that turns `task` into the form contents; the schedule is only
    /// touched when it changed, so an unchanged deadline keeps its status
    fn into_patch(self, task: &Task) -> TaskPatch {
        let schedule_changed =
            task.scheduled_date != self.scheduled_date || task.scheduled_time != self.scheduled_time;
        TaskPatch {
            name: Some(self.name),
            focus_time: Some(self.focus_time),
            short_break: Some(self.short_break),
            long_break: Some(self.long_break),
            repeats: Some(self.repeats),
            scheduled_date: schedule_changed.then_some(self.scheduled_date),
            scheduled_time: schedule_changed.then_some(self.scheduled_time),
            ..TaskPatch::default()
        }
    }
}

/// Main application state
///
/// Created once at startup from a [`KeyValueStore`], mutated only from the
/// event loop, and flushed by [`AppState::shutdown`]. Every mutation writes
/// the affected keys immediately.
pub struct AppState {
    pub registry: TaskRegistry,
    pub session: SessionMachine,
    pub ticker: Ticker,
    pub settings: Settings,
    pub view: View,
    pub ui_mode: UiMode,
    pub selected_index: usize,
    pub settings_index: usize,
    pub task_form: Option<TaskFormState>,
    pub status_message: Option<String>,
    pub notify_on_completion: bool,
    store: Box<dyn KeyValueStore>,
    calendar: Box<dyn CalendarIntegration>,
}

impl AppState {
    /// Restore everything from `store`
    pub fn load(store: Box<dyn KeyValueStore>, calendar: Box<dyn CalendarIntegration>) -> Self {
        let settings = load_settings(store.as_ref());
        let stored_current = load_current_id(store.as_ref());
        let stored_tasks = load_tasks(store.as_ref());
        let stored_count = stored_tasks.len();
        let registry = TaskRegistry::restore(stored_tasks, stored_current);
        let (remaining, phase) = load_session(store.as_ref());
        let durations = PhaseDurations::resolve(registry.current(), settings.durations());
        let session = SessionMachine::restore(remaining, phase, durations);

        tracing::debug!(
            tasks = registry.len(),
            current = ?registry.current_id(),
            phase = session.phase().name(),
            remaining_seconds = session.remaining_seconds(),
            "state restored"
        );

        let mut app = Self {
            registry,
            session,
            ticker: Ticker::default(),
            settings,
            view: View::Timer,
            ui_mode: UiMode::Normal,
            selected_index: 0,
            settings_index: 0,
            task_form: None,
            status_message: None,
            notify_on_completion: true,
            store,
            calendar,
        };

        // Restore dropped a dangling id or a duplicate record
        if app.registry.current_id() != stored_current || app.registry.len() != stored_count {
            app.persist_tasks();
            app.persist_current();
        }
        app
    }

    /// Durations the timer uses right now: the current task's, else settings
    pub fn timer_durations(&self) -> PhaseDurations {
        PhaseDurations::resolve(self.registry.current(), self.settings.durations())
    }

    // ---- tasks -------------------------------------------------------------

    /// Tasks in display order (current first)
    pub fn ordered_tasks(&self) -> Vec<&Task> {
        let tasks = self.registry.tasks();
        display_order(tasks).into_iter().map(|idx| &tasks[idx]).collect()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.ordered_tasks().get(self.selected_index).copied()
    }

    pub fn move_selection_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        if self.selected_index + 1 < self.registry.len() {
            self.selected_index += 1;
        }
    }

    fn clamp_selection(&mut self) {
        self.selected_index = self.selected_index.min(self.registry.len().saturating_sub(1));
    }

    pub fn create_task(&mut self, draft: TaskDraft) -> Result<Uuid, ValidationError> {
        let task = self.registry.create(draft)?;
        self.persist_tasks();
        Ok(task.id)
    }

    /// Merge `patch` into a task; `Ok(false)` when the id is unknown
    pub fn update_task(&mut self, id: Uuid, patch: &TaskPatch) -> Result<bool, ValidationError> {
        let before = self.timer_durations();
        if !self.registry.update(id, patch)? {
            return Ok(false);
        }
        self.persist_tasks();
        self.refit_session(before);
        Ok(true)
    }

    pub fn delete_task(&mut self, id: Uuid) -> bool {
        let before = self.timer_durations();
        let was_current = self.registry.current_id() == Some(id);
        if !self.registry.delete(id) {
            return false;
        }
        self.persist_tasks();
        if was_current {
            self.persist_current();
            self.refit_session(before);
        }
        self.clamp_selection();
        true
    }

    /// Make `id` the current task, or clear it with `None`
    pub fn select_task(&mut self, id: Option<Uuid>) -> bool {
        let before = self.timer_durations();
        if !self.registry.set_current(id) {
            return false;
        }
        self.persist_tasks();
        self.persist_current();
        self.refit_session(before);
        // The current task moves to the top of the list
        if id.is_some() {
            self.selected_index = 0;
        }
        true
    }

    pub fn select_highlighted(&mut self) {
        if let Some(id) = self.selected_task().map(|task| task.id) {
            self.select_task(Some(id));
            self.status_message = Some("Current task changed".to_string());
        }
    }

    pub fn clear_current(&mut self) {
        if self.registry.current_id().is_some() {
            self.select_task(None);
            self.status_message = Some("Current task cleared".to_string());
        }
    }

    pub fn delete_highlighted(&mut self) {
        if let Some((id, name)) = self.selected_task().map(|task| (task.id, task.name.clone())) {
            self.delete_task(id);
            self.status_message = Some(format!("Deleted '{name}'"));
        }
    }

    /// Flip the highlighted task between completed and pending
    ///
    /// Status belongs to the schedule, so unscheduled tasks are refused.
    pub fn toggle_highlighted_completed(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        if !task.is_scheduled() {
            self.status_message = Some(format!("'{}' has no date to complete", task.name));
            return;
        }
        let (id, status) = (task.id, task.status);
        let next = match status {
            Some(TaskStatus::Completed) => TaskStatus::Pending,
            _ => TaskStatus::Completed,
        };
        if let Err(error) = self.update_task(id, &TaskPatch::status(next)) {
            self.status_message = Some(error.to_string());
        }
    }

    /// Restart an untouched countdown when the durations behind it changed
    ///
    /// A countdown already in progress is left alone; the new values apply
    /// from the next phase.
    fn refit_session(&mut self, before: PhaseDurations) {
        let after = self.timer_durations();
        if after == before || !self.session.is_fresh(before) {
            return;
        }
        self.session.rewind(after);
        self.persist_session();
    }

    // ---- task form ---------------------------------------------------------

    pub fn start_add_task(&mut self) {
        self.task_form = Some(TaskFormState::blank(&self.settings));
        self.ui_mode = UiMode::AddingTask;
    }

    pub fn start_edit_task(&mut self) {
        if let Some(form) = self.selected_task().map(TaskFormState::for_task) {
            self.task_form = Some(form);
            self.ui_mode = UiMode::EditingTask;
        }
    }

    pub fn form_next_field(&mut self) {
        if let Some(form) = &mut self.task_form {
            form.editing_field = (form.editing_field + 1) % FormField::all().len();
        }
    }

    pub fn form_prev_field(&mut self) {
        if let Some(form) = &mut self.task_form {
            let len = FormField::all().len();
            form.editing_field = (form.editing_field + len - 1) % len;
        }
    }

    pub fn form_add_char(&mut self, c: char) {
        if let Some(form) = &mut self.task_form {
            let idx = form.editing_field;
            form.values[idx].push(c);
        }
    }

    pub fn form_backspace(&mut self) {
        if let Some(form) = &mut self.task_form {
            let idx = form.editing_field;
            form.values[idx].pop();
        }
    }

    /// Validate and apply the form; on error the form stays open with the
    /// message and nothing is stored
    pub fn submit_task_form(&mut self) {
        let Some(form) = self.task_form.take() else {
            return;
        };

        let parsed = match form.parse() {
            Ok(parsed) => parsed,
            Err(error) => {
                self.task_form = Some(TaskFormState {
                    error: Some(error.to_string()),
                    ..form
                });
                return;
            }
        };

        let outcome = match form.task_id {
            Some(id) => {
                let patch = self.registry.get(id).map(|task| parsed.into_patch(task));
                match patch {
                    Some(patch) => self.update_task(id, &patch).map(|_| "Task updated"),
                    None => Ok("Task no longer exists"),
                }
            }
            None => self.create_task(parsed.into_draft()).map(|_| "Task added"),
        };

        match outcome {
            Ok(message) => {
                self.status_message = Some(message.to_string());
                self.ui_mode = UiMode::Normal;
            }
            Err(error) => {
                self.task_form = Some(TaskFormState {
                    error: Some(error.to_string()),
                    ..form
                });
            }
        }
    }

    pub fn cancel_task_form(&mut self) {
        self.task_form = None;
        self.ui_mode = UiMode::Normal;
    }

    // ---- timer -------------------------------------------------------------

    pub fn start_timer(&mut self, now: Instant) {
        if self.session.start() {
            self.ticker.arm(now);
            tracing::debug!(remaining_seconds = self.session.remaining_seconds(), "timer started");
        }
    }

    pub fn pause_timer(&mut self) {
        self.session.pause();
        self.ticker.cancel();
        self.persist_session();
    }

    pub fn toggle_timer(&mut self, now: Instant) {
        if self.session.is_running() {
            self.pause_timer();
        } else {
            self.start_timer(now);
        }
    }

    pub fn reset_timer(&mut self) {
        self.session.reset(self.timer_durations());
        self.ticker.cancel();
        self.persist_session();
    }

    /// Advance the countdown by every whole second elapsed since the last call
    ///
    /// Returns the phases that completed. The ticker is cancelled as soon as
    /// the session stops running.
    pub fn on_tick(&mut self, now: Instant) -> Vec<PhaseCompletion> {
        let steps = self.ticker.poll(now);
        let mut completions = Vec::new();

        for _ in 0..steps {
            let fallback = self.settings.durations();
            match self.session.tick(&mut self.registry, fallback) {
                TickOutcome::Stopped => break,
                TickOutcome::Counted { .. } => {}
                TickOutcome::Completed(completion) => {
                    self.on_phase_complete(&completion);
                    completions.push(completion);
                }
            }
        }

        if !self.session.is_running() {
            self.ticker.cancel();
        }
        if steps > 0 {
            self.persist_session();
        }
        completions
    }

    fn on_phase_complete(&mut self, completion: &PhaseCompletion) {
        if completion.completed_sessions.is_some() {
            self.persist_tasks();
        }
        self.status_message = Some(format!(
            "{} finished, {} is ready",
            completion.finished.label(),
            completion.next.label()
        ));
        if self.notify_on_completion {
            notifications::notify_phase_complete(completion);
        }
    }

    // ---- views -------------------------------------------------------------

    pub fn set_view(&mut self, view: View) {
        self.view = view;
        if view == View::Calendar {
            self.reconcile_schedule(Local::now().naive_local());
        }
    }

    pub fn next_view(&mut self) {
        self.set_view(self.view.next());
    }

    /// Mark past-due scheduled tasks overdue, returning how many changed
    pub fn reconcile_schedule(&mut self, now: NaiveDateTime) -> usize {
        let flipped = schedule::reconcile_overdue(&mut self.registry, now);
        if !flipped.is_empty() {
            self.persist_tasks();
        }
        flipped.len()
    }

    pub fn calendar_events(&self) -> Vec<CalendarEvent> {
        schedule::project_events(self.registry.tasks())
    }

    pub fn calendar_signed_in(&self) -> bool {
        self.calendar.is_authenticated()
    }

    pub fn toggle_calendar_sign_in(&mut self) {
        let result = if self.calendar.is_authenticated() {
            self.calendar.sign_out().map(|_| "Signed out of calendar")
        } else {
            self.calendar.sign_in().map(|_| "Signed in to calendar")
        };
        self.status_message = Some(match result {
            Ok(message) => message.to_string(),
            Err(error) => format!("Calendar error: {error:#}"),
        });
    }

    /// Send the highlighted task to the external calendar
    pub fn push_highlighted_to_calendar(&mut self) {
        let Some(task) = self.selected_task().cloned() else {
            return;
        };
        let message = if !task.is_scheduled() {
            format!("'{}' has no date to push", task.name)
        } else {
            match calendar::push_task(self.calendar.as_mut(), &task) {
                Ok(true) => format!("Pushed '{}' to calendar", task.name),
                Ok(false) => "Sign in to the calendar first (g in the Calendar view)".to_string(),
                Err(error) => format!("Calendar error: {error:#}"),
            }
        };
        self.status_message = Some(message);
    }

    // ---- settings ----------------------------------------------------------

    pub fn selected_setting(&self) -> SettingField {
        SettingField::all()[self.settings_index % SettingField::all().len()]
    }

    pub fn move_setting_up(&mut self) {
        self.settings_index = self.settings_index.saturating_sub(1);
    }

    pub fn move_setting_down(&mut self) {
        if self.settings_index + 1 < SettingField::all().len() {
            self.settings_index += 1;
        }
    }

    /// Step the highlighted setting (minutes by `delta`, theme cycles)
    pub fn adjust_setting(&mut self, delta: i32) {
        let field = self.selected_setting();
        if field == SettingField::Theme {
            self.cycle_theme();
            return;
        }
        let before = self.timer_durations();
        match self.settings.adjust_minutes(field, delta) {
            Ok(()) => {
                self.persist_settings();
                self.refit_session(before);
            }
            Err(error) => self.status_message = Some(error.to_string()),
        }
    }

    pub fn cycle_theme(&mut self) {
        self.settings.cycle_theme();
        self.persist_settings();
        self.status_message = Some(format!("Theme: {}", self.settings.theme.name()));
    }

    // ---- persistence -------------------------------------------------------

    fn persist_tasks(&mut self) {
        let result = save_tasks(self.store.as_mut(), self.registry.tasks());
        self.report("save tasks", result);
    }

    fn persist_current(&mut self) {
        let result = save_current_id(self.store.as_mut(), self.registry.current_id());
        self.report("save current task", result);
    }

    fn persist_session(&mut self) {
        let result = save_session(self.store.as_mut(), self.session.snapshot());
        self.report("save timer", result);
    }

    fn persist_settings(&mut self) {
        let result = save_settings(self.store.as_mut(), &self.settings);
        self.report("save settings", result);
    }

    fn report(&mut self, action: &str, result: Result<()>) {
        if let Err(error) = result {
            tracing::error!(error = %format!("{error:#}"), "failed to {action}");
            self.status_message = Some(format!("Failed to {action}: {error}"));
        }
    }

    /// Write every key
    pub fn save(&mut self) -> Result<()> {
        save_tasks(self.store.as_mut(), self.registry.tasks())?;
        save_current_id(self.store.as_mut(), self.registry.current_id())?;
        save_session(self.store.as_mut(), self.session.snapshot())?;
        save_settings(self.store.as_mut(), &self.settings)?;
        Ok(())
    }

    /// Stop the timer, drop the pending tick and flush everything
    pub fn shutdown(&mut self) -> Result<()> {
        self.session.pause();
        self.ticker.cancel();
        tracing::info!("shutting down");
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::StubCalendar;
    use crate::domain::Phase;
    use crate::persistence::{FileStore, MemoryStore, StoreKey};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn create_test_app() -> AppState {
        let mut app = AppState::load(Box::new(MemoryStore::new()), Box::new(StubCalendar::new()));
        app.notify_on_completion = false;
        app.create_task(TaskDraft::new("Task 1", 1, 2, 3, 2)).unwrap();
        app.create_task(TaskDraft::new("Task 2", 25, 5, 15, 4)).unwrap();
        app
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn type_into(app: &mut AppState, field: FormField, text: &str) {
        let form = app.task_form.as_mut().unwrap();
        form.editing_field = field as usize;
        form.values[field as usize].clear();
        for c in text.chars() {
            app.form_add_char(c);
        }
    }

    #[test]
    fn test_app_state_new() {
        let app = create_test_app();
        assert_eq!(app.registry.len(), 2);
        assert_eq!(app.selected_index, 0);
        assert_eq!(app.ui_mode, UiMode::Normal);
        assert_eq!(app.view, View::Timer);
        assert_eq!(app.session.remaining_seconds(), 25 * 60);
        assert!(app.task_form.is_none());
    }

    #[test]
    fn test_move_selection() {
        let mut app = create_test_app();

        app.move_selection_down();
        assert_eq!(app.selected_index, 1);

        // Can't go past the end
        app.move_selection_down();
        assert_eq!(app.selected_index, 1);

        app.move_selection_up();
        app.move_selection_up();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_select_task_moves_it_first_and_refits_timer() {
        let mut app = create_test_app();
        app.move_selection_down();
        app.select_highlighted();

        assert_eq!(app.registry.current().unwrap().name, "Task 2");
        assert_eq!(app.ordered_tasks()[0].name, "Task 2");
        assert_eq!(app.selected_index, 0);

        app.move_selection_down();
        app.select_highlighted();
        assert_eq!(app.registry.current().unwrap().name, "Task 1");
        // Untouched countdown follows the new task
        assert_eq!(app.session.remaining_seconds(), 60);
        assert_eq!(app.registry.tasks().iter().filter(|task| task.is_current).count(), 1);
    }

    #[test]
    fn test_select_keeps_countdown_in_progress() {
        let mut app = create_test_app();
        let t0 = Instant::now();
        app.start_timer(t0);
        app.on_tick(t0 + secs(3));
        app.pause_timer();

        app.select_highlighted();
        assert_eq!(app.session.remaining_seconds(), 25 * 60 - 3);
    }

    #[test]
    fn test_timer_ticks_once_per_elapsed_second() {
        let mut app = create_test_app();
        let t0 = Instant::now();

        app.start_timer(t0);
        assert!(app.ticker.is_armed());
        app.on_tick(t0 + Duration::from_millis(250));
        assert_eq!(app.session.remaining_seconds(), 25 * 60);
        app.on_tick(t0 + secs(1));
        assert_eq!(app.session.remaining_seconds(), 25 * 60 - 1);
        app.on_tick(t0 + secs(4));
        assert_eq!(app.session.remaining_seconds(), 25 * 60 - 4);
    }

    #[test]
    fn test_pause_cancels_ticker_and_resume_continues() {
        let mut app = create_test_app();
        let t0 = Instant::now();
        app.start_timer(t0);
        app.on_tick(t0 + secs(2));

        app.toggle_timer(t0 + secs(2));
        assert!(!app.session.is_running());
        assert!(!app.ticker.is_armed());
        assert!(app.on_tick(t0 + secs(60)).is_empty());
        assert_eq!(app.session.remaining_seconds(), 25 * 60 - 2);

        // Resume counts from where it stopped, not from wall-clock time
        app.toggle_timer(t0 + secs(100));
        app.on_tick(t0 + secs(101));
        assert_eq!(app.session.remaining_seconds(), 25 * 60 - 3);
    }

    #[test]
    fn test_completed_work_phase_credits_task_and_stops() {
        let mut app = create_test_app();
        app.select_highlighted();
        let id = app.registry.current_id().unwrap();
        let t0 = Instant::now();

        app.start_timer(t0);
        let completions = app.on_tick(t0 + secs(60));
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].next, Phase::ShortBreak);
        assert_eq!(app.registry.get(id).unwrap().completed_sessions, 1);
        assert_eq!(app.session.phase(), Phase::ShortBreak);
        assert_eq!(app.session.remaining_seconds(), 2 * 60);
        assert!(!app.session.is_running());
        assert!(!app.ticker.is_armed());

        // Extra elapsed seconds after completion do not leak into the break
        assert!(app.on_tick(t0 + secs(90)).is_empty());
        assert_eq!(app.session.remaining_seconds(), 2 * 60);
    }

    #[test]
    fn test_long_break_after_repeats() {
        let mut app = create_test_app();
        app.select_highlighted();
        let mut now = Instant::now();
        let mut phases = Vec::new();

        for _ in 0..4 {
            app.start_timer(now);
            now += secs(u64::from(app.session.remaining_seconds()));
            let completion = app.on_tick(now).pop().unwrap();
            phases.push(completion.next);
        }
        assert_eq!(
            phases,
            vec![Phase::ShortBreak, Phase::Work, Phase::LongBreak, Phase::Work]
        );
    }

    #[test]
    fn test_reset_timer() {
        let mut app = create_test_app();
        let t0 = Instant::now();
        app.start_timer(t0);
        app.on_tick(t0 + secs(5));

        app.reset_timer();
        assert_eq!(app.session.phase(), Phase::Work);
        assert_eq!(app.session.remaining_seconds(), 25 * 60);
        assert!(!app.session.is_running());
        assert!(!app.ticker.is_armed());
    }

    #[test]
    fn test_add_task_through_form() {
        let mut app = create_test_app();
        app.start_add_task();
        assert_eq!(app.ui_mode, UiMode::AddingTask);

        type_into(&mut app, FormField::Name, "Write docs");
        type_into(&mut app, FormField::Date, "2024-03-01");
        type_into(&mut app, FormField::Time, "14:30");
        app.submit_task_form();

        assert_eq!(app.ui_mode, UiMode::Normal);
        assert!(app.task_form.is_none());
        let task = app.registry.tasks().last().unwrap();
        assert_eq!(task.name, "Write docs");
        assert_eq!(task.focus_time, 25);
        assert_eq!(task.repeats, DEFAULT_REPEATS);
        assert_eq!(task.status, Some(TaskStatus::Pending));
        assert_eq!(task.scheduled_time, NaiveTime::from_hms_opt(14, 30, 0));
    }

    #[test]
    fn test_invalid_form_stays_open() {
        let mut app = create_test_app();
        app.start_add_task();
        type_into(&mut app, FormField::Name, "Bad");
        type_into(&mut app, FormField::Focus, "0");
        app.submit_task_form();

        assert_eq!(app.registry.len(), 2);
        assert_eq!(app.ui_mode, UiMode::AddingTask);
        let form = app.task_form.as_ref().unwrap();
        assert_eq!(form.error.as_deref(), Some("focusTime must be greater than zero"));
        assert_eq!(form.value(FormField::Name), "Bad");
    }

    #[test]
    fn test_edit_task_through_form() {
        let mut app = create_test_app();
        app.start_edit_task();
        assert_eq!(app.ui_mode, UiMode::EditingTask);
        assert_eq!(app.task_form.as_ref().unwrap().value(FormField::Name), "Task 1");

        type_into(&mut app, FormField::Name, "Renamed");
        type_into(&mut app, FormField::Repeats, "6");
        app.submit_task_form();

        let task = &app.registry.tasks()[0];
        assert_eq!(task.name, "Renamed");
        assert_eq!(task.repeats, 6);
        assert_eq!(app.registry.len(), 2);
    }

    #[test]
    fn test_edit_without_schedule_change_keeps_overdue() {
        let mut app = create_test_app();
        let id = app
            .create_task(
                TaskDraft::new("Report", 25, 5, 15, 4)
                    .scheduled(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), None),
            )
            .unwrap();
        assert_eq!(app.reconcile_schedule(Local::now().naive_local()), 1);

        app.selected_index = 2;
        app.start_edit_task();
        type_into(&mut app, FormField::Name, "Report v2");
        app.submit_task_form();
        assert_eq!(app.registry.get(id).unwrap().status, Some(TaskStatus::Overdue));
    }

    #[test]
    fn test_delete_current_clears_reference() {
        let mut app = create_test_app();
        app.select_highlighted();
        app.delete_highlighted();

        assert_eq!(app.registry.len(), 1);
        assert_eq!(app.registry.current_id(), None);
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let mut app = create_test_app();
        let ghost = Uuid::new_v4();
        assert!(!app.delete_task(ghost));
        assert!(!app.select_task(Some(ghost)));
        assert_eq!(app.update_task(ghost, &TaskPatch::status(TaskStatus::Completed)), Ok(false));
        assert_eq!(app.registry.len(), 2);
    }

    #[test]
    fn test_toggle_completed() {
        let mut app = create_test_app();
        let id = app.selected_task().unwrap().id;

        app.toggle_highlighted_completed();
        assert_eq!(app.selected_task().unwrap().status, None);
        assert_eq!(app.status_message.as_deref(), Some("'Task 1' has no date to complete"));

        let schedule = TaskPatch {
            scheduled_date: Some(NaiveDate::from_ymd_opt(2030, 1, 2)),
            ..TaskPatch::default()
        };
        assert_eq!(app.update_task(id, &schedule), Ok(true));
        app.toggle_highlighted_completed();
        assert_eq!(app.selected_task().unwrap().status, Some(TaskStatus::Completed));
        app.toggle_highlighted_completed();
        assert_eq!(app.selected_task().unwrap().status, Some(TaskStatus::Pending));
    }

    #[test]
    fn test_calendar_push_requires_sign_in() {
        let mut app = create_test_app();
        app.create_task(
            TaskDraft::new("Meeting", 30, 5, 15, 1).scheduled(
                NaiveDate::from_ymd_opt(2030, 6, 1).unwrap(),
                NaiveTime::from_hms_opt(9, 0, 0),
            ),
        )
        .unwrap();
        app.selected_index = 2;

        app.push_highlighted_to_calendar();
        assert!(app.status_message.as_deref().unwrap().starts_with("Sign in"));

        app.toggle_calendar_sign_in();
        assert!(app.calendar_signed_in());
        app.push_highlighted_to_calendar();
        assert_eq!(app.status_message.as_deref(), Some("Pushed 'Meeting' to calendar"));
        assert_eq!(app.calendar_events().len(), 1);
    }

    #[test]
    fn test_settings_adjust_refits_idle_timer() {
        let mut app = create_test_app();
        app.settings_index = 0;
        app.adjust_setting(5);
        assert_eq!(app.settings.work, 30);
        assert_eq!(app.session.remaining_seconds(), 30 * 60);

        app.settings_index = 3;
        app.adjust_setting(1);
        assert_eq!(app.settings.theme.name(), "blue");
    }

    #[test]
    fn test_state_survives_restart() {
        let temp_dir = tempfile::tempdir().unwrap();
        let t0 = Instant::now();
        let current = {
            let mut app = AppState::load(
                Box::new(FileStore::new(temp_dir.path())),
                Box::new(StubCalendar::new()),
            );
            app.notify_on_completion = false;
            let id = app.create_task(TaskDraft::new("Persisted", 2, 1, 1, 3)).unwrap();
            app.select_task(Some(id));
            app.start_timer(t0);
            app.on_tick(t0 + secs(61));
            app.shutdown().unwrap();
            id
        };

        let app = AppState::load(
            Box::new(FileStore::new(temp_dir.path())),
            Box::new(StubCalendar::new()),
        );
        assert_eq!(app.registry.current_id(), Some(current));
        assert_eq!(app.registry.current().unwrap().name, "Persisted");
        assert_eq!(app.session.remaining_seconds(), 59);
        assert_eq!(app.session.phase(), Phase::Work);
        assert!(!app.session.is_running());
    }

    #[test]
    fn test_shutdown_stops_timer_and_writes_snapshot() {
        let mut app = create_test_app();
        let t0 = Instant::now();
        let id = app.ordered_tasks()[1].id;
        app.select_task(Some(id));
        app.start_timer(t0);
        app.on_tick(t0 + secs(3));
        assert!(app.ticker.is_armed());
        assert!(app.session.is_running());

        app.shutdown().unwrap();
        assert!(!app.ticker.is_armed());
        assert!(!app.session.is_running());
        assert_eq!(
            load_session(app.store.as_ref()),
            (Some(25 * 60 - 3), Some(Phase::Work))
        );
        assert_eq!(load_current_id(app.store.as_ref()), Some(id));

        // Nothing counts down after teardown
        assert!(app.on_tick(t0 + secs(30)).is_empty());
        assert_eq!(app.session.remaining_seconds(), 25 * 60 - 3);
    }

    #[test]
    fn test_invalid_stored_tasks_are_dropped_on_load() {
        let mut store = MemoryStore::new();
        let good = Task::new(TaskDraft::new("Good", 25, 5, 15, 4)).unwrap();
        let mut zero_focus = serde_json::to_value(&good).unwrap();
        zero_focus["id"] = serde_json::json!(Uuid::new_v4().to_string());
        zero_focus["focusTime"] = serde_json::json!(0);
        let duplicate = serde_json::to_value(&good).unwrap();
        let records = serde_json::json!([serde_json::to_value(&good).unwrap(), zero_focus, duplicate]);
        store.save(StoreKey::Tasks, &records).unwrap();
        save_current_id(&mut store, Some(good.id)).unwrap();

        let mut app = AppState::load(Box::new(store), Box::new(StubCalendar::new()));
        assert_eq!(app.registry.len(), 1);
        assert_eq!(app.session.remaining_seconds(), 25 * 60);
        assert!(app.select_task(Some(good.id)));
        assert_eq!(app.registry.tasks().iter().filter(|task| task.is_current).count(), 1);

        // The cleaned list was written back
        assert_eq!(load_tasks(app.store.as_ref()).len(), 1);

        app.start_timer(Instant::now());
        assert!(app.session.is_running());
    }

    #[test]
    fn test_dangling_current_id_is_dropped_on_load() {
        let mut store = MemoryStore::new();
        save_current_id(&mut store, Some(Uuid::new_v4())).unwrap();

        let app = AppState::load(Box::new(store), Box::new(StubCalendar::new()));
        assert_eq!(app.registry.current_id(), None);
    }
}
