use crate::app::AppState;
use crate::domain::{UiMode, View};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use std::time::Instant;

/// Handle keyboard input events; `Ok(true)` asks the event loop to quit
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match app.ui_mode {
        UiMode::Normal => handle_normal_mode(app, key),
        UiMode::AddingTask | UiMode::EditingTask => handle_task_form_mode(app, key),
    }
}

/// Handle keys in normal mode: global keys first, then the active view's
fn handle_normal_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(true),

        // View switching
        KeyCode::Tab => {
            app.next_view();
            return Ok(false);
        }
        KeyCode::Char(c @ '1'..='4') => {
            let idx = c as usize - '1' as usize;
            app.set_view(View::all()[idx]);
            return Ok(false);
        }

        // Start/pause works from every view
        KeyCode::Char(' ') => {
            app.toggle_timer(Instant::now());
            return Ok(false);
        }
        _ => {}
    }

    match app.view {
        View::Timer => handle_timer_view(app, key),
        View::Tasks => handle_tasks_view(app, key),
        View::Calendar => handle_calendar_view(app, key),
        View::Settings => handle_settings_view(app, key),
    }
    Ok(false)
}

fn handle_timer_view(app: &mut AppState, key: KeyEvent) {
    if let KeyCode::Char('r') | KeyCode::Char('R') = key.code {
        app.reset_timer();
    }
}

fn handle_tasks_view(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.move_selection_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection_down(),
        KeyCode::Char('a') => app.start_add_task(),
        KeyCode::Char('e') => app.start_edit_task(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_highlighted(),
        KeyCode::Enter => app.select_highlighted(),
        KeyCode::Char('c') => app.clear_current(),
        KeyCode::Char('x') => app.toggle_highlighted_completed(),
        KeyCode::Char('p') => app.push_highlighted_to_calendar(),
        _ => {}
    }
}

fn handle_calendar_view(app: &mut AppState, key: KeyEvent) {
    if let KeyCode::Char('g') = key.code {
        app.toggle_calendar_sign_in();
    }
}

fn handle_settings_view(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.move_setting_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_setting_down(),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => app.adjust_setting(1),
        KeyCode::Char('-') | KeyCode::Char('_') | KeyCode::Left => app.adjust_setting(-1),
        KeyCode::Char('t') => app.cycle_theme(),
        _ => {}
    }
}

/// Handle keys in the task form (adding or editing)
fn handle_task_form_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Enter => app.submit_task_form(),
        KeyCode::Esc => app.cancel_task_form(),
        KeyCode::Tab | KeyCode::Down => app.form_next_field(),
        KeyCode::BackTab | KeyCode::Up => app.form_prev_field(),
        KeyCode::Backspace => app.form_backspace(),
        KeyCode::Char(c) => app.form_add_char(c),
        _ => {}
    }
    Ok(false)
}
