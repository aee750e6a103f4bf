pub mod calendar_pane;
pub mod input_form;
pub mod keybindings;
pub mod layout;
pub mod settings_pane;
pub mod styles;
pub mod tasks_pane;
pub mod timer_pane;

use crate::app::AppState;
use crate::domain::View;
use calendar_pane::render_calendar_pane;
use input_form::render_input_form;
use keybindings::render_keybindings;
use layout::create_layout;
use ratatui::{
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
    Frame,
};
use settings_pane::render_settings_pane;
use styles::{default_style, hint_style, title_style};
use tasks_pane::render_tasks_pane;
use timer_pane::render_timer_pane;

/// Main render function - draws the entire UI
pub fn render(f: &mut Frame, app: &AppState) {
    let size = f.size();
    let theme = app.settings.theme;
    let layout = create_layout(size);

    // Base fill so light themes paint the whole screen
    f.render_widget(Paragraph::new("").style(default_style(theme)), size);

    let titles: Vec<Line> = View::all()
        .iter()
        .enumerate()
        .map(|(idx, view)| Line::raw(format!("{} {}", idx + 1, view.title())))
        .collect();
    let selected = View::all().iter().position(|view| *view == app.view).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(hint_style())
        .highlight_style(title_style(theme));
    f.render_widget(tabs, layout.tabs_area);

    match app.view {
        View::Timer => render_timer_pane(f, app, layout.content_area),
        View::Tasks => render_tasks_pane(f, app, layout.content_area),
        View::Calendar => render_calendar_pane(f, app, layout.content_area),
        View::Settings => render_settings_pane(f, app, layout.content_area),
    }

    if let Some(message) = &app.status_message {
        let status = Paragraph::new(Span::styled(format!(" {message}"), title_style(theme)));
        f.render_widget(status, layout.status_area);
    }

    render_keybindings(f, app.view, app.ui_mode, layout.keybindings_area);

    // Render input form if active
    if app.task_form.is_some() {
        render_input_form(f, app, size);
    }
}
