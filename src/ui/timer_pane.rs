use crate::app::AppState;
use crate::domain::{format_countdown, session_badge};
use crate::ui::styles::{border_style, gauge_style, paused_style, running_style, title_style};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

/// Render the countdown, phase and current task progress
pub fn render_timer_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let theme = app.settings.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(" Pomodoro ", title_style(theme)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Padding
            Constraint::Length(1), // Phase
            Constraint::Length(1), // Padding
            Constraint::Length(1), // Countdown
            Constraint::Length(1), // Running state
            Constraint::Length(1), // Padding
            Constraint::Length(1), // Current task
            Constraint::Length(3), // Session gauge
            Constraint::Min(0),
        ])
        .split(inner);

    let session = &app.session;
    let phase = Paragraph::new(Span::styled(session.phase().label(), title_style(theme)))
        .alignment(Alignment::Center);
    f.render_widget(phase, sections[1]);

    let countdown = Paragraph::new(Span::styled(
        format_countdown(session.remaining_seconds()),
        title_style(theme).add_modifier(Modifier::REVERSED),
    ))
    .alignment(Alignment::Center);
    f.render_widget(countdown, sections[3]);

    let state = if session.is_running() {
        Span::styled("● RUNNING", running_style())
    } else {
        Span::styled("⏸  PAUSED", paused_style())
    };
    f.render_widget(Paragraph::new(state).alignment(Alignment::Center), sections[4]);

    let Some(task) = app.registry.current() else {
        let hint = Paragraph::new("No current task. Pick one in the Tasks view (2).")
            .alignment(Alignment::Center);
        f.render_widget(hint, sections[6]);
        return;
    };

    let task_line = Line::from(vec![
        Span::raw("Current task: "),
        Span::styled(task.name.clone(), title_style(theme)),
    ]);
    f.render_widget(Paragraph::new(task_line).alignment(Alignment::Center), sections[6]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).border_style(border_style()))
        .gauge_style(gauge_style(theme))
        .ratio(task.progress_ratio().clamp(0.0, 1.0))
        .label(format!("Sessions {}", session_badge(task)));
    f.render_widget(gauge, sections[7]);
}
