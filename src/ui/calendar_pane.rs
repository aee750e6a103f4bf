use crate::app::AppState;
use crate::schedule::{group_by_date, CalendarEvent};
use crate::ui::styles::{border_style, event_style, hint_style, running_style, title_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render scheduled tasks as an agenda grouped by day
pub fn render_calendar_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let theme = app.settings.theme;
    let events = app.calendar_events();

    let mut lines = vec![calendar_status_line(app.calendar_signed_in()), Line::raw("")];
    if events.is_empty() {
        lines.push(Line::raw("No scheduled tasks. Give a task a date to see it here."));
    }
    for (date, day_events) in group_by_date(&events) {
        lines.push(Line::from(Span::styled(
            date.format("%A, %B %-d %Y").to_string(),
            title_style(theme),
        )));
        for event in day_events {
            lines.push(event_line(event));
        }
        lines.push(Line::raw(""));
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(Span::styled(" Calendar ", title_style(theme))),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn calendar_status_line(signed_in: bool) -> Line<'static> {
    if signed_in {
        Line::from(Span::styled("External calendar: signed in", running_style()))
    } else {
        Line::from(Span::styled("External calendar: signed out (g to sign in)", hint_style()))
    }
}

/// "  09:00  Standup  [overdue]"
fn event_line(event: &CalendarEvent) -> Line<'static> {
    let when = match event.time {
        Some(time) => time.format("%H:%M").to_string(),
        None => "all day".to_string(),
    };
    let mut text = format!("  {when:>7}  {}", event.title);
    let class = event.style.class_name();
    if !class.is_empty() {
        text.push_str(&format!("  [{}]", class.trim_end_matches("-event")));
    }
    Line::from(Span::styled(text, event_style(event.style)))
}
