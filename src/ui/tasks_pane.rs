use crate::app::AppState;
use crate::domain::{format_minutes, progress_bar, session_badge, Task, TaskStatus, ThemeName};
use crate::ui::layout::split_list_details;
use crate::ui::styles::{border_style, default_style, error_style, running_style, selected_style, title_style};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

/// Render the task list with the details of the highlighted task
pub fn render_tasks_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let (list_area, details_area) = split_list_details(area);
    render_list(f, app, list_area);
    render_details(f, app, details_area);
}

fn render_list(f: &mut Frame, app: &AppState, area: Rect) {
    let theme = app.settings.theme;
    let items: Vec<ListItem> = app
        .ordered_tasks()
        .into_iter()
        .enumerate()
        .map(|(idx, task)| {
            let style = if idx == app.selected_index {
                selected_style(theme)
            } else {
                default_style(theme)
            };
            ListItem::new(create_task_line(task)).style(style)
        })
        .collect();

    let title = format!(" Tasks ({}) ", app.registry.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(title, title_style(theme)));

    if items.is_empty() {
        let empty = Paragraph::new("No tasks yet. Press 'a' to add one.").block(block);
        f.render_widget(empty, area);
        return;
    }
    f.render_widget(List::new(items).block(block), area);
}

/// Single row: "▶ Write report  25m  2/4 [##--]  PENDING 2024-01-01 09:00"
fn create_task_line(task: &Task) -> Line<'static> {
    let mut spans = Vec::new();

    let marker = if task.is_current { "▶ " } else { "  " };
    spans.push(Span::styled(marker.to_string(), running_style()));
    spans.push(Span::raw(task.name.clone()));
    spans.push(Span::raw(format!(
        "  {}  {} {}",
        format_minutes(task.focus_time),
        session_badge(task),
        progress_bar(task.progress_ratio(), 8)
    )));

    if let Some(status) = task.status {
        spans.push(Span::styled(format!("  {}", status.to_tag()), status_style(status)));
    }
    if let Some(date) = task.scheduled_date {
        let when = match task.scheduled_time {
            Some(time) => format!(" {} {}", date.format("%Y-%m-%d"), time.format("%H:%M")),
            None => format!(" {}", date.format("%Y-%m-%d")),
        };
        spans.push(Span::raw(when));
    }

    Line::from(spans)
}

fn status_style(status: TaskStatus) -> Style {
    match status {
        TaskStatus::Overdue => error_style(),
        TaskStatus::Completed => running_style(),
        TaskStatus::Pending => Style::default(),
    }
}

fn render_details(f: &mut Frame, app: &AppState, area: Rect) {
    let theme = app.settings.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(" Details ", title_style(theme)));

    let Some(task) = app.selected_task() else {
        f.render_widget(Paragraph::new("No task selected").block(block), area);
        return;
    };

    let paragraph = Paragraph::new(detail_lines(task, theme))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn detail_lines(task: &Task, theme: ThemeName) -> Vec<Line<'static>> {
    let field = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:<12}"), title_style(theme)),
            Span::raw(value),
        ])
    };

    let mut lines = vec![
        field("Name:", task.name.clone()),
        Line::raw(""),
        field("Focus:", format_minutes(task.focus_time)),
        field("Short break:", format_minutes(task.short_break)),
        field("Long break:", format_minutes(task.long_break)),
        field("Sessions:", session_badge(task)),
        field(
            "Total:",
            format_minutes(task.focus_time.saturating_mul(task.repeats)),
        ),
        Line::raw(""),
    ];

    match task.due_at() {
        Some(due) => {
            let when = if task.scheduled_time.is_some() {
                due.format("%Y-%m-%d %H:%M").to_string()
            } else {
                format!("{} (all day)", due.format("%Y-%m-%d"))
            };
            lines.push(field("Scheduled:", when));
        }
        None => lines.push(field("Scheduled:", "-".to_string())),
    }
    if let Some(status) = task.status {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<12}", "Status:"), title_style(theme)),
            Span::styled(status.to_tag(), status_style(status)),
        ]));
    }
    if task.is_current {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled("Current task", running_style())));
    }
    lines
}
