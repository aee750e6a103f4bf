use crate::app::{AppState, FormField};
use crate::ui::{
    layout::create_modal_area,
    styles::{error_style, hint_style, modal_bg_style, modal_title_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Rows: a label/value pair per field, the error line and the instructions
const FORM_HEIGHT: u16 = 7 * 2 + 6;

/// Render the form for adding or editing a task
pub fn render_input_form(f: &mut Frame, app: &AppState, area: Rect) {
    let Some(form) = &app.task_form else {
        return;
    };
    let modal_area = create_modal_area(area, FORM_HEIGHT);

    // Clear the area behind the form
    f.render_widget(Clear, modal_area);

    let title_text = if form.is_editing() { " Edit Task " } else { " Add Task " };
    let active = form.field();

    let mut lines = Vec::new();
    for field in FormField::all() {
        let label = if *field == active {
            format!("{}: (editing)", field.label())
        } else {
            format!("{}:", field.label())
        };
        lines.push(Line::raw(label));
        lines.push(Line::from(vec![
            Span::raw("> "),
            Span::styled(form.value(*field).to_string(), modal_title_style()),
            if *field == active {
                Span::styled("█", modal_title_style()) // Cursor
            } else {
                Span::raw("")
            },
        ]));
    }

    lines.push(Line::raw(""));
    match &form.error {
        Some(error) => lines.push(Line::from(Span::styled(error.clone(), error_style()))),
        None => lines.push(Line::raw("")),
    }
    lines.push(Line::from(Span::styled(
        "Tab to switch fields  ·  Enter to save  ·  Esc to cancel",
        hint_style(),
    )));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title_text, modal_title_style()))
                .style(modal_bg_style()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}
