use crate::app::AppState;
use crate::persistence::{SettingField, Settings};
use crate::ui::styles::{border_style, default_style, hint_style, selected_style, title_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

fn setting_value(settings: &Settings, field: SettingField) -> String {
    match settings.minutes(field) {
        Some(minutes) => format!("{minutes} min"),
        None => settings.theme.name().to_string(),
    }
}

/// Render the editable defaults
pub fn render_settings_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let theme = app.settings.theme;
    let selected = app.selected_setting();

    let mut items: Vec<ListItem> = SettingField::all()
        .iter()
        .map(|field| {
            let text = format!("{:<22}{}", field.label(), setting_value(&app.settings, *field));
            let style = if *field == selected {
                selected_style(theme)
            } else {
                default_style(theme)
            };
            ListItem::new(Line::raw(text)).style(style)
        })
        .collect();
    items.push(ListItem::new(Line::raw("")));
    items.push(ListItem::new(Line::from(Span::styled(
        "Used for new tasks and whenever no task is current.",
        hint_style(),
    ))));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(" Settings ", title_style(theme)));
    f.render_widget(List::new(items).block(block), area);
}
