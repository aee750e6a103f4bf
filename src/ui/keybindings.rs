use crate::domain::{UiMode, View};
use crate::ui::styles::hint_style;
use ratatui::{layout::Rect, text::{Line, Span}, widgets::Paragraph, Frame};

/// Key/action pairs shown for the active view
pub fn hints_for(view: View, mode: UiMode) -> &'static [(&'static str, &'static str)] {
    if mode != UiMode::Normal {
        return &[
            ("Tab/↓", "next field"),
            ("Shift+Tab/↑", "prev field"),
            ("Enter", "save"),
            ("Esc", "cancel"),
        ];
    }
    match view {
        View::Timer => &[
            ("Space", "start/pause"),
            ("r", "reset"),
            ("1-4/Tab", "views"),
            ("q", "quit"),
        ],
        View::Tasks => &[
            ("↑/↓", "select"),
            ("Enter", "make current"),
            ("c", "clear current"),
            ("a", "add"),
            ("e", "edit"),
            ("d", "delete"),
            ("x", "done"),
            ("p", "push to calendar"),
            ("q", "quit"),
        ],
        View::Calendar => &[
            ("g", "sign in/out"),
            ("Space", "start/pause"),
            ("1-4/Tab", "views"),
            ("q", "quit"),
        ],
        View::Settings => &[
            ("↑/↓", "select"),
            ("+/-", "adjust"),
            ("t", "theme"),
            ("q", "quit"),
        ],
    }
}

/// Render the keybindings hint bar
pub fn render_keybindings(f: &mut Frame, view: View, mode: UiMode, area: Rect) {
    let spans: Vec<Span> = hints_for(view, mode)
        .iter()
        .map(|(key, action)| Span::raw(format!(" {key} {action}  ")))
        .collect();

    let paragraph = Paragraph::new(Line::from(spans)).style(hint_style());
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_hints_replace_view_hints() {
        let hints = hints_for(View::Tasks, UiMode::AddingTask);
        assert!(hints.iter().any(|(key, _)| *key == "Esc"));
        assert!(!hints.iter().any(|(key, _)| *key == "q"));
    }

    #[test]
    fn test_every_view_offers_quit() {
        for view in View::all() {
            assert!(hints_for(*view, UiMode::Normal).iter().any(|(key, _)| *key == "q"));
        }
    }
}
