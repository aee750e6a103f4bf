use crate::domain::ThemeName;
use crate::schedule::EventStyle;
use ratatui::style::{Color, Modifier, Style};

/// Accent color of a theme (titles, selection, the countdown)
pub fn accent_color(theme: ThemeName) -> Color {
    match theme {
        ThemeName::Light => Color::Blue,
        ThemeName::Dark => Color::Cyan,
        ThemeName::Blue => Color::LightBlue,
        ThemeName::Purple => Color::Magenta,
        ThemeName::Red => Color::LightRed,
        ThemeName::Green => Color::LightGreen,
        ThemeName::Orange => Color::Rgb(255, 165, 0),
    }
}

/// Default text style
pub fn default_style(theme: ThemeName) -> Style {
    match theme {
        ThemeName::Light => Style::default().fg(Color::Black).bg(Color::White),
        _ => Style::default().fg(Color::White),
    }
}

/// Selected row highlight style
pub fn selected_style(theme: ThemeName) -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(accent_color(theme))
        .add_modifier(Modifier::BOLD)
}

/// Title style for panes
pub fn title_style(theme: ThemeName) -> Style {
    Style::default()
        .fg(accent_color(theme))
        .add_modifier(Modifier::BOLD)
}

/// Border style
pub fn border_style() -> Style {
    Style::default().fg(Color::Gray)
}

/// Running timer badge style
pub fn running_style() -> Style {
    Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD)
}

/// Paused timer badge style
pub fn paused_style() -> Style {
    Style::default().fg(Color::Yellow)
}

/// Session gauge style
pub fn gauge_style(theme: ThemeName) -> Style {
    Style::default().fg(accent_color(theme)).bg(Color::DarkGray)
}

/// Modal background style
pub fn modal_bg_style() -> Style {
    Style::default().bg(Color::DarkGray).fg(Color::White)
}

/// Modal title style
pub fn modal_title_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

/// Keybinding hint style
pub fn hint_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Error message style
pub fn error_style() -> Style {
    Style::default()
        .fg(Color::Red)
        .add_modifier(Modifier::BOLD)
}

/// Calendar event style by status
pub fn event_style(style: EventStyle) -> Style {
    match style {
        EventStyle::Default => Style::default(),
        EventStyle::Overdue => Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD),
        EventStyle::Completed => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::CROSSED_OUT),
    }
}
