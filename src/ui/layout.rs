use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Main layout structure
pub struct MainLayout {
    pub tabs_area: Rect,
    pub content_area: Rect,
    pub status_area: Rect,
    pub keybindings_area: Rect,
}

/// Create the main layout
/// - Top bar: view tabs (1 row)
/// - Main area: the active view
/// - Status line (1 row) above the keybindings bar (1 row)
pub fn create_layout(area: Rect) -> MainLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tabs
            Constraint::Min(0),    // Active view
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Keybindings bar
        ])
        .split(area);

    MainLayout {
        tabs_area: chunks[0],
        content_area: chunks[1],
        status_area: chunks[2],
        keybindings_area: chunks[3],
    }
}

/// Split the tasks view: list on the left, details on the right
pub fn split_list_details(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(65), // List pane
            Constraint::Percentage(35), // Details pane
        ])
        .split(area);
    (chunks[0], chunks[1])
}

/// Create a centered modal area `height` rows tall
pub fn create_modal_area(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    let band = Rect::new(area.x, area.y + (area.height - height) / 2, area.width, height);

    let horizontal_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ])
        .split(band);

    horizontal_chunks[1]
}
