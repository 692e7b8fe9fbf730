use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Most toasts shown at once
pub const MAX_VISIBLE_TOASTS: usize = 3;

/// Main layout structure
pub struct MainLayout {
    pub keybindings_area: Rect,
    pub stats_area: Rect,
    pub list_area: Rect,
    /// Only present while toasts are showing
    pub toast_area: Option<Rect>,
}

/// Create the main layout
/// - Top bar: keybindings (1 row)
/// - Stats pane (3 rows, bordered)
/// - Task list (rest)
/// - Toasts at the bottom, one row each
pub fn create_layout(area: Rect, toast_count: usize) -> MainLayout {
    let toast_rows = toast_count.min(MAX_VISIBLE_TOASTS) as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),          // Keybindings bar
            Constraint::Length(3),          // Stats
            Constraint::Min(0),             // Task list
            Constraint::Length(toast_rows), // Toasts
        ])
        .split(area);

    MainLayout {
        keybindings_area: chunks[0],
        stats_area: chunks[1],
        list_area: chunks[2],
        toast_area: (toast_rows > 0).then_some(chunks[3]),
    }
}

/// Create centered modal area for forms and prompts
pub fn create_modal_area(area: Rect, height: u16) -> Rect {
    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Length(height),
            Constraint::Percentage(25),
        ])
        .split(area);

    let horizontal_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ])
        .split(vertical_chunks[1]);

    horizontal_chunks[1]
}
