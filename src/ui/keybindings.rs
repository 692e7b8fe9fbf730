use crate::ui::styles::hint_style;
use ratatui::{layout::Rect, text::{Line, Span}, widgets::Paragraph, Frame};

/// Render the keybindings hint bar
pub fn render_keybindings(f: &mut Frame, area: Rect, show_clear_completed: bool) {
    let mut hints = vec![
        Span::raw(" ↑/↓ select   "),
        Span::raw("Space done   "),
        Span::raw("a add   "),
        Span::raw("e edit   "),
        Span::raw("x delete   "),
        Span::raw("f/1/2/3 filter   "),
        Span::raw("s sort   "),
    ];
    if show_clear_completed {
        hints.push(Span::raw("C clear done   "));
    }
    hints.push(Span::raw("i import   "));
    hints.push(Span::raw("o export   "));
    hints.push(Span::raw("q quit"));

    let paragraph = Paragraph::new(Line::from(hints)).style(hint_style());
    f.render_widget(paragraph, area);
}
