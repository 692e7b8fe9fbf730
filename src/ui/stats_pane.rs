use crate::domain::{Stats, Urgency};
use crate::ui::styles::{border_style, default_style, title_style, urgency_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the one-line statistics summary
pub fn render_stats_pane(f: &mut Frame, stats: &Stats, save_pending: bool, area: Rect) {
    // Marks input that hasn't been written yet
    let title = if save_pending { " Stats ● " } else { " Stats " };
    let paragraph = Paragraph::new(stats_line(stats)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(title, title_style())),
    );
    f.render_widget(paragraph, area);
}

fn stats_line(stats: &Stats) -> Line<'static> {
    let overdue_style = if stats.overdue > 0 {
        urgency_style(Urgency::Overdue)
    } else {
        default_style()
    };

    Line::from(vec![
        Span::styled("Total: ", title_style()),
        Span::raw(format!("{}   ", stats.total)),
        Span::styled("Done: ", title_style()),
        Span::raw(format!("{}   ", stats.completed)),
        Span::styled("Pending: ", title_style()),
        Span::raw(format!("{}   ", stats.pending)),
        Span::styled("Overdue: ", title_style()),
        Span::styled(format!("{}   ", stats.overdue), overdue_style),
        Span::styled("Progress: ", title_style()),
        Span::raw(format!("{}%", stats.completion_rate)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_line() {
        let stats = Stats {
            total: 4,
            completed: 1,
            pending: 3,
            overdue: 2,
            completion_rate: 25,
        };
        let line_str = format!("{:?}", stats_line(&stats));
        assert!(line_str.contains("25%"));
        assert!(line_str.contains("Overdue: "));
    }
}
