use crate::domain::{Filter, ListProjection, TaskRow};
use crate::ui::styles::{
    border_style, default_style, done_style, hint_style, priority_style, selected_style,
    tag_style, title_style, urgency_style,
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// Message shown when nothing passes the current filter
pub fn empty_message(filter: Filter, total: usize) -> &'static str {
    if total == 0 {
        return "No tasks yet. Press 'a' to add your first task.";
    }
    match filter {
        Filter::All => "No tasks yet.",
        Filter::Pending => "Nothing pending. Nice work!",
        Filter::Completed => "No completed tasks yet.",
    }
}

/// Render the task list pane
pub fn render_list_pane(f: &mut Frame, projection: &ListProjection, selected: usize, area: Rect) {
    let title = format!(
        " Tasks · {} · sorted by {} ",
        projection.filter.name(),
        projection.sort.name()
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(title, title_style()));

    if projection.is_empty {
        let empty = Paragraph::new(empty_message(projection.filter, projection.stats.total))
            .style(hint_style())
            .block(block)
            .wrap(Wrap { trim: false });
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = projection
        .rows
        .iter()
        .map(|row| ListItem::new(create_task_line(row)).style(default_style()))
        .collect();

    // The state scrolls the list so the selected row stays on screen
    let mut state = ListState::default().with_selected(Some(selected));
    let list = List::new(items)
        .block(block)
        .highlight_style(selected_style());
    f.render_stateful_widget(list, area, &mut state);
}

/// Format: [x] Buy milk  HIGH  [personal]  Due today
fn create_task_line(row: &TaskRow) -> Line<'static> {
    let mut spans = Vec::new();

    let checkbox = if row.completed { "[x] " } else { "[ ] " };
    spans.push(Span::raw(checkbox.to_string()));

    if row.completed {
        spans.push(Span::styled(row.text.clone(), done_style()));
    } else {
        spans.push(Span::raw(row.text.clone()));
    }

    spans.push(Span::raw("  ".to_string()));
    spans.push(Span::styled(
        row.priority.name().to_uppercase(),
        priority_style(row.priority),
    ));

    spans.push(Span::raw("  ".to_string()));
    spans.push(Span::styled(format!("[{}]", row.category), tag_style()));

    if let Some(due) = &row.due {
        spans.push(Span::raw("  ".to_string()));
        spans.push(Span::styled(due.label.clone(), urgency_style(due.urgency)));
    }

    Line::from(spans)
}
