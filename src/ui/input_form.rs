use crate::app::{FormField, InputFormState};
use crate::domain::MAX_TEXT_LEN;
use crate::ui::{
    layout::create_modal_area,
    styles::{hint_style, modal_bg_style, modal_title_style, priority_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render the add/edit form
pub fn render_input_form(f: &mut Frame, form: &InputFormState, area: Rect) {
    let modal_area = create_modal_area(area, 16);

    // Clear the area behind the form
    f.render_widget(Clear, modal_area);

    let title_text = if form.editing.is_some() {
        " Edit Task "
    } else {
        " Add Task "
    };

    let mut lines = vec![Line::raw("")];

    let count = format!("Task: ({}/{})", form.text.chars().count(), MAX_TEXT_LEN);
    push_text_field(&mut lines, &count, &form.text, form.field == FormField::Text);

    let priority_label = if form.field == FormField::Priority {
        "Priority (←/→): (editing)"
    } else {
        "Priority:"
    };
    lines.push(Line::raw(priority_label));
    lines.push(Line::from(vec![
        Span::raw("> "),
        Span::styled(form.priority.name(), priority_style(form.priority)),
    ]));
    lines.push(Line::raw(""));

    push_text_field(
        &mut lines,
        "Category:",
        &form.category,
        form.field == FormField::Category,
    );
    push_text_field(
        &mut lines,
        "Due date (YYYY-MM-DD, blank for none):",
        &form.due_date,
        form.field == FormField::DueDate,
    );

    lines.push(Line::styled(
        "Tab switch field  ·  Enter/Ctrl+S save  ·  Esc cancel",
        hint_style(),
    ));

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

fn push_text_field<'a>(lines: &mut Vec<Line<'a>>, label: &str, value: &'a str, active: bool) {
    let label = if active {
        format!("{} (editing)", label)
    } else {
        label.to_string()
    };
    lines.push(Line::raw(label));
    lines.push(Line::from(vec![
        Span::raw("> "),
        Span::styled(value, modal_title_style()),
        if active {
            Span::styled("█", modal_title_style()) // Cursor
        } else {
            Span::raw("")
        },
    ]));
    lines.push(Line::raw(""));
}
