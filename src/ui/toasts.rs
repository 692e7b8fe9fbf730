use crate::notifications::{Toast, ToastKind};
use crate::ui::layout::MAX_VISIBLE_TOASTS;
use crate::ui::styles::toast_style;
use ratatui::{
    layout::Rect,
    text::Line,
    widgets::Paragraph,
    Frame,
};

/// Render the newest toasts, one per row
pub fn render_toasts(f: &mut Frame, toasts: &[Toast], area: Rect) {
    let start = toasts.len().saturating_sub(MAX_VISIBLE_TOASTS);
    let lines: Vec<Line> = toasts[start..].iter().map(toast_line).collect();
    f.render_widget(Paragraph::new(lines), area);
}

fn toast_line(toast: &Toast) -> Line<'_> {
    let icon = match toast.kind {
        ToastKind::Success => "✓",
        ToastKind::Error => "✗",
    };
    Line::styled(format!(" {} {} ", icon, toast.message), toast_style(toast.kind))
}
