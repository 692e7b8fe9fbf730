pub mod input_form;
pub mod keybindings;
pub mod layout;
pub mod list_pane;
pub mod modal;
pub mod stats_pane;
pub mod styles;
pub mod toasts;

use crate::app::AppState;
use crate::domain::UiMode;
use input_form::render_input_form;
use keybindings::render_keybindings;
use layout::create_layout;
use list_pane::render_list_pane;
use modal::{render_confirm_modal, render_import_prompt};
use ratatui::Frame;
use stats_pane::render_stats_pane;
use toasts::render_toasts;

/// Main render function - draws the entire UI
pub fn render(f: &mut Frame, app: &AppState) {
    let size = f.size();
    let projection = app.render();
    let layout = create_layout(size, app.toasts.len());

    render_keybindings(f, layout.keybindings_area, projection.show_clear_completed);
    render_stats_pane(f, &projection.stats, app.save_pending(), layout.stats_area);
    render_list_pane(f, &projection, app.selected_index, layout.list_area);

    if let Some(toast_area) = layout.toast_area {
        render_toasts(f, &app.toasts, toast_area);
    }

    match app.ui_mode {
        UiMode::AddingTask | UiMode::EditingTask => {
            if let Some(form) = &app.input_form {
                render_input_form(f, form, size);
            }
        }
        UiMode::Confirm => {
            if let Some(pending) = &app.pending_confirm {
                render_confirm_modal(f, pending, size);
            }
        }
        UiMode::ImportPath => render_import_prompt(f, &app.import_path, size),
        UiMode::Normal => {}
    }
}
