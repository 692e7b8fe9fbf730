use crate::app::AppState;
use crate::domain::{Filter, UiMode};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle keyboard input events; returns true when the app should quit
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match app.ui_mode {
        UiMode::Normal => handle_normal_mode(app, key),
        UiMode::AddingTask | UiMode::EditingTask => handle_input_form_mode(app, key),
        UiMode::Confirm => handle_confirm_mode(app, key),
        UiMode::ImportPath => handle_import_path_mode(app, key),
    }
}

/// Handle keys in normal mode
fn handle_normal_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.move_selection_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection_down(),

        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected(),

        KeyCode::Char('a') => app.start_add_task(),
        KeyCode::Char('e') => app.start_edit_selected(),
        KeyCode::Char('x') | KeyCode::Delete => app.request_delete_selected(),

        // Filters
        KeyCode::Char('f') => app.cycle_filter(),
        KeyCode::Char('1') => app.set_filter(Filter::All),
        KeyCode::Char('2') => app.set_filter(Filter::Pending),
        KeyCode::Char('3') => app.set_filter(Filter::Completed),

        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('C') => app.request_clear_completed(),

        KeyCode::Char('i') => app.start_import(),
        KeyCode::Char('o') => app.export_now(),

        KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(true),

        _ => {}
    }
    Ok(false)
}

/// Handle keys while the add/edit form is open
fn handle_input_form_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.cancel_input_form(),
        KeyCode::Enter => app.submit_input_form(),
        KeyCode::Char('s') if ctrl => app.submit_input_form(),
        KeyCode::Tab => app.input_form_next_field(),
        KeyCode::Left => app.input_form_cycle_priority(false),
        KeyCode::Right => app.input_form_cycle_priority(true),
        KeyCode::Backspace => app.input_form_backspace(),
        KeyCode::Char(c) if !ctrl => app.input_form_add_char(c),
        _ => {}
    }
    Ok(false)
}

/// y confirms; n and Esc decline
fn handle_confirm_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.resolve_confirm(true),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.resolve_confirm(false),
        _ => {}
    }
    Ok(false)
}

fn handle_import_path_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => app.cancel_import(),
        KeyCode::Enter => app.submit_import(),
        KeyCode::Backspace => app.import_path_backspace(),
        KeyCode::Char(c) => app.import_path_add_char(c),
        _ => {}
    }
    Ok(false)
}
