use crate::domain::{
    compute_stats, derive_view, project, Filter, ListProjection, Priority, SortKey, Stats, Task,
    TaskDraft, TaskError, TaskId, UiMode, DEFAULT_CATEGORY,
};
use crate::notifications::{Cue, Toast, ToastDurations, ToastKind};
use crate::persistence::{export_to_dir, parse_import, read_import_file, SaveDebouncer, Store};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Yes/no capability used before destructive operations
///
/// The task list never talks to a display surface itself: the TUI answers
/// from its confirmation modal, the CLI from stdin or `--yes`.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Prompt shown before deleting a task
pub fn delete_prompt(text: &str) -> String {
    format!("Are you sure you want to delete \"{}\"?", text)
}

/// Prompt shown before clearing completed tasks
pub fn clear_prompt(count: usize) -> String {
    format!("Are you sure you want to delete {} completed tasks?", count)
}

/// Field focused in the add/edit form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Text,
    Priority,
    Category,
    DueDate,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            Self::Text => Self::Priority,
            Self::Priority => Self::Category,
            Self::Category => Self::DueDate,
            Self::DueDate => Self::Text,
        }
    }
}

/// Input form state for adding or editing a task
#[derive(Debug, Clone)]
pub struct InputFormState {
    pub text: String,
    pub priority: Priority,
    pub category: String,
    pub due_date: String, // YYYY-MM-DD or blank
    pub field: FormField,
    /// Task bound to the edit modal; None when adding
    pub editing: Option<TaskId>,
}

impl InputFormState {
    fn blank() -> Self {
        Self {
            text: String::new(),
            priority: Priority::default(),
            category: DEFAULT_CATEGORY.to_string(),
            due_date: String::new(),
            field: FormField::Text,
            editing: None,
        }
    }

    fn for_task(task: &Task) -> Self {
        Self {
            text: task.text.clone(),
            priority: task.priority,
            category: task.category.clone(),
            due_date: task
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            field: FormField::Text,
            editing: Some(task.id.clone()),
        }
    }

    /// Turn the form fields into a draft (date parsing is the only check here)
    pub fn to_draft(&self) -> Result<TaskDraft, TaskError> {
        Ok(TaskDraft::new(self.text.clone())
            .with_priority(self.priority)
            .with_category(self.category.clone())
            .with_due_date(parse_due_date(&self.due_date)?))
    }
}

/// Parse a user-typed due date; blank means none
pub fn parse_due_date(raw: &str) -> Result<Option<NaiveDate>, TaskError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| TaskError::Validation("Due date must look like YYYY-MM-DD!".to_string()))
}

/// Destructive action waiting on the confirmation modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    Delete(TaskId),
    ClearCompleted,
}

#[derive(Debug, Clone)]
pub struct PendingConfirm {
    pub action: ConfirmAction,
    pub prompt: String,
}

/// Runtime knobs taken from the configuration
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub toasts: ToastDurations,
    pub debounce: Duration,
    /// Where `export` writes backups
    pub export_dir: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            toasts: ToastDurations::default(),
            debounce: Duration::from_millis(crate::persistence::DEFAULT_DEBOUNCE_MS),
            export_dir: PathBuf::from("."),
        }
    }
}

/// Main application state: the task list plus the UI state around it
pub struct AppState {
    pub tasks: Vec<Task>, // newest first
    pub filter: Filter,
    pub sort: SortKey,
    pub selected_index: usize, // index into the current view
    pub ui_mode: UiMode,
    pub input_form: Option<InputFormState>,
    pub pending_confirm: Option<PendingConfirm>,
    pub import_path: String,
    pub toasts: Vec<Toast>,
    cues: Vec<Cue>,
    settings: AppSettings,
    store: Box<dyn Store>,
    debouncer: SaveDebouncer,
    /// Most recent failed write, kept until someone takes it
    save_error: Option<TaskError>,
}

impl AppState {
    fn empty(store: Box<dyn Store>, settings: AppSettings) -> Self {
        Self {
            tasks: Vec::new(),
            filter: Filter::default(),
            sort: SortKey::default(),
            selected_index: 0,
            ui_mode: UiMode::Normal,
            input_form: None,
            pending_confirm: None,
            import_path: String::new(),
            toasts: Vec::new(),
            cues: Vec::new(),
            debouncer: SaveDebouncer::new(settings.debounce),
            save_error: None,
            settings,
            store,
        }
    }

    /// Load the collection from the store; load failures start empty
    pub fn new(store: Box<dyn Store>, settings: AppSettings) -> Self {
        let mut app = Self::empty(store, settings);

        match app.store.load() {
            Ok(tasks) => app.tasks = tasks,
            Err(err) => {
                tracing::warn!("starting with an empty list: {:#}", anyhow::Error::new(err));
                app.push_error("Could not load tasks!");
            }
        }

        app
    }

    /// Like [`AppState::new`] but a load failure is returned, so one-shot
    /// commands never overwrite a file they could not read
    pub fn open(store: Box<dyn Store>, settings: AppSettings) -> Result<Self, TaskError> {
        let mut app = Self::empty(store, settings);
        app.tasks = app.store.load()?;
        Ok(app)
    }

    /// Greet a first-time user with an empty list, once per data directory
    pub fn welcome_if_new(&mut self) {
        if !self.tasks.is_empty() || self.store.welcomed() {
            return;
        }
        self.push_success("Welcome to taskdeck! Add your first task with 'a'.", Cue::Success);
        if let Err(err) = self.store.mark_welcomed() {
            tracing::warn!("could not record welcome: {}", err);
        }
    }

    // ---------------------------------------------------------------------
    // Task list operations
    // ---------------------------------------------------------------------

    /// Add a task to the front of the list
    pub fn add(&mut self, draft: TaskDraft) -> Result<Task, TaskError> {
        let draft = draft.validated()?;
        if self.tasks.iter().any(|t| t.has_text(&draft.text)) {
            return Err(TaskError::Duplicate);
        }

        let task = Task::new(draft);
        tracing::info!(id = task.id.as_str(), priority = task.priority.name(), "task added");
        self.tasks.insert(0, task.clone());
        self.persist();
        self.push_success("Task added successfully!", Cue::Added);
        Ok(task)
    }

    /// Flip completion; returns the new state
    pub fn toggle(&mut self, id: &TaskId) -> Result<bool, TaskError> {
        let task = self.find_mut(id)?;
        task.toggle();
        let completed = task.completed;
        tracing::info!(id = id.as_str(), completed, "task toggled");

        self.persist();
        self.cues.push(if completed { Cue::Completed } else { Cue::Uncompleted });
        Ok(completed)
    }

    /// Delete a task after confirmation; Ok(false) when declined
    pub fn remove(&mut self, id: &TaskId, confirm: &mut impl Confirm) -> Result<bool, TaskError> {
        let index = self.index_of(id)?;
        if !confirm.confirm(&delete_prompt(&self.tasks[index].text)) {
            return Ok(false);
        }

        self.tasks.remove(index);
        tracing::info!(id = id.as_str(), "task deleted");
        self.persist();
        self.clamp_selection();
        self.push_success("Task deleted successfully!", Cue::Success);
        Ok(true)
    }

    /// Update text/priority/category/due date; duplicates are not re-checked
    pub fn edit(&mut self, id: &TaskId, draft: TaskDraft) -> Result<Task, TaskError> {
        let draft = draft.validated()?;
        let task = self.find_mut(id)?;
        task.apply(draft);
        let updated = task.clone();
        tracing::info!(id = id.as_str(), "task edited");

        self.persist();
        self.push_success("Task updated successfully!", Cue::Success);
        Ok(updated)
    }

    /// Remove every completed task after confirmation; Ok(None) when declined
    pub fn clear_completed(&mut self, confirm: &mut impl Confirm) -> Result<Option<usize>, TaskError> {
        let count = self.completed_count();
        if count == 0 {
            return Err(TaskError::NoOp);
        }
        if !confirm.confirm(&clear_prompt(count)) {
            return Ok(None);
        }

        self.tasks.retain(|t| !t.completed);
        tracing::info!(count, "completed tasks cleared");
        self.persist();
        self.clamp_selection();
        self.push_success(&format!("{} completed tasks cleared!", count), Cue::Success);
        Ok(Some(count))
    }

    pub fn set_filter(&mut self, filter: Filter) {
        tracing::debug!(filter = filter.name(), "filter changed");
        self.filter = filter;
        self.clamp_selection();
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        tracing::debug!(sort = sort.name(), "sort changed");
        self.sort = sort;
        self.clamp_selection();
    }

    /// Filtered and sorted tasks for the current settings
    pub fn view(&self) -> Vec<&Task> {
        derive_view(&self.tasks, self.filter, self.sort)
    }

    /// Display projection for today
    pub fn render(&self) -> ListProjection {
        self.render_at(Local::now().date_naive())
    }

    pub fn render_at(&self, today: NaiveDate) -> ListProjection {
        project(&self.tasks, self.filter, self.sort, today)
    }

    pub fn stats(&self) -> Stats {
        compute_stats(&self.tasks, Local::now().date_naive())
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Replace the whole collection with imported JSON content
    pub fn import_content(&mut self, content: &str) -> Result<usize, TaskError> {
        let tasks = parse_import(content)?;
        Ok(self.replace_all(tasks))
    }

    /// Replace the whole collection with the content of a file
    pub fn import_file(&mut self, path: &Path) -> Result<usize, TaskError> {
        let tasks = read_import_file(path)?;
        Ok(self.replace_all(tasks))
    }

    fn replace_all(&mut self, tasks: Vec<Task>) -> usize {
        let count = tasks.len();
        self.tasks = tasks;
        tracing::info!(count, "tasks imported");
        self.persist();
        self.clamp_selection();
        self.push_success("Tasks imported successfully!", Cue::Success);
        count
    }

    /// Write a dated JSON backup into the export directory
    pub fn export(&mut self) -> Result<PathBuf, TaskError> {
        let path = export_to_dir(&self.tasks, &self.settings.export_dir)
            .map_err(|e| TaskError::persistence("Could not export tasks!", e))?;
        self.push_success("Tasks exported successfully!", Cue::Success);
        Ok(path)
    }

    // ---------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------

    /// Save now; failures are returned and memory stays authoritative
    pub fn save(&mut self) -> Result<(), TaskError> {
        self.debouncer.cancel();
        self.store.save(&self.tasks)
    }

    /// Save immediately after a structural change, reporting failures
    fn persist(&mut self) {
        match self.save() {
            Ok(()) => self.save_error = None,
            Err(err) => {
                tracing::warn!(error = ?err, "save failed");
                self.push_error("Could not save tasks!");
                self.save_error = Some(err);
            }
        }
    }

    /// The last save failure since the previous call, if the latest save failed
    pub fn take_save_error(&mut self) -> Option<TaskError> {
        self.save_error.take()
    }

    /// A generic input event happened; save once things go quiet
    pub fn note_input(&mut self, now: Instant) {
        self.debouncer.schedule(now);
    }

    pub fn save_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn last_saved(&self) -> Option<chrono::DateTime<Local>> {
        self.store.last_saved()
    }

    /// Periodic housekeeping: expire toasts and fire a due debounced save
    pub fn tick(&mut self, now: Instant) {
        self.toasts.retain(|t| !t.is_expired(now));
        if self.debouncer.take_due(now) {
            self.persist();
        }
    }

    // ---------------------------------------------------------------------
    // Notifications
    // ---------------------------------------------------------------------

    fn push_success(&mut self, message: &str, cue: Cue) {
        self.toasts.push(Toast {
            kind: ToastKind::Success,
            message: message.to_string(),
            expires_at: Instant::now() + self.settings.toasts.success,
        });
        self.cues.push(cue);
    }

    fn push_error(&mut self, message: &str) {
        self.toasts.push(Toast {
            kind: ToastKind::Error,
            message: message.to_string(),
            expires_at: Instant::now() + self.settings.toasts.error,
        });
        self.cues.push(Cue::Error);
    }

    /// Surface an error to the user (unknown ids stay silent)
    pub fn report(&mut self, err: &TaskError) {
        if err.is_reported() {
            self.push_error(&err.to_string());
        } else {
            tracing::debug!("ignored: {}", err);
        }
    }

    /// Cues queued since the last call
    pub fn take_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    fn find_mut(&mut self, id: &TaskId) -> Result<&mut Task, TaskError> {
        self.tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| TaskError::NotFound(id.clone()))
    }

    fn index_of(&self, id: &TaskId) -> Result<usize, TaskError> {
        self.tasks
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| TaskError::NotFound(id.clone()))
    }

    /// Id of the highlighted row in the current view
    pub fn selected_task_id(&self) -> Option<TaskId> {
        self.view().get(self.selected_index).map(|t| t.id.clone())
    }

    pub fn move_selection_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        let len = self.view().len();
        if self.selected_index + 1 < len {
            self.selected_index += 1;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.view().len();
        self.selected_index = self.selected_index.min(len.saturating_sub(1));
    }

    pub fn cycle_filter(&mut self) {
        self.set_filter(self.filter.next());
    }

    pub fn cycle_sort(&mut self) {
        self.set_sort(self.sort.next());
    }

    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_task_id() {
            if let Err(err) = self.toggle(&id) {
                self.report(&err);
            }
            // The task may have left the current filter
            self.clamp_selection();
        }
    }

    // ---------------------------------------------------------------------
    // Add/edit form
    // ---------------------------------------------------------------------

    /// Open the form for a new task
    pub fn start_add_task(&mut self) {
        self.input_form = Some(InputFormState::blank());
        self.ui_mode = UiMode::AddingTask;
    }

    /// Open the edit modal bound to the selected task
    pub fn start_edit_selected(&mut self) {
        if let Some(id) = self.selected_task_id() {
            self.open_edit(&id);
        }
    }

    pub fn open_edit(&mut self, id: &TaskId) {
        if let Some(task) = self.tasks.iter().find(|t| &t.id == id) {
            self.input_form = Some(InputFormState::for_task(task));
            self.ui_mode = UiMode::EditingTask;
        }
    }

    pub fn input_form_next_field(&mut self) {
        if let Some(form) = &mut self.input_form {
            form.field = form.field.next();
        }
    }

    /// Left/right on the priority field
    pub fn input_form_cycle_priority(&mut self, forward: bool) {
        if let Some(form) = &mut self.input_form {
            if form.field == FormField::Priority {
                form.priority = if forward { form.priority.next() } else { form.priority.prev() };
            }
        }
    }

    pub fn input_form_add_char(&mut self, c: char) {
        if let Some(form) = &mut self.input_form {
            match form.field {
                FormField::Text => form.text.push(c),
                FormField::Category => form.category.push(c),
                FormField::DueDate => form.due_date.push(c),
                FormField::Priority => {}
            }
        }
        self.note_input(Instant::now());
    }

    pub fn input_form_backspace(&mut self) {
        if let Some(form) = &mut self.input_form {
            match form.field {
                FormField::Text => {
                    form.text.pop();
                }
                FormField::Category => {
                    form.category.pop();
                }
                FormField::DueDate => {
                    form.due_date.pop();
                }
                FormField::Priority => {}
            }
        }
        self.note_input(Instant::now());
    }

    /// Submit the form; invalid input keeps it open and reports why
    pub fn submit_input_form(&mut self) {
        let Some(form) = self.input_form.clone() else {
            return;
        };

        let result = form.to_draft().and_then(|draft| match &form.editing {
            Some(id) => self.edit(id, draft).map(|_| ()),
            None => self.add(draft).map(|task| {
                // Highlight the new task if it is visible
                if let Some(pos) = self.view().iter().position(|t| t.id == task.id) {
                    self.selected_index = pos;
                }
            }),
        });

        match result {
            Ok(()) => self.close_input_form(),
            Err(err @ TaskError::NotFound(_)) => {
                self.report(&err);
                self.close_input_form();
            }
            Err(err) => self.report(&err),
        }
    }

    /// Cancel or dismiss the form; clears the bound task
    pub fn cancel_input_form(&mut self) {
        self.close_input_form();
    }

    fn close_input_form(&mut self) {
        self.input_form = None;
        self.ui_mode = UiMode::Normal;
    }

    // ---------------------------------------------------------------------
    // Confirmation modal
    // ---------------------------------------------------------------------

    pub fn request_delete_selected(&mut self) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        if let Some(task) = self.tasks.iter().find(|t| t.id == id) {
            self.pending_confirm = Some(PendingConfirm {
                prompt: delete_prompt(&task.text),
                action: ConfirmAction::Delete(id),
            });
            self.ui_mode = UiMode::Confirm;
        }
    }

    pub fn request_clear_completed(&mut self) {
        let count = self.completed_count();
        if count == 0 {
            self.report(&TaskError::NoOp);
            return;
        }
        self.pending_confirm = Some(PendingConfirm {
            action: ConfirmAction::ClearCompleted,
            prompt: clear_prompt(count),
        });
        self.ui_mode = UiMode::Confirm;
    }

    /// Answer the open confirmation modal
    pub fn resolve_confirm(&mut self, answer: bool) {
        let Some(pending) = self.pending_confirm.take() else {
            return;
        };
        self.ui_mode = UiMode::Normal;

        let mut reply = |_: &str| answer;
        let result = match pending.action {
            ConfirmAction::Delete(id) => self.remove(&id, &mut reply).map(|_| ()),
            ConfirmAction::ClearCompleted => self.clear_completed(&mut reply).map(|_| ()),
        };
        if let Err(err) = result {
            self.report(&err);
        }
    }

    // ---------------------------------------------------------------------
    // Import / export
    // ---------------------------------------------------------------------

    pub fn start_import(&mut self) {
        self.import_path.clear();
        self.ui_mode = UiMode::ImportPath;
    }

    pub fn import_path_add_char(&mut self, c: char) {
        self.import_path.push(c);
    }

    pub fn import_path_backspace(&mut self) {
        self.import_path.pop();
    }

    pub fn cancel_import(&mut self) {
        self.import_path.clear();
        self.ui_mode = UiMode::Normal;
    }

    pub fn submit_import(&mut self) {
        let path = PathBuf::from(self.import_path.trim());
        self.cancel_import();
        if path.as_os_str().is_empty() {
            return;
        }
        if let Err(err) = self.import_file(&path) {
            tracing::warn!("import of {} failed: {}", path.display(), err);
            self.report(&err);
        }
    }

    pub fn export_now(&mut self) {
        match self.export() {
            Ok(path) => tracing::info!("backup written to {}", path.display()),
            Err(err) => {
                tracing::warn!("export failed: {:#}", anyhow::Error::new(err));
                self.push_error("Could not export tasks!");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::store::MemoryStore;
    use chrono::Duration as ChronoDuration;
    use pretty_assertions::assert_eq;

    fn create_test_app() -> (AppState, MemoryStore) {
        let store = MemoryStore::default();
        let app = AppState::new(Box::new(store.clone()), AppSettings::default());
        (app, store)
    }

    fn yes() -> impl FnMut(&str) -> bool {
        |_: &str| true
    }

    fn no() -> impl FnMut(&str) -> bool {
        |_: &str| false
    }

    fn view_texts(app: &AppState) -> Vec<String> {
        app.view().iter().map(|t| t.text.clone()).collect()
    }

    #[test]
    fn test_add_shows_first_in_created_view() {
        let (mut app, store) = create_test_app();
        app.add(TaskDraft::new("First")).unwrap();
        let task = app.add(TaskDraft::new("  Second  ")).unwrap();

        assert_eq!(task.text, "Second");
        assert_eq!(view_texts(&app), vec!["Second", "First"]);
        assert_eq!(app.tasks[0].id, task.id);
        assert_eq!(store.saves(), 2);
        assert_eq!(store.saved_tasks().len(), 2);
    }

    #[test]
    fn test_example_scenario() {
        let (mut app, _store) = create_test_app();
        app.add(TaskDraft::new("Buy milk").with_priority(Priority::High)).unwrap();
        app.add(TaskDraft::new("Walk dog").with_priority(Priority::Low)).unwrap();

        assert_eq!(view_texts(&app), vec!["Walk dog", "Buy milk"]);

        app.set_sort(SortKey::Priority);
        assert_eq!(view_texts(&app), vec!["Buy milk", "Walk dog"]);
    }

    #[test]
    fn test_add_rejects_case_insensitive_duplicate() {
        let (mut app, store) = create_test_app();
        app.add(TaskDraft::new("Buy milk")).unwrap();

        let result = app.add(TaskDraft::new("BUY MILK"));
        assert!(matches!(result, Err(TaskError::Duplicate)));
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(store.saves(), 1);
    }

    #[test]
    fn test_add_validation() {
        let (mut app, _store) = create_test_app();
        assert!(matches!(app.add(TaskDraft::new("   ")), Err(TaskError::Validation(_))));
        assert!(matches!(
            app.add(TaskDraft::new("x".repeat(201))),
            Err(TaskError::Validation(_))
        ));
        assert!(app.tasks.is_empty());
    }

    #[test]
    fn test_add_queues_toast_and_cue() {
        let (mut app, _store) = create_test_app();
        app.add(TaskDraft::new("x")).unwrap();

        assert_eq!(app.toasts.last().unwrap().kind, ToastKind::Success);
        assert_eq!(app.take_cues(), vec![Cue::Added]);
        assert!(app.take_cues().is_empty());
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let (mut app, _store) = create_test_app();
        let task = app.add(TaskDraft::new("x")).unwrap();
        app.take_cues();

        assert!(app.toggle(&task.id).unwrap());
        assert!(app.tasks[0].completed_at.is_some());

        assert!(!app.toggle(&task.id).unwrap());
        assert!(!app.tasks[0].completed);
        assert!(app.tasks[0].completed_at.is_none());

        assert_eq!(app.take_cues(), vec![Cue::Completed, Cue::Uncompleted]);
    }

    #[test]
    fn test_toggle_unknown_id() {
        let (mut app, store) = create_test_app();
        let result = app.toggle(&TaskId::from("missing"));
        assert!(matches!(result, Err(TaskError::NotFound(_))));
        assert_eq!(store.saves(), 0);
    }

    #[test]
    fn test_remove_requires_confirmation() {
        let (mut app, _store) = create_test_app();
        let task = app.add(TaskDraft::new("Buy milk")).unwrap();

        let mut seen = String::new();
        let declined = app
            .remove(&task.id, &mut |prompt: &str| {
                seen = prompt.to_string();
                false
            })
            .unwrap();
        assert!(!declined);
        assert!(seen.contains("Buy milk"));
        assert_eq!(app.tasks.len(), 1);

        assert!(app.remove(&task.id, &mut yes()).unwrap());
        assert!(app.tasks.is_empty());
        assert_eq!(app.toasts.last().unwrap().message, "Task deleted successfully!");
    }

    #[test]
    fn test_remove_unknown_id() {
        let (mut app, _store) = create_test_app();
        let result = app.remove(&TaskId::from("nope"), &mut yes());
        assert!(matches!(result, Err(TaskError::NotFound(_))));
    }

    #[test]
    fn test_edit_preserves_identity_and_completion() {
        let (mut app, _store) = create_test_app();
        let task = app.add(TaskDraft::new("Old")).unwrap();
        app.toggle(&task.id).unwrap();
        let before = app.tasks[0].clone();

        let due = NaiveDate::from_ymd_opt(2030, 1, 2);
        let edited = app
            .edit(
                &task.id,
                TaskDraft::new(" New ")
                    .with_priority(Priority::High)
                    .with_category("work")
                    .with_due_date(due),
            )
            .unwrap();

        assert_eq!(edited.text, "New");
        assert_eq!(edited.priority, Priority::High);
        assert_eq!(edited.category, "work");
        assert_eq!(edited.due_date, due);
        assert_eq!(edited.id, before.id);
        assert_eq!(edited.created_at, before.created_at);
        assert_eq!(edited.completed, before.completed);
        assert_eq!(edited.completed_at, before.completed_at);
    }

    #[test]
    fn test_edit_skips_duplicate_check() {
        let (mut app, _store) = create_test_app();
        app.add(TaskDraft::new("Alpha")).unwrap();
        let beta = app.add(TaskDraft::new("Beta")).unwrap();

        let edited = app.edit(&beta.id, TaskDraft::new("alpha")).unwrap();
        assert_eq!(edited.text, "alpha");
    }

    #[test]
    fn test_edit_errors() {
        let (mut app, _store) = create_test_app();
        let task = app.add(TaskDraft::new("x")).unwrap();

        assert!(matches!(
            app.edit(&task.id, TaskDraft::new("")),
            Err(TaskError::Validation(_))
        ));
        assert!(matches!(
            app.edit(&TaskId::from("missing"), TaskDraft::new("y")),
            Err(TaskError::NotFound(_))
        ));
        assert_eq!(app.tasks[0].text, "x");
    }

    #[test]
    fn test_clear_completed_with_nothing_completed() {
        let (mut app, store) = create_test_app();
        app.add(TaskDraft::new("x")).unwrap();
        let saves = store.saves();

        let mut asked = false;
        let result = app.clear_completed(&mut |_: &str| {
            asked = true;
            true
        });
        assert!(matches!(result, Err(TaskError::NoOp)));
        assert!(!asked);
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(store.saves(), saves);
    }

    #[test]
    fn test_clear_completed() {
        let (mut app, _store) = create_test_app();
        let a = app.add(TaskDraft::new("a")).unwrap();
        app.add(TaskDraft::new("b")).unwrap();
        let c = app.add(TaskDraft::new("c")).unwrap();
        app.toggle(&a.id).unwrap();
        app.toggle(&c.id).unwrap();

        assert_eq!(app.clear_completed(&mut no()).unwrap(), None);
        assert_eq!(app.tasks.len(), 3);

        let mut prompt_seen = String::new();
        let cleared = app
            .clear_completed(&mut |prompt: &str| {
                prompt_seen = prompt.to_string();
                true
            })
            .unwrap();
        assert_eq!(cleared, Some(2));
        assert!(prompt_seen.contains('2'));
        assert_eq!(view_texts(&app), vec!["b"]);
        assert_eq!(app.toasts.last().unwrap().message, "2 completed tasks cleared!");
    }

    #[test]
    fn test_filter_and_sort_do_not_persist() {
        let (mut app, store) = create_test_app();
        app.add(TaskDraft::new("x")).unwrap();
        let saves = store.saves();

        app.set_filter(Filter::Completed);
        app.set_sort(SortKey::Category);
        assert!(app.view().is_empty());
        assert_eq!(store.saves(), saves);
    }

    #[test]
    fn test_render_is_pure() {
        let (mut app, _store) = create_test_app();
        app.add(TaskDraft::new("low").with_priority(Priority::Low)).unwrap();
        app.add(TaskDraft::new("high").with_priority(Priority::High)).unwrap();
        app.set_sort(SortKey::Priority);
        let before: Vec<String> = app.tasks.iter().map(|t| t.text.clone()).collect();

        let projection = app.render();
        assert_eq!(projection.rows[0].text, "high");
        assert_eq!(projection.stats.total, 2);
        assert!(!projection.show_clear_completed);

        let after: Vec<String> = app.tasks.iter().map(|t| t.text.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_save_failure_is_reported_not_fatal() {
        let (mut app, store) = create_test_app();
        store.inner.borrow_mut().fail_saves = true;

        app.add(TaskDraft::new("kept in memory")).unwrap();
        assert_eq!(app.tasks.len(), 1);
        assert!(app
            .toasts
            .iter()
            .any(|t| t.kind == ToastKind::Error && t.message == "Could not save tasks!"));
    }

    #[test]
    fn test_save_failure_can_be_taken_once() {
        let (mut app, store) = create_test_app();
        store.inner.borrow_mut().fail_saves = true;
        app.add(TaskDraft::new("x")).unwrap();

        assert!(matches!(app.take_save_error(), Some(TaskError::Persistence { .. })));
        assert!(app.take_save_error().is_none());

        store.inner.borrow_mut().fail_saves = false;
        app.add(TaskDraft::new("y")).unwrap();
        assert!(app.take_save_error().is_none());
    }

    #[test]
    fn test_new_loads_from_store() {
        let existing = Task::new(TaskDraft::new("From disk"));
        let store = MemoryStore::with_tasks(vec![existing.clone()]);
        let app = AppState::new(Box::new(store), AppSettings::default());
        assert_eq!(app.tasks, vec![existing]);
        assert!(app.toasts.is_empty());
    }

    #[test]
    fn test_load_failure_starts_empty_or_fails_open() {
        struct BrokenStore;

        impl Store for BrokenStore {
            fn load(&self) -> Result<Vec<Task>, TaskError> {
                Err(TaskError::persistence("Could not load tasks!", anyhow::anyhow!("corrupt")))
            }
            fn save(&mut self, _tasks: &[Task]) -> Result<(), TaskError> {
                Ok(())
            }
            fn last_saved(&self) -> Option<chrono::DateTime<Local>> {
                None
            }
            fn welcomed(&self) -> bool {
                true
            }
            fn mark_welcomed(&mut self) -> Result<(), TaskError> {
                Ok(())
            }
        }

        let app = AppState::new(Box::new(BrokenStore), AppSettings::default());
        assert!(app.tasks.is_empty());
        assert_eq!(app.toasts[0].kind, ToastKind::Error);

        assert!(AppState::open(Box::new(BrokenStore), AppSettings::default()).is_err());
    }

    #[test]
    fn test_welcome_shown_once() {
        let store = MemoryStore::default();
        let mut app = AppState::new(Box::new(store.clone()), AppSettings::default());
        app.welcome_if_new();
        assert_eq!(app.toasts.len(), 1);
        assert!(store.inner.borrow().welcomed);

        let mut again = AppState::new(Box::new(store), AppSettings::default());
        again.welcome_if_new();
        assert!(again.toasts.is_empty());
    }

    #[test]
    fn test_no_welcome_with_existing_tasks() {
        let store = MemoryStore::with_tasks(vec![Task::new(TaskDraft::new("x"))]);
        let mut app = AppState::new(Box::new(store.clone()), AppSettings::default());
        app.welcome_if_new();
        assert!(app.toasts.is_empty());
        assert!(!store.inner.borrow().welcomed);
    }

    #[test]
    fn test_debounced_save_fires_on_tick() {
        let (mut app, store) = create_test_app();
        let start = Instant::now();

        app.note_input(start);
        app.note_input(start + Duration::from_millis(200));
        assert!(app.save_pending());

        app.tick(start + Duration::from_millis(600));
        assert_eq!(store.saves(), 0);

        app.tick(start + Duration::from_millis(700));
        assert_eq!(store.saves(), 1);
        assert!(!app.save_pending());
    }

    #[test]
    fn test_structural_save_cancels_pending_write() {
        let (mut app, store) = create_test_app();
        let start = Instant::now();
        app.note_input(start);

        app.add(TaskDraft::new("x")).unwrap();
        assert!(!app.save_pending());

        app.tick(start + Duration::from_secs(5));
        assert_eq!(store.saves(), 1);
    }

    #[test]
    fn test_tick_expires_toasts() {
        let (mut app, _store) = create_test_app();
        app.add(TaskDraft::new("x")).unwrap();
        assert_eq!(app.toasts.len(), 1);

        app.tick(Instant::now() + Duration::from_secs(4));
        assert!(app.toasts.is_empty());
    }

    #[test]
    fn test_error_toast_outlives_success_toast() {
        let (mut app, _store) = create_test_app();
        app.add(TaskDraft::new("x")).unwrap();
        app.report(&TaskError::Duplicate);

        app.tick(Instant::now() + Duration::from_secs(4));
        assert_eq!(app.toasts.len(), 1);
        assert_eq!(app.toasts[0].kind, ToastKind::Error);
    }

    #[test]
    fn test_not_found_is_not_reported() {
        let (mut app, _store) = create_test_app();
        app.report(&TaskError::NotFound(TaskId::from("x")));
        assert!(app.toasts.is_empty());
        assert!(app.take_cues().is_empty());
    }

    #[test]
    fn test_import_replaces_collection() {
        let (mut app, store) = create_test_app();
        app.add(TaskDraft::new("old")).unwrap();

        let count = app
            .import_content(r#"[{"text":"imported","priority":"high"},{"text":"second"}]"#)
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(app.tasks[0].text, "imported");
        assert_eq!(app.tasks[0].priority, Priority::High);
        assert_eq!(store.saved_tasks().len(), 2);
    }

    #[test]
    fn test_import_non_array_leaves_tasks_untouched() {
        let (mut app, _store) = create_test_app();
        app.add(TaskDraft::new("keep me")).unwrap();

        let result = app.import_content(r#"{"tasks": []}"#);
        assert!(matches!(result, Err(TaskError::ImportFormat(_))));
        assert_eq!(view_texts(&app), vec!["keep me"]);
    }

    #[test]
    fn test_export_then_import_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::default();
        let settings = AppSettings {
            export_dir: temp_dir.path().to_path_buf(),
            ..AppSettings::default()
        };
        let mut app = AppState::new(Box::new(store), settings);
        let a = app
            .add(TaskDraft::new("a").with_due_date(NaiveDate::from_ymd_opt(2024, 1, 1)))
            .unwrap();
        app.add(TaskDraft::new("b").with_category("work")).unwrap();
        app.toggle(&a.id).unwrap();
        let original = app.tasks.clone();

        let path = app.export().unwrap();
        app.import_file(&path).unwrap();
        assert_eq!(app.tasks, original);
    }

    #[test]
    fn test_form_add_flow() {
        let (mut app, _store) = create_test_app();
        app.start_add_task();
        assert_eq!(app.ui_mode, UiMode::AddingTask);

        for c in "Read book".chars() {
            app.input_form_add_char(c);
        }
        app.input_form_next_field();
        app.input_form_cycle_priority(true);
        app.input_form_next_field();
        app.input_form_next_field();
        for c in "2030-01-15".chars() {
            app.input_form_add_char(c);
        }
        app.submit_input_form();

        assert_eq!(app.ui_mode, UiMode::Normal);
        assert!(app.input_form.is_none());
        assert_eq!(app.tasks[0].text, "Read book");
        assert_eq!(app.tasks[0].priority, Priority::High);
        assert_eq!(app.tasks[0].due_date, NaiveDate::from_ymd_opt(2030, 1, 15));
        // Typing scheduled a write, the add flushed it
        assert!(!app.save_pending());
    }

    #[test]
    fn test_form_invalid_input_stays_open() {
        let (mut app, _store) = create_test_app();
        app.start_add_task();
        app.submit_input_form();

        assert_eq!(app.ui_mode, UiMode::AddingTask);
        assert!(app.input_form.is_some());
        assert_eq!(app.toasts.last().unwrap().kind, ToastKind::Error);
    }

    #[test]
    fn test_form_bad_due_date() {
        let (mut app, _store) = create_test_app();
        app.start_add_task();
        app.input_form.as_mut().unwrap().text = "x".to_string();
        app.input_form.as_mut().unwrap().due_date = "tomorrow".to_string();
        app.submit_input_form();

        assert!(app.tasks.is_empty());
        assert!(app.input_form.is_some());
    }

    #[test]
    fn test_edit_modal_binds_and_clears_task() {
        let editing = |app: &AppState| app.input_form.as_ref().and_then(|f| f.editing.clone());
        let (mut app, _store) = create_test_app();
        let task = app.add(TaskDraft::new("Draft")).unwrap();

        app.start_edit_selected();
        assert_eq!(app.ui_mode, UiMode::EditingTask);
        assert_eq!(editing(&app), Some(task.id.clone()));
        assert_eq!(app.input_form.as_ref().unwrap().text, "Draft");

        app.cancel_input_form();
        assert_eq!(app.ui_mode, UiMode::Normal);
        assert!(editing(&app).is_none());
        assert_eq!(app.tasks[0].text, "Draft");

        app.start_edit_selected();
        app.input_form.as_mut().unwrap().text = "Final".to_string();
        app.submit_input_form();
        assert!(editing(&app).is_none());
        assert_eq!(app.tasks[0].text, "Final");
    }

    #[test]
    fn test_confirm_modal_delete() {
        let (mut app, _store) = create_test_app();
        app.add(TaskDraft::new("Buy milk")).unwrap();

        app.request_delete_selected();
        assert_eq!(app.ui_mode, UiMode::Confirm);
        assert!(app.pending_confirm.as_ref().unwrap().prompt.contains("Buy milk"));

        app.resolve_confirm(false);
        assert_eq!(app.ui_mode, UiMode::Normal);
        assert_eq!(app.tasks.len(), 1);

        app.request_delete_selected();
        app.resolve_confirm(true);
        assert!(app.tasks.is_empty());
    }

    #[test]
    fn test_request_clear_with_nothing_completed() {
        let (mut app, _store) = create_test_app();
        app.add(TaskDraft::new("x")).unwrap();

        app.request_clear_completed();
        assert_eq!(app.ui_mode, UiMode::Normal);
        assert!(app.pending_confirm.is_none());
        assert_eq!(app.toasts.last().unwrap().message, "No completed tasks to clear!");
    }

    #[test]
    fn test_toggle_selected_clamps_under_filter() {
        let (mut app, _store) = create_test_app();
        app.add(TaskDraft::new("a")).unwrap();
        app.add(TaskDraft::new("b")).unwrap();
        app.set_filter(Filter::Pending);
        app.move_selection_down();
        assert_eq!(app.selected_index, 1);

        app.toggle_selected();
        assert_eq!(app.view().len(), 1);
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_stats_counts_overdue() {
        let (mut app, _store) = create_test_app();
        let yesterday = Local::now().date_naive() - ChronoDuration::days(1);
        app.add(TaskDraft::new("late").with_due_date(Some(yesterday))).unwrap();
        app.add(TaskDraft::new("done")).unwrap();
        let done_id = app.tasks[0].id.clone();
        app.toggle(&done_id).unwrap();

        let stats = app.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.completion_rate, 50);
    }
}
