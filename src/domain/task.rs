use super::enums::Priority;
use super::error::TaskError;
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum task text length, in characters, after trimming
pub const MAX_TEXT_LEN: usize = 200;

/// Category given to tasks that do not name one
pub const DEFAULT_CATEGORY: &str = "personal";

/// Opaque task identifier
///
/// Newly created tasks get a UUID, but imported data may carry ids in any
/// string format, so the id is kept as an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// User-supplied fields shared by add and edit
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub text: String,
    pub priority: Priority,
    pub category: String,
    pub due_date: Option<NaiveDate>,
}

impl TaskDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            priority: Priority::default(),
            category: DEFAULT_CATEGORY.to_string(),
            due_date: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = due_date;
        self
    }

    /// Trim and check the text, returning the cleaned draft
    pub fn validated(self) -> Result<Self, TaskError> {
        let text = validate_text(&self.text)?;
        let category = match self.category.trim() {
            "" => DEFAULT_CATEGORY.to_string(),
            c => c.to_string(),
        };
        Ok(Self {
            text,
            category,
            ..self
        })
    }
}

/// Trim task text and enforce the empty/length rules
pub fn validate_text(raw: &str) -> Result<String, TaskError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(TaskError::Validation(
            "Please enter a task description!".to_string(),
        ));
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(TaskError::Validation(format!(
            "Task description must be {} characters or less!",
            MAX_TEXT_LEN
        )));
    }
    Ok(text.to_string())
}

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub priority: Priority,
    pub category: String,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Local>,
    /// Present exactly when `completed` is true
    pub completed_at: Option<DateTime<Local>>,
}

impl Task {
    /// Build a new, active task from an already validated draft
    pub fn new(draft: TaskDraft) -> Self {
        Self {
            id: TaskId::generate(),
            text: draft.text,
            completed: false,
            priority: draft.priority,
            category: draft.category,
            due_date: draft.due_date,
            created_at: Local::now(),
            completed_at: None,
        }
    }

    /// Flip completion, keeping `completed_at` in step
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
        self.completed_at = if self.completed {
            Some(Local::now())
        } else {
            None
        };
    }

    /// Overwrite the editable fields; identity and completion are untouched
    pub fn apply(&mut self, draft: TaskDraft) {
        self.text = draft.text;
        self.priority = draft.priority;
        self.category = draft.category;
        self.due_date = draft.due_date;
    }

    /// Case-insensitive exact text match used for duplicate detection
    pub fn has_text(&self, text: &str) -> bool {
        self.text.to_lowercase() == text.to_lowercase()
    }

    /// Due strictly before `today` and still open
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.map_or(false, |due| due < today)
    }
}
