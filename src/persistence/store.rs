use super::files::{atomic_write, read_optional};
use super::records::normalize_records;
use crate::domain::{Task, TaskError};
use anyhow::Context;
use chrono::{DateTime, Local};
use serde_json::Value;
use std::path::PathBuf;

/// File holding the serialized task collection
pub const TASKS_KEY: &str = "tasks.json";
/// File holding the RFC 3339 time of the last successful save
pub const LAST_SAVED_KEY: &str = "last_saved";
/// Marker written once the first-run welcome has been shown
pub const WELCOMED_KEY: &str = "welcomed";

/// Persistence collaborator for the task list
pub trait Store {
    /// Load the collection; a store that was never written yields an empty list
    fn load(&self) -> Result<Vec<Task>, TaskError>;

    /// Replace the stored collection and stamp the save time
    fn save(&mut self, tasks: &[Task]) -> Result<(), TaskError>;

    fn last_saved(&self) -> Option<DateTime<Local>>;

    fn welcomed(&self) -> bool;

    fn mark_welcomed(&mut self) -> Result<(), TaskError>;
}

/// Key-value store backed by one file per key in the data directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl Store for JsonFileStore {
    fn load(&self) -> Result<Vec<Task>, TaskError> {
        let path = self.key_path(TASKS_KEY);
        let content = read_optional(&path)
            .map_err(|e| TaskError::persistence("Could not load tasks!", e))?;

        let Some(content) = content else {
            return Ok(Vec::new());
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Corrupt task file: {}", path.display()))
            .map_err(|e| TaskError::persistence("Could not load tasks!", e))?;

        let Value::Array(records) = value else {
            return Err(TaskError::persistence(
                "Could not load tasks!",
                anyhow::anyhow!("{} does not contain a JSON array", path.display()),
            ));
        };

        let normalized = normalize_records(records, Local::now());
        tracing::info!(
            count = normalized.tasks.len(),
            dropped = normalized.dropped,
            "loaded tasks from {}",
            path.display()
        );
        Ok(normalized.tasks)
    }

    fn save(&mut self, tasks: &[Task]) -> Result<(), TaskError> {
        let json = serde_json::to_string(tasks)
            .context("Failed to serialize tasks")
            .map_err(|e| TaskError::persistence("Could not save tasks!", e))?;

        atomic_write(self.key_path(TASKS_KEY), &json)
            .map_err(|e| TaskError::persistence("Could not save tasks!", e))?;
        atomic_write(self.key_path(LAST_SAVED_KEY), &Local::now().to_rfc3339())
            .map_err(|e| TaskError::persistence("Could not save tasks!", e))?;

        tracing::debug!(count = tasks.len(), "saved tasks");
        Ok(())
    }

    fn last_saved(&self) -> Option<DateTime<Local>> {
        let content = read_optional(self.key_path(LAST_SAVED_KEY)).ok()??;
        DateTime::parse_from_rfc3339(content.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Local))
    }

    fn welcomed(&self) -> bool {
        self.key_path(WELCOMED_KEY).exists()
    }

    fn mark_welcomed(&mut self) -> Result<(), TaskError> {
        atomic_write(self.key_path(WELCOMED_KEY), "true")
            .map_err(|e| TaskError::persistence("Could not save settings!", e))
    }
}

/// In-memory store for tests; clones share state so a test can keep a handle
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub inner: std::rc::Rc<std::cell::RefCell<MemoryData>>,
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryData {
    pub tasks: Vec<Task>,
    pub saves: usize,
    pub fail_saves: bool,
    pub welcomed: bool,
    pub last_saved: Option<DateTime<Local>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let store = Self::default();
        store.inner.borrow_mut().tasks = tasks;
        store
    }

    pub fn saves(&self) -> usize {
        self.inner.borrow().saves
    }

    pub fn saved_tasks(&self) -> Vec<Task> {
        self.inner.borrow().tasks.clone()
    }
}

#[cfg(test)]
impl Store for MemoryStore {
    fn load(&self) -> Result<Vec<Task>, TaskError> {
        Ok(self.inner.borrow().tasks.clone())
    }

    fn save(&mut self, tasks: &[Task]) -> Result<(), TaskError> {
        let mut data = self.inner.borrow_mut();
        if data.fail_saves {
            return Err(TaskError::persistence(
                "Could not save tasks!",
                anyhow::anyhow!("simulated failure"),
            ));
        }
        data.tasks = tasks.to_vec();
        data.saves += 1;
        data.last_saved = Some(Local::now());
        Ok(())
    }

    fn last_saved(&self) -> Option<DateTime<Local>> {
        self.inner.borrow().last_saved
    }

    fn welcomed(&self) -> bool {
        self.inner.borrow().welcomed
    }

    fn mark_welcomed(&mut self) -> Result<(), TaskError> {
        self.inner.borrow_mut().welcomed = true;
        Ok(())
    }
}
