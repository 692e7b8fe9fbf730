use super::files::atomic_write;
use super::records::normalize_records;
use crate::domain::{Task, TaskError};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Backup file name for a given day, e.g. todo-backup-2024-05-10.json
pub fn export_file_name(date: NaiveDate) -> String {
    format!("todo-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Pretty-printed JSON snapshot of the collection
pub fn export_json(tasks: &[Task]) -> Result<String> {
    serde_json::to_string_pretty(tasks).context("Failed to serialize tasks")
}

/// Write a dated snapshot into `dir`, returning the file path
pub fn export_to_dir(tasks: &[Task], dir: &Path) -> Result<PathBuf> {
    let path = dir.join(export_file_name(Local::now().date_naive()));
    atomic_write(&path, &export_json(tasks)?)?;
    tracing::info!(count = tasks.len(), "exported tasks to {}", path.display());
    Ok(path)
}

/// Parse imported content; anything but a JSON array is rejected
pub fn parse_import(content: &str) -> Result<Vec<Task>, TaskError> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| TaskError::ImportFormat(e.to_string()))?;

    let Value::Array(records) = value else {
        return Err(TaskError::ImportFormat("expected a JSON array of tasks".to_string()));
    };

    let normalized = normalize_records(records, Local::now());
    if normalized.dropped > 0 {
        tracing::warn!(dropped = normalized.dropped, "skipped unusable records during import");
    }
    Ok(normalized.tasks)
}

/// Read and parse an import file
pub fn read_import_file(path: &Path) -> Result<Vec<Task>, TaskError> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file: {}", path.display()))
        .map_err(|e| TaskError::persistence("Could not read the import file!", e))?;
    parse_import(&content)
}
