//! Tolerant decoding of stored task records.
//!
//! Stored and imported data may come from older versions or be edited by
//! hand, so every field is optional here. Missing, empty or unparseable
//! values fall back to the documented defaults; records without any text are
//! dropped.

use crate::domain::{Priority, Task, TaskId, DEFAULT_CATEGORY, MAX_TEXT_LEN};
use chrono::{DateTime, Local, NaiveDate};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Result of normalizing a batch of raw records
#[derive(Debug)]
pub struct Normalized {
    pub tasks: Vec<Task>,
    /// Records that could not be turned into a task
    pub dropped: usize,
}

/// Turn raw JSON records into tasks, filling defaults and fixing invariants
pub fn normalize_records(records: Vec<Value>, now: DateTime<Local>) -> Normalized {
    let mut tasks = Vec::with_capacity(records.len());
    let mut seen_ids = HashSet::new();
    let mut dropped = 0;

    for (index, record) in records.into_iter().enumerate() {
        let Value::Object(fields) = record else {
            tracing::warn!(index, "dropping stored record that is not an object");
            dropped += 1;
            continue;
        };

        match normalize_record(&fields, now) {
            Some(mut task) => {
                if !seen_ids.insert(task.id.clone()) {
                    tracing::warn!(index, id = %task.id, "duplicate task id, assigning a new one");
                    task.id = TaskId::generate();
                    seen_ids.insert(task.id.clone());
                }
                tasks.push(task);
            }
            None => {
                tracing::warn!(index, "dropping stored record without text");
                dropped += 1;
            }
        }
    }

    Normalized { tasks, dropped }
}

fn normalize_record(fields: &Map<String, Value>, now: DateTime<Local>) -> Option<Task> {
    let text = non_empty_str(fields, "text")?;
    let text = if text.chars().count() > MAX_TEXT_LEN {
        text.chars().take(MAX_TEXT_LEN).collect::<String>().trim_end().to_string()
    } else {
        text.to_string()
    };

    let id = match fields.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => TaskId::from(s.as_str()),
        Some(Value::Number(n)) => TaskId::from(n.to_string()),
        _ => TaskId::generate(),
    };

    let completed = fields.get("completed").and_then(Value::as_bool).unwrap_or(false);

    let priority = non_empty_str(fields, "priority")
        .and_then(Priority::from_name)
        .unwrap_or_default();

    let category = non_empty_str(fields, "category")
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string();

    let due_date = non_empty_str(fields, "dueDate").and_then(parse_date);

    let created_at = non_empty_str(fields, "createdAt")
        .and_then(parse_timestamp)
        .unwrap_or(now);

    // completedAt must be present exactly when completed is set
    let completed_at = if completed {
        Some(
            non_empty_str(fields, "completedAt")
                .and_then(parse_timestamp)
                .unwrap_or(now),
        )
    } else {
        None
    };

    Some(Task {
        id,
        text,
        completed,
        priority,
        category,
        due_date,
        created_at,
        completed_at,
    })
}

/// Trimmed string field, None when absent, not a string or blank
fn non_empty_str<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Accept "YYYY-MM-DD", or a full timestamp whose date part is that
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Local))
}
