use super::task::TaskId;
use thiserror::Error;

/// Errors reported by task list operations
///
/// Every variant is recoverable: the operation is aborted and the in-memory
/// collection stays as it was.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{0}")]
    Validation(String),

    #[error("This task already exists!")]
    Duplicate,

    #[error("No task with id {0}")]
    NotFound(TaskId),

    #[error("No completed tasks to clear!")]
    NoOp,

    #[error("{message}")]
    Persistence {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid file format! Please select a valid JSON file ({0})")]
    ImportFormat(String),
}

impl TaskError {
    pub fn persistence(message: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Persistence {
            message: message.into(),
            source,
        }
    }

    /// Whether the UI should surface this error (unknown ids are ignored)
    pub fn is_reported(&self) -> bool {
        !matches!(self, Self::NotFound(_))
    }
}
