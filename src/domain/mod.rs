pub mod enums;
pub mod error;
pub mod task;
pub mod views;

pub use enums::{Filter, Priority, SortKey, UiMode, Urgency};
pub use error::TaskError;
pub use task::{Task, TaskDraft, TaskId, DEFAULT_CATEGORY, MAX_TEXT_LEN};
pub use views::{compute_stats, derive_view, project, ListProjection, Stats, TaskRow};
