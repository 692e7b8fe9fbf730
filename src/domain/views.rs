use super::enums::{Filter, Priority, SortKey, Urgency};
use super::task::{Task, TaskId};
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Filter and sort the collection without touching it
pub fn derive_view(tasks: &[Task], filter: Filter, sort: SortKey) -> Vec<&Task> {
    let mut view: Vec<&Task> = tasks.iter().filter(|t| filter.accepts(t.completed)).collect();
    // sort_by is stable, so ties keep collection order
    view.sort_by(|a, b| compare(a, b, sort));
    view
}

fn compare(a: &Task, b: &Task, sort: SortKey) -> Ordering {
    match sort {
        SortKey::Created => b.created_at.cmp(&a.created_at),
        SortKey::Priority => b.priority.cmp(&a.priority),
        SortKey::DueDate => match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        // Case-insensitive first, raw bytes only to break ties
        SortKey::Category => a
            .category
            .to_lowercase()
            .cmp(&b.category.to_lowercase())
            .then_with(|| a.category.cmp(&b.category)),
    }
}

/// Human label and urgency for a due date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueStatus {
    pub label: String,
    pub urgency: Urgency,
}

/// Describe a due date relative to `today`
pub fn due_date_status(due_date: Option<NaiveDate>, today: NaiveDate) -> DueStatus {
    let Some(due) = due_date else {
        return DueStatus {
            label: String::new(),
            urgency: Urgency::None,
        };
    };

    let days = (due - today).num_days();
    let (label, urgency) = match days {
        d if d < 0 => (format!("{} days overdue", -d), Urgency::Overdue),
        0 => ("Due today".to_string(), Urgency::Soon),
        1 => ("Due tomorrow".to_string(), Urgency::Soon),
        2..=3 => (format!("Due in {} days", days), Urgency::Soon),
        _ => (format!("Due {}", due.format("%-m/%-d/%Y")), Urgency::None),
    };

    DueStatus { label, urgency }
}

/// Aggregate counters over the whole collection (not just the view)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
    /// Rounded percentage, 0 for an empty list
    pub completion_rate: u32,
}

pub fn compute_stats(tasks: &[Task], today: NaiveDate) -> Stats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    let overdue = tasks.iter().filter(|t| t.is_overdue(today)).count();
    let completion_rate = if total > 0 {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };

    Stats {
        total,
        completed,
        pending: total - completed,
        overdue,
        completion_rate,
    }
}

/// One visible task, ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub priority: Priority,
    pub category: String,
    /// None when the task has no due date
    pub due: Option<DueStatus>,
}

/// Everything the display surface needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct ListProjection {
    pub rows: Vec<TaskRow>,
    pub stats: Stats,
    pub filter: Filter,
    pub sort: SortKey,
    /// Nothing passes the current filter
    pub is_empty: bool,
    /// Offer "clear completed" only when there is something to clear
    pub show_clear_completed: bool,
}

/// Build the display projection for the current state
pub fn project(tasks: &[Task], filter: Filter, sort: SortKey, today: NaiveDate) -> ListProjection {
    let rows: Vec<TaskRow> = derive_view(tasks, filter, sort)
        .into_iter()
        .map(|task| TaskRow {
            id: task.id.clone(),
            text: task.text.clone(),
            completed: task.completed,
            priority: task.priority,
            category: task.category.clone(),
            due: task
                .due_date
                .map(|_| due_date_status(task.due_date, today)),
        })
        .collect();

    let stats = compute_stats(tasks, today);

    ListProjection {
        is_empty: rows.is_empty(),
        show_clear_completed: stats.completed > 0,
        rows,
        stats,
        filter,
        sort,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::TaskDraft;
    use chrono::{Duration, Local};
    use pretty_assertions::assert_eq;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(text: &str, priority: Priority, category: &str, due: Option<NaiveDate>) -> Task {
        Task::new(
            TaskDraft::new(text)
                .with_priority(priority)
                .with_category(category)
                .with_due_date(due),
        )
    }

    fn texts(view: &[&Task]) -> Vec<String> {
        view.iter().map(|t| t.text.clone()).collect()
    }

    #[test]
    fn test_filter_pending_and_completed() {
        let mut done = task("done", Priority::Low, "work", None);
        done.toggle();
        let open = task("open", Priority::Low, "work", None);
        let tasks = vec![done, open];

        assert_eq!(texts(&derive_view(&tasks, Filter::Pending, SortKey::Priority)), vec!["open"]);
        assert_eq!(texts(&derive_view(&tasks, Filter::Completed, SortKey::Priority)), vec!["done"]);
        assert_eq!(derive_view(&tasks, Filter::All, SortKey::Priority).len(), 2);
    }

    #[test]
    fn test_sort_created_newest_first() {
        let mut older = task("older", Priority::Medium, "personal", None);
        older.created_at = Local::now() - Duration::hours(2);
        let newer = task("newer", Priority::Medium, "personal", None);
        // Collection order deliberately oldest-first
        let tasks = vec![older, newer];

        assert_eq!(texts(&derive_view(&tasks, Filter::All, SortKey::Created)), vec!["newer", "older"]);
    }

    #[test]
    fn test_sort_priority_is_stable() {
        let tasks = vec![
            task("a-low", Priority::Low, "x", None),
            task("b-high", Priority::High, "x", None),
            task("c-medium", Priority::Medium, "x", None),
            task("d-high", Priority::High, "x", None),
        ];

        assert_eq!(
            texts(&derive_view(&tasks, Filter::All, SortKey::Priority)),
            vec!["b-high", "d-high", "c-medium", "a-low"]
        );
    }

    #[test]
    fn test_sort_due_date_undated_last() {
        let tasks = vec![
            task("none-1", Priority::Medium, "x", None),
            task("late", Priority::Medium, "x", Some(day(2024, 6, 1))),
            task("none-2", Priority::Medium, "x", None),
            task("early", Priority::Medium, "x", Some(day(2024, 5, 1))),
        ];

        assert_eq!(
            texts(&derive_view(&tasks, Filter::All, SortKey::DueDate)),
            vec!["early", "late", "none-1", "none-2"]
        );
    }

    #[test]
    fn test_sort_category_ascending() {
        let tasks = vec![
            task("1", Priority::Medium, "work", None),
            task("2", Priority::Medium, "health", None),
            task("3", Priority::Medium, "personal", None),
        ];

        let view = derive_view(&tasks, Filter::All, SortKey::Category);
        let categories: Vec<&str> = view.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(categories, vec!["health", "personal", "work"]);
    }

    #[test]
    fn test_sort_category_ignores_case() {
        let tasks = vec![
            task("1", Priority::Medium, "Work", None),
            task("2", Priority::Medium, "health", None),
            task("3", Priority::Medium, "work", None),
        ];

        let view = derive_view(&tasks, Filter::All, SortKey::Category);
        let categories: Vec<&str> = view.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(categories, vec!["health", "Work", "work"]);
    }

    #[test]
    fn test_view_does_not_reorder_collection() {
        let tasks = vec![
            task("low", Priority::Low, "x", None),
            task("high", Priority::High, "x", None),
        ];
        let _ = derive_view(&tasks, Filter::All, SortKey::Priority);
        assert_eq!(tasks[0].text, "low");
    }

    #[test]
    fn test_due_date_status_labels() {
        let today = day(2024, 5, 10);

        let overdue = due_date_status(Some(day(2024, 5, 9)), today);
        assert_eq!(overdue.label, "1 days overdue");
        assert_eq!(overdue.urgency, Urgency::Overdue);

        let week_late = due_date_status(Some(day(2024, 5, 3)), today);
        assert_eq!(week_late.label, "7 days overdue");

        let due_today = due_date_status(Some(today), today);
        assert_eq!(due_today.label, "Due today");
        assert_eq!(due_today.urgency, Urgency::Soon);

        let tomorrow = due_date_status(Some(day(2024, 5, 11)), today);
        assert_eq!(tomorrow.label, "Due tomorrow");
        assert_eq!(tomorrow.urgency, Urgency::Soon);

        let in_two = due_date_status(Some(day(2024, 5, 12)), today);
        assert_eq!(in_two.label, "Due in 2 days");

        let in_three = due_date_status(Some(day(2024, 5, 13)), today);
        assert_eq!(in_three.label, "Due in 3 days");
        assert_eq!(in_three.urgency, Urgency::Soon);

        let in_four = due_date_status(Some(day(2024, 5, 14)), today);
        assert_eq!(in_four.label, "Due 5/14/2024");
        assert_eq!(in_four.urgency, Urgency::None);
    }

    #[test]
    fn test_due_date_status_none() {
        let status = due_date_status(None, day(2024, 5, 10));
        assert_eq!(status.label, "");
        assert_eq!(status.urgency, Urgency::None);
    }

    #[test]
    fn test_due_date_status_across_month_boundary() {
        let status = due_date_status(Some(day(2024, 3, 1)), day(2024, 2, 28));
        // 2024 is a leap year
        assert_eq!(status.label, "Due in 2 days");
    }

    #[test]
    fn test_compute_stats() {
        let today = day(2024, 5, 10);
        let mut done = task("done", Priority::Low, "x", Some(day(2024, 5, 1)));
        done.toggle();
        let tasks = vec![
            done,
            task("late", Priority::Low, "x", Some(day(2024, 5, 9))),
            task("later", Priority::Low, "x", Some(day(2024, 5, 20))),
        ];

        let stats = compute_stats(&tasks, today);
        assert_eq!(
            stats,
            Stats {
                total: 3,
                completed: 1,
                pending: 2,
                overdue: 1,
                completion_rate: 33,
            }
        );
    }

    #[test]
    fn test_compute_stats_empty() {
        let stats = compute_stats(&[], day(2024, 5, 10));
        assert_eq!(stats, Stats::default());
    }

    #[test]
    fn test_project_empty_view_and_clear_flag() {
        let today = day(2024, 5, 10);
        let mut done = task("done", Priority::Low, "x", None);
        done.toggle();
        let tasks = vec![done];

        let pending = project(&tasks, Filter::Pending, SortKey::Created, today);
        assert!(pending.is_empty);
        assert!(pending.rows.is_empty());
        assert!(pending.show_clear_completed);
        assert_eq!(pending.stats.total, 1);

        let nothing = project(&[], Filter::All, SortKey::Created, today);
        assert!(nothing.is_empty);
        assert!(!nothing.show_clear_completed);
    }

    #[test]
    fn test_project_rows_carry_due_status() {
        let today = day(2024, 5, 10);
        let tasks = vec![
            task("dated", Priority::High, "work", Some(today)),
            task("undated", Priority::Low, "work", None),
        ];

        let projection = project(&tasks, Filter::All, SortKey::Priority, today);
        assert_eq!(projection.rows.len(), 2);
        assert_eq!(
            projection.rows[0].due,
            Some(DueStatus {
                label: "Due today".to_string(),
                urgency: Urgency::Soon,
            })
        );
        assert_eq!(projection.rows[1].due, None);
    }
}
