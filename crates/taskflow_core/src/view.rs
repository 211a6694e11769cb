//! Pure projection of the task list into what a surface displays.

use crate::model::{Filter, Priority, Status, Task, derive_priority, derive_status};
use crate::task_store::{filter_tasks, stats_for};
use std::collections::BTreeSet;
use time::macros::format_description;
use time::{Date, Duration};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: u64,
    pub text: String,
    pub due_date: Date,
    pub due_label: String,
    pub status: Status,
    pub priority: Priority,
    pub completed: bool,
    /// Delete requested, removal still pending.
    pub removing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyState {
    pub title: &'static str,
    pub subtitle: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsView {
    pub total: usize,
    pub completed: usize,
    pub clear_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub filter: Filter,
    pub rows: Vec<RowView>,
    pub empty: Option<EmptyState>,
    pub stats: StatsView,
}

pub fn project(tasks: &[Task], filter: Filter, today: Date, removing: &BTreeSet<u64>) -> ListView {
    let rows: Vec<RowView> = filter_tasks(tasks, filter, today)
        .into_iter()
        .map(|task| RowView {
            id: task.id,
            text: task.text.clone(),
            due_date: task.due_date,
            due_label: due_label(task.due_date, today),
            status: derive_status(task, today),
            priority: derive_priority(task, today),
            completed: task.completed,
            removing: removing.contains(&task.id),
        })
        .collect();

    let stats = stats_for(tasks);
    let empty = rows.is_empty().then(|| empty_state(filter));

    ListView {
        filter,
        rows,
        empty,
        stats: StatsView {
            total: stats.total,
            completed: stats.completed,
            clear_enabled: stats.completed > 0,
        },
    }
}

pub fn empty_state(filter: Filter) -> EmptyState {
    match filter {
        Filter::All => EmptyState {
            title: "No tasks yet",
            subtitle: "Add your first task above to get started!",
        },
        Filter::Completed => EmptyState {
            title: "No completed tasks",
            subtitle: "Complete some tasks to see them here!",
        },
        Filter::Pending => EmptyState {
            title: "No pending tasks",
            subtitle: "All caught up! Great work!",
        },
        Filter::Overdue => EmptyState {
            title: "No overdue tasks",
            subtitle: "You're staying on top of things!",
        },
    }
}

/// "Today", "Tomorrow", or a short weekday date such as "Wed, Dec 24".
pub fn due_label(due_date: Date, today: Date) -> String {
    if due_date == today {
        return "Today".to_string();
    }
    if today.checked_add(Duration::days(1)) == Some(due_date) {
        return "Tomorrow".to_string();
    }

    let format = format_description!("[weekday repr:short], [month repr:short] [day padding:none]");
    due_date
        .format(format)
        .unwrap_or_else(|_| due_date.to_string())
}
