use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// Calendar-date layout used for `dueDate` and for date input.
pub const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub text: String,
    #[serde(with = "iso_date")]
    pub due_date: Date,
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Completed,
    Overdue,
    Pending,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Overdue => "overdue",
            Self::Pending => "pending",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    Overdue,
    Urgent,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

pub fn derive_status(task: &Task, today: Date) -> Status {
    if task.completed {
        return Status::Completed;
    }

    if task.due_date < today {
        Status::Overdue
    } else {
        Status::Pending
    }
}

/// Buckets the whole-day distance between the due date and `today`.
pub fn derive_priority(task: &Task, today: Date) -> Priority {
    let days = (task.due_date - today).whole_days();
    match days {
        d if d < 0 => Priority::Overdue,
        0..=1 => Priority::Urgent,
        2..=3 => Priority::High,
        4..=7 => Priority::Medium,
        _ => Priority::Low,
    }
}
