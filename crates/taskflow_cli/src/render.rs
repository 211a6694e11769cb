use tabled::settings::Style;
use tabled::{Table, Tabled};
use taskflow_core::app::{Notice, NoticeKind, Screen};
use taskflow_core::model::{ISO_DATE, Task};
use taskflow_core::view::{RowView, StatsView};
use time::format_description::well_known::Rfc3339;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Done")]
    done: &'static str,
    #[tabled(rename = "Task")]
    text: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Priority")]
    priority: &'static str,
}

impl From<&RowView> for TaskRow {
    fn from(row: &RowView) -> Self {
        Self {
            id: row.id,
            done: if row.completed { "[x]" } else { "[ ]" },
            text: if row.removing {
                format!("{} (removing)", row.text)
            } else {
                row.text.clone()
            },
            due: row.due_label.clone(),
            status: row.status.label(),
            priority: row.priority.label(),
        }
    }
}

pub fn render_screen(screen: &Screen) -> String {
    let list = &screen.list;
    let mut out = String::new();

    match list.empty {
        Some(empty) => {
            out.push_str(empty.title);
            out.push('\n');
            out.push_str(empty.subtitle);
        }
        None => {
            let rows: Vec<TaskRow> = list.rows.iter().map(TaskRow::from).collect();
            let mut table = Table::new(rows);
            table.with(Style::psql());
            out.push_str(&table.to_string());
        }
    }

    out.push('\n');
    out.push_str(&format!("Filter: {}", list.filter));
    out.push('\n');
    out.push_str(&stats_line(&list.stats));
    out
}

/// Counter line; flags when `clear-completed` has something to remove.
pub fn stats_line(stats: &StatsView) -> String {
    let line = format!("Total: {} | Completed: {}", stats.total, stats.completed);
    if stats.clear_enabled {
        format!("{line} (clear-completed available)")
    } else {
        line
    }
}

pub fn notice_line(notice: &Notice) -> String {
    match notice.kind {
        NoticeKind::Success => format!("✓ {}", notice.message),
        NoticeKind::Info => format!("i {}", notice.message),
        NoticeKind::Error => format!("! {}", notice.message),
    }
}

pub fn screen_json(screen: &Screen) -> serde_json::Value {
    let list = &screen.list;
    let rows: Vec<serde_json::Value> = list
        .rows
        .iter()
        .map(|row| {
            serde_json::json!({
                "id": row.id,
                "text": row.text,
                "dueDate": row.due_date.format(ISO_DATE).ok(),
                "dueLabel": row.due_label,
                "completed": row.completed,
                "status": row.status.label(),
                "priority": row.priority.label(),
                "removing": row.removing,
            })
        })
        .collect();

    serde_json::json!({
        "filter": list.filter.label(),
        "tasks": rows,
        "stats": stats_json(&list.stats),
    })
}

pub fn stats_json(stats: &StatsView) -> serde_json::Value {
    serde_json::json!({
        "total": stats.total,
        "completed": stats.completed,
    })
}

pub fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "text": task.text,
        "dueDate": task.due_date.format(ISO_DATE).ok(),
        "completed": task.completed,
        "createdAt": task.created_at.format(&Rfc3339).ok(),
        "completedAt": task.completed_at.and_then(|at| at.format(&Rfc3339).ok()),
    })
}
