//! Interaction layer: turns user events into store operations and keeps the
//! transient UI state (active filter, notice, pending confirmation, rows on
//! their way out).

use crate::clock::Clock;
use crate::error::ValidationError;
use crate::model::{Filter, Task};
use crate::schedule::{NOTICE_DISMISS_DELAY, ROW_REMOVAL_DELAY, Scheduler};
use crate::storage::Storage;
use crate::task_store::TaskStore;
use crate::validation;
use crate::view::{self, ListView};
use std::collections::BTreeSet;
use std::time::Duration;
use time::Date;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Submit { text: String, due_date: String },
    TextInput(String),
    DateChange(String),
    SelectFilter(Filter),
    Toggle(u64),
    Delete(u64),
    RequestClearCompleted,
    ConfirmClear(bool),
    Tick(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Updated,
    Added(Task),
    Rejected(ValidationError),
    ConfirmationRequired(ClearPrompt),
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearPrompt {
    pub count: usize,
}

impl ClearPrompt {
    pub fn message(&self) -> String {
        format!(
            "Are you sure you want to delete {} completed task(s)?",
            self.count
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub list: ListView,
    pub notice: Option<Notice>,
    pub min_due_date: Date,
    pub confirmation: Option<ClearPrompt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    RemoveTask(u64),
    DismissNotice(u64),
}

#[derive(Debug)]
pub struct App<S, C> {
    store: TaskStore<S, C>,
    filter: Filter,
    timers: Scheduler<Deferred>,
    notice: Option<Notice>,
    next_notice_id: u64,
    pending_clear: Option<ClearPrompt>,
    removing: BTreeSet<u64>,
    raised: Vec<Notice>,
}

impl<S: Storage, C: Clock> App<S, C> {
    pub fn new(store: TaskStore<S, C>, filter: Filter) -> Self {
        Self {
            store,
            filter,
            timers: Scheduler::new(),
            notice: None,
            next_notice_id: 1,
            pending_clear: None,
            removing: BTreeSet::new(),
            raised: Vec::new(),
        }
    }

    pub fn store(&self) -> &TaskStore<S, C> {
        &self.store
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Notices raised since the last call, oldest first, including ones
    /// already dismissed.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.raised)
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    pub fn handle(&mut self, event: UiEvent) -> Outcome {
        debug!(?event, "ui event");
        match event {
            UiEvent::Submit { text, due_date } => self.submit(&text, &due_date),
            UiEvent::TextInput(text) => match self.store.validate_text(&text) {
                Ok(()) => Outcome::Ignored,
                Err(err) => self.reject(err),
            },
            UiEvent::DateChange(raw) => {
                match validation::parse_due_date(&raw)
                    .and_then(|due| self.store.validate_due_date(due))
                {
                    Ok(()) => Outcome::Ignored,
                    Err(err) => self.reject(err),
                }
            }
            UiEvent::SelectFilter(filter) => {
                self.filter = filter;
                Outcome::Updated
            }
            UiEvent::Toggle(id) => match self.store.toggle_task(id) {
                Some(_) => Outcome::Updated,
                None => Outcome::Ignored,
            },
            UiEvent::Delete(id) => self.request_delete(id),
            UiEvent::RequestClearCompleted => self.request_clear(),
            UiEvent::ConfirmClear(confirmed) => self.confirm_clear(confirmed),
            UiEvent::Tick(elapsed) => self.tick(elapsed),
        }
    }

    /// Runs every outstanding deferred action, as if the surface stayed open
    /// long enough for all timers to fire.
    pub fn settle(&mut self) {
        while self.timers.pending() > 0 {
            let due = self.timers.settle();
            self.apply(due);
        }
    }

    pub fn screen(&self) -> Screen {
        Screen {
            list: view::project(
                self.store.tasks(),
                self.filter,
                self.store.today(),
                &self.removing,
            ),
            notice: self.notice.clone(),
            min_due_date: self.store.today(),
            confirmation: self.pending_clear.clone(),
        }
    }

    fn submit(&mut self, text: &str, raw_due_date: &str) -> Outcome {
        let due_date = match validation::parse_due_date(raw_due_date) {
            Ok(due) => self.store.validate_new_task(text, due).map(|()| due),
            Err(err) => self.store.validate_text(text).and(Err(err)),
        };

        match due_date {
            Ok(Some(due_date)) => {
                let task = self.store.add_task(text, due_date);
                self.show_notice(NoticeKind::Success, "Task added successfully!".to_string());
                Outcome::Added(task)
            }
            Ok(None) => self.reject(ValidationError::MissingDate),
            Err(err) => self.reject(err),
        }
    }

    fn request_delete(&mut self, id: u64) -> Outcome {
        if self.store.get(id).is_none() || self.removing.contains(&id) {
            return Outcome::Ignored;
        }

        self.removing.insert(id);
        self.timers
            .schedule(ROW_REMOVAL_DELAY, Deferred::RemoveTask(id));
        Outcome::Updated
    }

    fn request_clear(&mut self) -> Outcome {
        let count = self.store.stats().completed;
        if count == 0 {
            self.show_notice(
                NoticeKind::Info,
                "No completed tasks to clear!".to_string(),
            );
            return Outcome::Ignored;
        }

        let prompt = ClearPrompt { count };
        self.pending_clear = Some(prompt.clone());
        Outcome::ConfirmationRequired(prompt)
    }

    /// Clears only if the completed count still matches the prompt the user
    /// answered; otherwise asks again with the current count.
    fn confirm_clear(&mut self, confirmed: bool) -> Outcome {
        let Some(prompt) = self.pending_clear.take() else {
            return Outcome::Ignored;
        };
        if !confirmed {
            return Outcome::Ignored;
        }
        if self.store.stats().completed != prompt.count {
            debug!(prompted = prompt.count, "completed count changed, asking again");
            return self.request_clear();
        }

        let removed = self.store.clear_completed();
        self.show_notice(
            NoticeKind::Success,
            format!("{removed} completed task(s) cleared!"),
        );
        Outcome::Updated
    }

    fn tick(&mut self, elapsed: Duration) -> Outcome {
        let due = self.timers.advance(elapsed);
        if due.is_empty() {
            return Outcome::Ignored;
        }
        self.apply(due);
        Outcome::Updated
    }

    fn apply(&mut self, due: Vec<Deferred>) {
        for action in due {
            match action {
                Deferred::RemoveTask(id) => {
                    self.removing.remove(&id);
                    if self.store.delete_task(id).is_some() {
                        self.show_notice(
                            NoticeKind::Success,
                            "Task deleted successfully!".to_string(),
                        );
                    }
                }
                Deferred::DismissNotice(id) => {
                    if self.notice.as_ref().is_some_and(|notice| notice.id == id) {
                        self.notice = None;
                    }
                }
            }
        }
    }

    fn reject(&mut self, err: ValidationError) -> Outcome {
        self.show_notice(NoticeKind::Error, err.message().to_string());
        Outcome::Rejected(err)
    }

    fn show_notice(&mut self, kind: NoticeKind, message: String) {
        let id = self.next_notice_id;
        self.next_notice_id += 1;
        let notice = Notice { id, kind, message };
        self.raised.push(notice.clone());
        self.notice = Some(notice);
        self.timers
            .schedule(NOTICE_DISMISS_DELAY, Deferred::DismissNotice(id));
    }
}

#[cfg(test)]
mod tests {
    use super::{App, ClearPrompt, NoticeKind, Outcome, UiEvent};
    use crate::clock::{Clock, FixedClock};
    use crate::error::ValidationError;
    use crate::model::{Filter, Status};
    use crate::storage::{MemoryStorage, Storage};
    use crate::task_store::TaskStore;
    use std::time::Duration;
    use time::macros::datetime;

    fn app(clock: &FixedClock) -> App<MemoryStorage, &FixedClock> {
        App::new(TaskStore::open(MemoryStorage::new(), clock), Filter::All)
    }

    fn clock() -> FixedClock {
        FixedClock::new(datetime!(2025-12-20 10:00 UTC))
    }

    fn submit(text: &str, due_date: &str) -> UiEvent {
        UiEvent::Submit {
            text: text.to_string(),
            due_date: due_date.to_string(),
        }
    }

    fn added_id(outcome: Outcome) -> u64 {
        match outcome {
            Outcome::Added(task) => task.id,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn submit_adds_task_and_shows_success() {
        let clock = clock();
        let mut app = app(&clock);

        let outcome = app.handle(submit("Buy milk", "2025-12-20"));

        assert!(matches!(outcome, Outcome::Added(_)));
        let screen = app.screen();
        assert_eq!(screen.list.rows.len(), 1);
        assert_eq!(screen.list.rows[0].text, "Buy milk");
        assert_eq!(screen.list.rows[0].status, Status::Pending);
        let notice = screen.notice.unwrap();
        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(notice.message, "Task added successfully!");
    }

    #[test]
    fn submit_reports_first_violation_without_mutating() {
        let clock = clock();
        let mut app = app(&clock);

        assert_eq!(
            app.handle(submit("ab", "not a date")),
            Outcome::Rejected(ValidationError::TooShort)
        );
        assert_eq!(
            app.handle(submit("Buy milk", "")),
            Outcome::Rejected(ValidationError::MissingDate)
        );
        assert_eq!(
            app.handle(submit("Buy milk", "20/12/2025")),
            Outcome::Rejected(ValidationError::InvalidDate)
        );
        assert_eq!(
            app.handle(submit("Buy milk", "2025-12-19")),
            Outcome::Rejected(ValidationError::PastDate)
        );

        assert_eq!(app.store().stats().total, 0);
        let notice = app.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "Due date cannot be in the past");
    }

    #[test]
    fn live_validation_surfaces_errors_only() {
        let clock = clock();
        let mut app = app(&clock);

        assert_eq!(
            app.handle(UiEvent::TextInput("hi".to_string())),
            Outcome::Rejected(ValidationError::TooShort)
        );
        assert_eq!(
            app.handle(UiEvent::DateChange("2025-12-01".to_string())),
            Outcome::Rejected(ValidationError::PastDate)
        );
        assert_eq!(
            app.handle(UiEvent::TextInput("Buy milk".to_string())),
            Outcome::Ignored
        );
        assert_eq!(
            app.handle(UiEvent::DateChange("2025-12-21".to_string())),
            Outcome::Ignored
        );
        assert_eq!(app.store().stats().total, 0);
    }

    #[test]
    fn delete_is_deferred_until_row_removal_delay() {
        let clock = clock();
        let mut app = app(&clock);
        let id = added_id(app.handle(submit("Buy milk", "2025-12-21")));

        assert_eq!(app.handle(UiEvent::Delete(id)), Outcome::Updated);
        assert!(app.screen().list.rows[0].removing);
        assert_eq!(app.handle(UiEvent::Delete(id)), Outcome::Ignored);

        app.handle(UiEvent::Tick(Duration::from_millis(299)));
        assert_eq!(app.store().stats().total, 1);

        app.handle(UiEvent::Tick(Duration::from_millis(1)));
        assert_eq!(app.store().stats().total, 0);
        assert_eq!(
            app.notice().map(|notice| notice.message.as_str()),
            Some("Task deleted successfully!")
        );
    }

    #[test]
    fn delete_unknown_id_is_ignored() {
        let clock = clock();
        let mut app = app(&clock);

        assert_eq!(app.handle(UiEvent::Delete(99)), Outcome::Ignored);
        assert_eq!(app.pending_timers(), 0);
    }

    #[test]
    fn notices_dismiss_after_three_seconds() {
        let clock = clock();
        let mut app = app(&clock);
        app.handle(submit("Buy milk", "2025-12-21"));

        app.handle(UiEvent::Tick(Duration::from_millis(2999)));
        assert!(app.notice().is_some());
        app.handle(UiEvent::Tick(Duration::from_millis(1)));
        assert!(app.notice().is_none());
    }

    #[test]
    fn older_dismissal_does_not_hide_newer_notice() {
        let clock = clock();
        let mut app = app(&clock);
        app.handle(submit("Buy milk", "2025-12-21"));
        app.handle(UiEvent::Tick(Duration::from_millis(2000)));
        app.handle(submit("x", "2025-12-21"));

        app.handle(UiEvent::Tick(Duration::from_millis(1000)));
        assert_eq!(
            app.notice().map(|notice| notice.kind),
            Some(NoticeKind::Error)
        );

        app.handle(UiEvent::Tick(Duration::from_millis(2000)));
        assert!(app.notice().is_none());
    }

    #[test]
    fn clear_completed_requires_confirmation() {
        let clock = clock();
        let mut app = app(&clock);
        for text in ["task one", "task two", "task three", "task four", "task five"] {
            app.handle(submit(text, "2025-12-22"));
        }
        let ids: Vec<u64> = app.store().tasks().iter().map(|task| task.id).collect();
        for id in &ids[..3] {
            app.handle(UiEvent::Toggle(*id));
        }

        let outcome = app.handle(UiEvent::RequestClearCompleted);
        let prompt = ClearPrompt { count: 3 };
        assert_eq!(outcome, Outcome::ConfirmationRequired(prompt.clone()));
        assert_eq!(
            prompt.message(),
            "Are you sure you want to delete 3 completed task(s)?"
        );
        assert_eq!(app.screen().confirmation, Some(prompt));

        assert_eq!(app.handle(UiEvent::ConfirmClear(false)), Outcome::Ignored);
        assert_eq!(app.store().stats().total, 5);
        assert_eq!(app.handle(UiEvent::ConfirmClear(true)), Outcome::Ignored);

        app.handle(UiEvent::RequestClearCompleted);
        assert_eq!(app.handle(UiEvent::ConfirmClear(true)), Outcome::Updated);
        let stats = app.screen().list.stats;
        assert_eq!((stats.total, stats.completed), (2, 0));
        assert!(!stats.clear_enabled);
        assert_eq!(
            app.notice().map(|notice| notice.message.as_str()),
            Some("3 completed task(s) cleared!")
        );
    }

    #[test]
    fn clear_confirmation_is_renewed_when_count_changes() {
        let clock = clock();
        let mut app = app(&clock);
        for text in ["task one", "task two", "task three"] {
            app.handle(submit(text, "2025-12-22"));
        }
        let ids: Vec<u64> = app.store().tasks().iter().map(|task| task.id).collect();
        app.handle(UiEvent::Toggle(ids[0]));

        assert_eq!(
            app.handle(UiEvent::RequestClearCompleted),
            Outcome::ConfirmationRequired(ClearPrompt { count: 1 })
        );
        app.handle(UiEvent::Toggle(ids[1]));
        app.handle(UiEvent::Toggle(ids[2]));

        assert_eq!(
            app.handle(UiEvent::ConfirmClear(true)),
            Outcome::ConfirmationRequired(ClearPrompt { count: 3 })
        );
        assert_eq!(app.store().stats().total, 3);
        assert_eq!(
            app.screen().confirmation,
            Some(ClearPrompt { count: 3 })
        );

        assert_eq!(app.handle(UiEvent::ConfirmClear(true)), Outcome::Updated);
        assert_eq!(app.store().stats().total, 0);
        assert_eq!(
            app.notice().map(|notice| notice.message.as_str()),
            Some("3 completed task(s) cleared!")
        );
    }

    #[test]
    fn clear_confirmation_lapses_when_nothing_is_left_to_clear() {
        let clock = clock();
        let mut app = app(&clock);
        app.handle(submit("task one", "2025-12-22"));
        let id = app.store().tasks()[0].id;
        app.handle(UiEvent::Toggle(id));

        app.handle(UiEvent::RequestClearCompleted);
        app.handle(UiEvent::Toggle(id));

        assert_eq!(app.handle(UiEvent::ConfirmClear(true)), Outcome::Ignored);
        assert_eq!(app.store().stats().total, 1);
        assert_eq!(
            app.notice().map(|notice| notice.message.as_str()),
            Some("No completed tasks to clear!")
        );
        assert!(app.screen().confirmation.is_none());
    }

    #[test]
    fn clear_with_nothing_completed_reports_info() {
        let clock = clock();
        let mut app = app(&clock);
        app.handle(submit("Buy milk", "2025-12-21"));

        assert_eq!(app.handle(UiEvent::RequestClearCompleted), Outcome::Ignored);
        let notice = app.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Info);
        assert_eq!(notice.message, "No completed tasks to clear!");
        assert!(app.screen().confirmation.is_none());
    }

    #[test]
    fn filter_selection_changes_projection() {
        let clock = clock();
        let mut app = app(&clock);
        let id = added_id(app.handle(submit("Buy milk", "2025-12-20")));
        app.handle(submit("Walk dog", "2025-12-23"));
        app.handle(UiEvent::Toggle(id));

        app.handle(UiEvent::SelectFilter(Filter::Completed));
        assert_eq!(app.filter(), Filter::Completed);
        let rows = app.screen().list.rows;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);

        app.handle(UiEvent::SelectFilter(Filter::Overdue));
        let screen = app.screen();
        assert!(screen.list.rows.is_empty());
        assert_eq!(
            screen.list.empty.map(|empty| empty.title),
            Some("No overdue tasks")
        );
    }

    #[test]
    fn settle_flushes_pending_deletes() {
        let clock = clock();
        let storage = MemoryStorage::new();
        let mut app = App::new(TaskStore::open(storage.clone(), &clock), Filter::All);
        let id = added_id(app.handle(submit("Buy milk", "2025-12-21")));
        app.handle(UiEvent::Delete(id));

        app.settle();

        assert!(storage.load().is_empty());
        assert_eq!(app.pending_timers(), 0);
        assert!(app.notice().is_none());

        let messages: Vec<String> = app
            .drain_notices()
            .into_iter()
            .map(|notice| notice.message)
            .collect();
        assert_eq!(
            messages,
            vec!["Task added successfully!", "Task deleted successfully!"]
        );
        assert!(app.drain_notices().is_empty());
    }

    #[test]
    fn min_due_date_is_today() {
        let clock = clock();
        let app = app(&clock);
        assert_eq!(app.screen().min_due_date, clock.today());
    }
}
