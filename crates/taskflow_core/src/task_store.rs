use crate::clock::Clock;
use crate::error::ValidationError;
use crate::model::{Filter, Stats, Status, Task, derive_status};
use crate::storage::Storage;
use crate::validation;
use time::Date;
use tracing::{debug, info, warn};

/// Owner of the task list. Every mutation is mirrored to storage.
#[derive(Debug)]
pub struct TaskStore<S, C> {
    tasks: Vec<Task>,
    storage: S,
    clock: C,
    last_id: u64,
}

impl<S: Storage, C: Clock> TaskStore<S, C> {
    /// Replaces the in-memory list with whatever storage holds.
    pub fn open(storage: S, clock: C) -> Self {
        let tasks = storage.load();
        let last_id = tasks.iter().map(|task| task.id).max().unwrap_or(0);
        info!(count = tasks.len(), "hydrated task list");

        Self {
            tasks,
            storage,
            clock,
            last_id,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn today(&self) -> Date {
        self.clock.today()
    }

    pub fn validate_text(&self, text: &str) -> Result<(), ValidationError> {
        validation::validate_text(&self.tasks, text)
    }

    pub fn validate_due_date(&self, due_date: Option<Date>) -> Result<(), ValidationError> {
        validation::validate_due_date(due_date, self.today())
    }

    pub fn validate_new_task(
        &self,
        text: &str,
        due_date: Option<Date>,
    ) -> Result<(), ValidationError> {
        validation::validate_new_task(&self.tasks, text, due_date, self.today())
    }

    /// Does not re-validate; callers run `validate_new_task` first.
    pub fn add_task(&mut self, text: &str, due_date: Date) -> Task {
        let now = self.clock.now();
        let id = self.next_id();
        let task = Task {
            id,
            text: text.trim().to_string(),
            due_date,
            completed: false,
            created_at: now,
            completed_at: None,
        };

        self.tasks.insert(0, task.clone());
        debug!(id, total = self.tasks.len(), "task added");
        self.persist();

        task
    }

    /// Unknown ids are ignored.
    pub fn toggle_task(&mut self, id: u64) -> Option<Task> {
        let now = self.clock.now();
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;

        task.completed = !task.completed;
        task.completed_at = task.completed.then_some(now);
        let updated = task.clone();
        debug!(id, completed = updated.completed, "task toggled");
        self.persist();

        Some(updated)
    }

    /// Unknown ids are ignored.
    pub fn delete_task(&mut self, id: u64) -> Option<Task> {
        let removed = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .map(|index| self.tasks.remove(index));

        if removed.is_some() {
            debug!(id, total = self.tasks.len(), "task deleted");
        }
        self.persist();

        removed
    }

    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.completed);
        let removed = before - self.tasks.len();

        if removed > 0 {
            debug!(removed, "completed tasks cleared");
            self.persist();
        }

        removed
    }

    pub fn filtered_view(&self, filter: Filter) -> Vec<&Task> {
        filter_tasks(&self.tasks, filter, self.today())
    }

    pub fn stats(&self) -> Stats {
        stats_for(&self.tasks)
    }

    fn next_id(&mut self) -> u64 {
        let millis = self.clock.now().unix_timestamp_nanos() / 1_000_000;
        let candidate = u64::try_from(millis).unwrap_or(0);
        let id = match self.last_id.checked_add(1) {
            Some(floor) => candidate.max(floor),
            None => self.unused_id(candidate),
        };
        self.last_id = self.last_id.max(id);
        id
    }

    /// Id space above `last_id` is exhausted: reuse any free id.
    fn unused_id(&self, candidate: u64) -> u64 {
        let taken = |id: u64| self.tasks.iter().any(|task| task.id == id);
        if !taken(candidate) {
            return candidate;
        }
        (1..=u64::MAX).find(|id| !taken(*id)).unwrap_or(candidate)
    }

    fn persist(&self) {
        if let Err(err) = self.storage.save(&self.tasks) {
            warn!(error = %err, "failed to persist task list");
        }
    }
}

/// Keeps list order; never reorders.
pub fn filter_tasks(tasks: &[Task], filter: Filter, today: Date) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| match filter {
            Filter::All => true,
            Filter::Completed => task.completed,
            Filter::Pending => derive_status(task, today) == Status::Pending,
            Filter::Overdue => derive_status(task, today) == Status::Overdue,
        })
        .collect()
}

pub fn stats_for(tasks: &[Task]) -> Stats {
    Stats {
        total: tasks.len(),
        completed: tasks.iter().filter(|task| task.completed).count(),
    }
}
