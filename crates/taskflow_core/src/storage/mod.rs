pub mod json_store;
mod memory;

pub use json_store::JsonFileStorage;
pub use memory::MemoryStorage;

use crate::error::AppError;
use crate::model::Task;
use std::collections::HashSet;

/// Name of the single slot the task list is mirrored into.
pub const STORAGE_KEY: &str = "taskflow-tasks";

/// Persistence port behind `TaskStore`.
///
/// `load` never fails: a missing or unreadable slot reads as an empty list.
pub trait Storage {
    fn load(&self) -> Vec<Task>;

    fn save(&self, tasks: &[Task]) -> Result<(), AppError>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn load(&self) -> Vec<Task> {
        (**self).load()
    }

    fn save(&self, tasks: &[Task]) -> Result<(), AppError> {
        (**self).save(tasks)
    }
}

pub fn encode_tasks(tasks: &[Task]) -> Result<String, AppError> {
    serde_json::to_string(tasks).map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn decode_tasks(content: &str) -> Result<Vec<Task>, AppError> {
    let tasks: Vec<Task> =
        serde_json::from_str(content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    let mut seen = HashSet::with_capacity(tasks.len());
    for task in &tasks {
        if !seen.insert(task.id) {
            return Err(AppError::invalid_data(format!("duplicate task id {}", task.id)));
        }
    }

    Ok(tasks)
}
