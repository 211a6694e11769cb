use crate::error::AppError;
use crate::model::Task;
use crate::storage::{Storage, decode_tasks, encode_tasks};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::warn;

/// In-process slot holding the serialized payload.
///
/// Clones share the same slot, so a second store opened on a clone sees what
/// the first one saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Rc<RefCell<Option<String>>>,
    fail_writes: Rc<Cell<bool>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content<C: Into<String>>(content: C) -> Self {
        let storage = Self::default();
        storage.slot.replace(Some(content.into()));
        storage
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Number of successful saves.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Vec<Task> {
        let slot = self.slot.borrow();
        let Some(content) = slot.as_deref() else {
            return Vec::new();
        };

        decode_tasks(content).unwrap_or_else(|err| {
            warn!(error = %err, "stored task list is unreadable, starting empty");
            Vec::new()
        })
    }

    fn save(&self, tasks: &[Task]) -> Result<(), AppError> {
        if self.fail_writes.get() {
            return Err(AppError::io("storage quota exceeded"));
        }

        let content = encode_tasks(tasks)?;
        self.slot.replace(Some(content));
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
