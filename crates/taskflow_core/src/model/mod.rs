mod filter;
mod task;

pub use filter::{Filter, Stats};
pub use task::{ISO_DATE, Priority, Status, Task, derive_priority, derive_status};
