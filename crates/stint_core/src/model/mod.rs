mod task;

pub use task::{HistoryEvent, Task, TaskStatus};
