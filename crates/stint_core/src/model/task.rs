use serde::{Deserialize, Serialize};

/// One start/stop marker in a task's work history, ordered by `time`
/// (epoch seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub is_start: bool,
    pub time: i64,
}

impl HistoryEvent {
    pub fn start(time: i64) -> Self {
        Self {
            is_start: true,
            time,
        }
    }

    pub fn stop(time: i64) -> Self {
        Self {
            is_start: false,
            time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub estimate: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub last_modified: i64,
    #[serde(default)]
    pub history: Vec<HistoryEvent>,
}

impl Task {
    /// `N hr` / `N hrs`, or empty when no estimate is set.
    pub fn estimate_display(&self) -> String {
        match self.estimate {
            Some(1) => "1 hr".to_string(),
            Some(hours) => format!("{hours} hrs"),
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    Current,
    InProgress,
    Finished,
}

impl TaskStatus {
    /// The exact literal used in the task text format.
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::Current => "Current",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Finished => "Finished",
        }
    }

    /// Inverse of [`label`](Self::label); only the four exact literals match.
    pub fn from_label(text: &str) -> Option<TaskStatus> {
        match text {
            "TODO" => Some(TaskStatus::Todo),
            "Current" => Some(TaskStatus::Current),
            "In Progress" => Some(TaskStatus::InProgress),
            "Finished" => Some(TaskStatus::Finished),
            _ => None,
        }
    }

    /// Display ordering for listings: active work first, finished last.
    pub fn sort_rank(self) -> u8 {
        match self {
            TaskStatus::Current => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Todo => 2,
            TaskStatus::Finished => 3,
        }
    }
}
