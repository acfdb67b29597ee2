use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MAX_TITLE_LEN: usize = 255;
pub const MIN_PRIORITY: i32 = 1;
pub const MAX_PRIORITY: i32 = 10;
pub const DEFAULT_PRIORITY: i32 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To-do")]
    Todo,
    #[serde(rename = "In-progress")]
    InProgress,
    Completed,
    Blocked,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        Self::Todo,
        Self::InProgress,
        Self::Completed,
        Self::Blocked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "To-do",
            Self::InProgress => "In-progress",
            Self::Completed => "Completed",
            Self::Blocked => "Blocked",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "To-do" => Some(Self::Todo),
            "In-progress" => Some(Self::InProgress),
            "Completed" => Some(Self::Completed),
            "Blocked" => Some(Self::Blocked),
            _ => None,
        }
    }

    /// Position in the `status` sort order.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Todo => 0,
            Self::InProgress => 1,
            Self::Completed => 2,
            Self::Blocked => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub status: TaskStatus,
    pub priority: i32,
    pub recurring: i64,
    pub tag: Option<String>,
    pub project_id: i64,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Task {
    pub fn is_recurring(&self) -> bool {
        self.recurring > 0
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub recurring: i64,
    #[serde(default)]
    pub tag: Option<String>,
    pub project_id: i64,
    #[serde(default)]
    pub status: TaskStatus,
    /// Attach the new task under this parent in the same transaction.
    #[serde(default)]
    pub parent_id: Option<i64>,
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

impl NewTask {
    pub fn new(title: impl Into<String>, project_id: i64) -> Self {
        Self {
            title: title.into(),
            description: None,
            start_date: None,
            deadline: None,
            priority: DEFAULT_PRIORITY,
            recurring: 0,
            tag: None,
            project_id,
            status: TaskStatus::Todo,
            parent_id: None,
        }
    }
}

/// Scalar changes for an existing task. `None` leaves a field untouched.
///
/// `status` and `active` exist only so that attempts to set them are
/// rejected; they have their own gates (`lifecycle::set_status`,
/// `store::soft_delete` / `store::restore`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub priority: Option<i32>,
    pub recurring: Option<i64>,
    pub tag: Option<String>,
    pub project_id: Option<i64>,
    pub status: Option<String>,
    pub active: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A task together with its direct subtasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskWithSubtasks {
    #[serde(flatten)]
    pub task: Task,
    pub subtasks: Vec<Task>,
}

impl TaskWithSubtasks {
    pub fn subtask_ids(&self) -> Vec<i64> {
        self.subtasks.iter().map(|t| t.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::from_str(status.as_str()), Some(status));
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert_eq!(TaskStatus::from_str("todo"), None);
        assert_eq!(TaskStatus::from_str("COMPLETED"), None);
    }

    #[test]
    fn test_status_rank_order() {
        let ranks: Vec<u8> = TaskStatus::ALL.iter().map(|s| s.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_status_default_is_todo() {
        assert_eq!(TaskStatus::default(), TaskStatus::Todo);
    }

    #[test]
    fn test_new_task_defaults_from_json() {
        let t: NewTask = serde_json::from_str(r#"{"title":"x","project_id":3}"#).unwrap();
        assert_eq!(t.priority, 5);
        assert_eq!(t.recurring, 0);
        assert_eq!(t.status, TaskStatus::Todo);
        assert_eq!(t.parent_id, None);
    }

    #[test]
    fn test_empty_patch() {
        assert!(TaskPatch::default().is_empty());
        let p = TaskPatch { priority: Some(3), ..Default::default() };
        assert!(!p.is_empty());
    }
}
