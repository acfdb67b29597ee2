use thiserror::Error;

use crate::models::TaskStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotInitialized,
    NotFound,
    InactiveEntity,
    AlreadyHasParent,
    CycleDetected,
    InvalidStatus,
    InvalidSort,
    InvalidFilter,
    InvalidFilterCombination,
    InvalidOperation,
    ValidationError,
    ConfigError,
    DatabaseError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::NotFound => "NOT_FOUND",
            Self::InactiveEntity => "INACTIVE_ENTITY",
            Self::AlreadyHasParent => "ALREADY_HAS_PARENT",
            Self::CycleDetected => "CYCLE_DETECTED",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::InvalidSort => "INVALID_SORT",
            Self::InvalidFilter => "INVALID_FILTER",
            Self::InvalidFilterCombination => "INVALID_FILTER_COMBINATION",
            Self::InvalidOperation => "INVALID_OPERATION",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
        }
    }

    /// Both hierarchy conflicts: a second parent, or a closed cycle.
    #[cfg(test)]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyHasParent | Self::CycleDetected)
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct TaskError {
    pub code: ErrorCode,
    pub message: String,
}

impl TaskError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_initialized() -> Self {
        Self::new(
            ErrorCode::NotInitialized,
            "tasktree is not initialized. Run `tasktree init` first.",
        )
    }

    pub fn task_not_found(task_id: i64) -> Self {
        Self::new(ErrorCode::NotFound, format!("Task not found: {task_id}"))
    }

    pub fn tasks_not_found(task_ids: &[i64]) -> Self {
        let ids: Vec<String> = task_ids.iter().map(|id| id.to_string()).collect();
        Self::new(
            ErrorCode::NotFound,
            format!("Subtask(s) not found: {}", ids.join(", ")),
        )
    }

    pub fn link_not_found(parent_id: i64, subtask_id: i64) -> Self {
        Self::new(
            ErrorCode::NotFound,
            format!("Link not found for parent={parent_id}, subtask={subtask_id}"),
        )
    }

    pub fn inactive_parent(parent_id: i64) -> Self {
        Self::new(
            ErrorCode::InactiveEntity,
            format!("Parent task {parent_id} is inactive and cannot accept subtasks"),
        )
    }

    pub fn inactive_subtasks(task_ids: &[i64]) -> Self {
        let ids: Vec<String> = task_ids.iter().map(|id| id.to_string()).collect();
        Self::new(
            ErrorCode::InactiveEntity,
            format!("Subtask(s) inactive: {}", ids.join(", ")),
        )
    }

    pub fn already_has_parent(subtask_id: i64) -> Self {
        Self::new(
            ErrorCode::AlreadyHasParent,
            format!("Task {subtask_id} already has a parent"),
        )
    }

    pub fn cycle_detected(parent_id: i64, subtask_id: i64) -> Self {
        Self::new(
            ErrorCode::CycleDetected,
            format!(
                "Cycle detected: task {parent_id} cannot be a parent of task {subtask_id}, \
                 it is the subtask itself or one of its descendants"
            ),
        )
    }

    pub fn invalid_status(value: &str) -> Self {
        Self::new(
            ErrorCode::InvalidStatus,
            format!(
                "Invalid status '{value}'. Expected one of: {}",
                TaskStatus::ALL.map(|s| s.as_str()).join(", ")
            ),
        )
    }

    pub fn invalid_sort(value: &str) -> Self {
        Self::new(ErrorCode::InvalidSort, format!("Invalid sort_by parameter: {value}"))
    }

    pub fn invalid_filter(key: &str) -> Self {
        Self::new(ErrorCode::InvalidFilter, format!("Invalid filter_by key: {key}"))
    }

    pub fn invalid_filter_combination(keys: &[&str]) -> Self {
        Self::new(
            ErrorCode::InvalidFilterCombination,
            format!(
                "Filters cannot be combined: {}. Only deadline_range and start_date_range compose.",
                keys.join(", ")
            ),
        )
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidOperation, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }
}

impl From<rusqlite::Error> for TaskError {
    fn from(e: rusqlite::Error) -> Self {
        Self::database(e.to_string())
    }
}
