//! Status transitions and recurring occurrences.
//!
//! Any status may move to any other. Moving a recurring task into
//! `Completed` spawns its next occurrence in the same transaction.

use chrono::Days;
use rusqlite::Connection;
use tracing::info;

use crate::db::{in_transaction, task_repo};
use crate::error::TaskError;
use crate::models::{NewTask, Task, TaskStatus};
use crate::service::store;

pub fn parse_status(value: &str) -> Result<TaskStatus, TaskError> {
    TaskStatus::from_str(value).ok_or_else(|| TaskError::invalid_status(value))
}

/// Set the status of a task and return the updated task (never the spawned
/// occurrence).
pub fn set_status(conn: &Connection, task_id: i64, new_status: &str) -> Result<Task, TaskError> {
    let status = parse_status(new_status)?;
    in_transaction(conn, |conn| {
        let task = task_repo::get_task_by_id(conn, task_id)?;
        task_repo::update_task_status(conn, task_id, status)?;

        let entering_completed =
            status == TaskStatus::Completed && task.status != TaskStatus::Completed;
        if entering_completed && task.is_recurring() {
            let next = next_occurrence(&task)?;
            let spawned = store::create_in(conn, &next)?;
            info!(task_id, spawned_id = spawned.id, "spawned next occurrence");
        }

        info!(task_id, from = task.status.as_str(), to = status.as_str(), "status changed");
        task_repo::get_task_by_id(conn, task_id)
    })
}

/// The task that follows `task` once it is completed: it starts on the old
/// deadline and is due `recurring` days later.
pub fn next_occurrence(task: &Task) -> Result<NewTask, TaskError> {
    let deadline = task.deadline.ok_or_else(|| {
        TaskError::invalid_operation(format!(
            "Task {} is a recurring task without a deadline; cannot create next occurrence",
            task.id
        ))
    })?;
    let days = u64::try_from(task.recurring)
        .map_err(|_| TaskError::validation("recurring interval must not be negative"))?;
    let next_deadline = deadline
        .checked_add_days(Days::new(days))
        .ok_or_else(|| TaskError::validation("next deadline is out of the supported date range"))?;

    Ok(NewTask {
        title: task.title.clone(),
        description: task.description.clone(),
        start_date: Some(deadline),
        deadline: Some(next_deadline),
        priority: task.priority,
        recurring: task.recurring,
        tag: task.tag.clone(),
        project_id: task.project_id,
        status: TaskStatus::Todo,
        parent_id: None,
    })
}
