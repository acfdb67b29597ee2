//! Scalar CRUD over task rows.
//!
//! Status changes go through [`crate::service::lifecycle`] and hierarchy
//! edges through [`crate::service::hierarchy`]; this module refuses both.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::db::{hierarchy_repo, in_read_transaction, in_transaction, task_repo};
use crate::error::TaskError;
use crate::models::{
    NewTask, Task, TaskPatch, TaskWithSubtasks, MAX_PRIORITY, MAX_TITLE_LEN, MIN_PRIORITY,
};
use crate::service::hierarchy;

pub fn validate_title(title: &str) -> Result<(), TaskError> {
    if title.trim().is_empty() {
        return Err(TaskError::validation("Task title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(TaskError::validation(format!(
            "Task title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_priority(priority: i32) -> Result<(), TaskError> {
    if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
        return Err(TaskError::validation(format!(
            "priority must be between {MIN_PRIORITY} and {MAX_PRIORITY}, got {priority}"
        )));
    }
    Ok(())
}

pub fn validate_recurring(recurring: i64) -> Result<(), TaskError> {
    if recurring < 0 {
        return Err(TaskError::validation(format!(
            "recurring must be 0 or a positive number of days, got {recurring}"
        )));
    }
    Ok(())
}

pub fn validate_new_task(task: &NewTask) -> Result<(), TaskError> {
    validate_title(&task.title)?;
    validate_priority(task.priority)?;
    validate_recurring(task.recurring)
}

pub fn create(conn: &Connection, task: &NewTask) -> Result<Task, TaskError> {
    validate_new_task(task)?;
    in_transaction(conn, |conn| create_in(conn, task))
}

/// Insert without opening a transaction; the caller owns it.
pub(crate) fn create_in(conn: &Connection, task: &NewTask) -> Result<Task, TaskError> {
    let created = task_repo::insert_task(conn, task)?;
    if let Some(parent_id) = task.parent_id {
        hierarchy::attach_in(conn, parent_id, &[created.id])?;
    }
    info!(task_id = created.id, project_id = created.project_id, "created task");
    Ok(created)
}

pub fn get(conn: &Connection, task_id: i64) -> Result<Task, TaskError> {
    task_repo::get_task_by_id(conn, task_id)
}

pub fn get_with_subtasks(conn: &Connection, task_id: i64) -> Result<TaskWithSubtasks, TaskError> {
    in_read_transaction(conn, |conn| get_with_subtasks_in(conn, task_id))
}

/// Same as [`get_with_subtasks`], for callers already inside a transaction.
pub fn get_with_subtasks_in(conn: &Connection, task_id: i64) -> Result<TaskWithSubtasks, TaskError> {
    let task = task_repo::get_task_by_id(conn, task_id)?;
    let subtask_ids = hierarchy_repo::get_subtask_ids(conn, task_id)?;
    let subtasks = task_repo::get_tasks_by_ids(conn, &subtask_ids)?;
    Ok(TaskWithSubtasks { task, subtasks })
}

pub fn update(conn: &Connection, task_id: i64, patch: &TaskPatch) -> Result<Task, TaskError> {
    if patch.status.is_some() {
        return Err(TaskError::invalid_operation(
            "status cannot be changed through update; use set_status",
        ));
    }
    if patch.active.is_some() {
        return Err(TaskError::invalid_operation(
            "active cannot be changed through update; use delete or restore",
        ));
    }
    if let Some(ref title) = patch.title {
        validate_title(title)?;
    }
    if let Some(priority) = patch.priority {
        validate_priority(priority)?;
    }
    if let Some(recurring) = patch.recurring {
        validate_recurring(recurring)?;
    }

    in_transaction(conn, |conn| {
        let task = task_repo::get_task_by_id(conn, task_id)?;
        if patch.is_empty() {
            debug!(task_id, "empty patch, nothing to update");
            return Ok(task);
        }
        task_repo::update_task_fields(conn, task_id, patch)?;
        info!(task_id, "updated task");
        task_repo::get_task_by_id(conn, task_id)
    })
}

/// Mark a task inactive and drop every hierarchy edge touching it.
/// Its subtasks become root-level tasks.
pub fn soft_delete(conn: &Connection, task_id: i64) -> Result<Task, TaskError> {
    in_transaction(conn, |conn| {
        let task = task_repo::get_task_by_id(conn, task_id)?;
        if !task.active {
            return Err(TaskError::task_not_found(task_id));
        }
        let removed = hierarchy::cascade_remove_edges(conn, task_id)?;
        task_repo::set_task_active(conn, task_id, false)?;
        info!(task_id, edges_removed = removed, "soft-deleted task");
        task_repo::get_task_by_id(conn, task_id)
    })
}

/// Reactivate a soft-deleted task. Edges removed by the delete stay removed.
pub fn restore(conn: &Connection, task_id: i64) -> Result<Task, TaskError> {
    in_transaction(conn, |conn| {
        let task = task_repo::get_task_by_id(conn, task_id)?;
        if task.active {
            return Err(TaskError::task_not_found(task_id));
        }
        task_repo::set_task_active(conn, task_id, true)?;
        info!(task_id, "restored task");
        task_repo::get_task_by_id(conn, task_id)
    })
}

pub fn list(conn: &Connection, active_only: bool) -> Result<Vec<Task>, TaskError> {
    task_repo::list_tasks(conn, active_only)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::error::ErrorCode;
    use crate::models::TaskStatus;
    use chrono::NaiveDate;

    fn add(conn: &Connection, title: &str) -> Task {
        create(conn, &NewTask::new(title, 1)).unwrap()
    }

    #[test]
    fn test_create_defaults() {
        let conn = open_in_memory().unwrap();
        let t = add(&conn, "Write report");
        assert_eq!(t.status, TaskStatus::Todo);
        assert_eq!(t.priority, 5);
        assert_eq!(t.recurring, 0);
        assert!(t.active);
        assert_eq!(t.project_id, 1);
    }

    #[test]
    fn test_create_full_fields() {
        let conn = open_in_memory().unwrap();
        let mut input = NewTask::new("Quarterly review", 9);
        input.description = Some("prepare slides".into());
        input.start_date = NaiveDate::from_ymd_opt(2025, 10, 1);
        input.deadline = NaiveDate::from_ymd_opt(2025, 10, 11);
        input.priority = 8;
        input.recurring = 7;
        input.tag = Some("ops".into());
        input.status = TaskStatus::InProgress;
        let t = create(&conn, &input).unwrap();
        assert_eq!(t.description.as_deref(), Some("prepare slides"));
        assert_eq!(t.deadline, NaiveDate::from_ymd_opt(2025, 10, 11));
        assert_eq!(t.priority, 8);
        assert_eq!(t.recurring, 7);
        assert_eq!(t.tag.as_deref(), Some("ops"));
        assert_eq!(t.status, TaskStatus::InProgress);
        assert_eq!(get(&conn, t.id).unwrap(), t);
    }

    #[test]
    fn test_create_rejects_blank_title() {
        let conn = open_in_memory().unwrap();
        for title in ["", "   ", "\t\n"] {
            let err = create(&conn, &NewTask::new(title, 1)).unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationError);
        }
        let long = "x".repeat(MAX_TITLE_LEN + 1);
        let err = create(&conn, &NewTask::new(long, 1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(task_repo::count_tasks(&conn).unwrap(), 0);
    }

    #[test]
    fn test_create_rejects_priority_out_of_range() {
        let conn = open_in_memory().unwrap();
        for priority in [0, 11, -1] {
            let mut input = NewTask::new("t", 1);
            input.priority = priority;
            let err = create(&conn, &input).unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationError);
        }
        for priority in [1, 10] {
            let mut input = NewTask::new("t", 1);
            input.priority = priority;
            assert!(create(&conn, &input).is_ok());
        }
    }

    #[test]
    fn test_create_with_parent_links() {
        let conn = open_in_memory().unwrap();
        let parent = add(&conn, "parent");
        let mut input = NewTask::new("child", 1);
        input.parent_id = Some(parent.id);
        let child = create(&conn, &input).unwrap();
        let hydrated = get_with_subtasks(&conn, parent.id).unwrap();
        assert_eq!(hydrated.subtask_ids(), vec![child.id]);
    }

    #[test]
    fn test_get_with_subtasks_inside_and_outside_transactions() {
        let conn = open_in_memory().unwrap();
        let parent = add(&conn, "parent");
        get_with_subtasks(&conn, parent.id).unwrap();
        assert!(conn.is_autocommit());

        let hydrated = in_transaction(&conn, |conn| get_with_subtasks_in(conn, parent.id)).unwrap();
        assert_eq!(hydrated.task.id, parent.id);
        assert_eq!(
            get_with_subtasks(&conn, 404).unwrap_err().code,
            ErrorCode::NotFound
        );
        assert!(conn.is_autocommit());
    }

    #[test]
    fn test_create_with_missing_parent_leaves_no_row() {
        let conn = open_in_memory().unwrap();
        let mut input = NewTask::new("orphan", 1);
        input.parent_id = Some(999);
        let err = create(&conn, &input).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(task_repo::count_tasks(&conn).unwrap(), 0);
    }

    #[test]
    fn test_create_with_inactive_parent() {
        let conn = open_in_memory().unwrap();
        let parent = add(&conn, "parent");
        soft_delete(&conn, parent.id).unwrap();
        let mut input = NewTask::new("child", 1);
        input.parent_id = Some(parent.id);
        let err = create(&conn, &input).unwrap_err();
        assert_eq!(err.code, ErrorCode::InactiveEntity);
        assert_eq!(task_repo::count_tasks(&conn).unwrap(), 1);
    }

    #[test]
    fn test_get_missing() {
        let conn = open_in_memory().unwrap();
        assert_eq!(get(&conn, 42).unwrap_err().code, ErrorCode::NotFound);
    }

    #[test]
    fn test_update_changes_only_given_fields() {
        let conn = open_in_memory().unwrap();
        let t = add(&conn, "before");
        let patch = TaskPatch {
            title: Some("after".into()),
            priority: Some(9),
            deadline: NaiveDate::from_ymd_opt(2025, 12, 1),
            ..Default::default()
        };
        let updated = update(&conn, t.id, &patch).unwrap();
        assert_eq!(updated.title, "after");
        assert_eq!(updated.priority, 9);
        assert_eq!(updated.deadline, NaiveDate::from_ymd_opt(2025, 12, 1));
        assert_eq!(updated.project_id, t.project_id);
        assert_eq!(updated.status, TaskStatus::Todo);
    }

    #[test]
    fn test_update_rejects_status_and_active() {
        let conn = open_in_memory().unwrap();
        let t = add(&conn, "t");
        let patch = TaskPatch {
            status: Some("Completed".into()),
            ..Default::default()
        };
        assert_eq!(update(&conn, t.id, &patch).unwrap_err().code, ErrorCode::InvalidOperation);
        let patch = TaskPatch {
            active: Some(false),
            title: Some("renamed".into()),
            ..Default::default()
        };
        assert_eq!(update(&conn, t.id, &patch).unwrap_err().code, ErrorCode::InvalidOperation);
        let after = get(&conn, t.id).unwrap();
        assert_eq!(after.title, "t");
        assert!(after.active);
    }

    #[test]
    fn test_update_validates_and_reports_missing() {
        let conn = open_in_memory().unwrap();
        let t = add(&conn, "t");
        let bad = TaskPatch { priority: Some(0), ..Default::default() };
        assert_eq!(update(&conn, t.id, &bad).unwrap_err().code, ErrorCode::ValidationError);
        let ok = TaskPatch { priority: Some(3), ..Default::default() };
        assert_eq!(update(&conn, 404, &ok).unwrap_err().code, ErrorCode::NotFound);
    }

    #[test]
    fn test_update_empty_patch_is_noop() {
        let conn = open_in_memory().unwrap();
        let t = add(&conn, "t");
        assert_eq!(update(&conn, t.id, &TaskPatch::default()).unwrap(), t);
    }

    #[test]
    fn test_soft_delete_twice_fails() {
        let conn = open_in_memory().unwrap();
        let t = add(&conn, "t");
        let deleted = soft_delete(&conn, t.id).unwrap();
        assert!(!deleted.active);
        assert_eq!(soft_delete(&conn, t.id).unwrap_err().code, ErrorCode::NotFound);
        assert_eq!(soft_delete(&conn, 77).unwrap_err().code, ErrorCode::NotFound);
    }

    #[test]
    fn test_restore_reactivates_without_relinking() {
        let conn = open_in_memory().unwrap();
        let parent = add(&conn, "parent");
        let child = add(&conn, "child");
        hierarchy::attach(&conn, parent.id, &[child.id]).unwrap();
        soft_delete(&conn, parent.id).unwrap();

        let restored = restore(&conn, parent.id).unwrap();
        assert!(restored.active);
        assert!(get_with_subtasks(&conn, parent.id).unwrap().subtasks.is_empty());
        assert_eq!(restore(&conn, parent.id).unwrap_err().code, ErrorCode::NotFound);
    }

    #[test]
    fn test_list_active_only() {
        let conn = open_in_memory().unwrap();
        let a = add(&conn, "a");
        add(&conn, "b");
        soft_delete(&conn, a.id).unwrap();
        assert_eq!(list(&conn, true).unwrap().len(), 1);
        assert_eq!(list(&conn, false).unwrap().len(), 2);
    }
}
