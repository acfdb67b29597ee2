use rusqlite::{params, params_from_iter, Connection};

use crate::error::TaskError;
use crate::models::{NewTask, Task, TaskPatch, TaskStatus};

const TASK_COLUMNS: &str = "id, title, description, start_date, deadline, status, priority,
                recurring, tag, project_id, active, created_at, updated_at";

pub fn insert_task(conn: &Connection, task: &NewTask) -> Result<Task, TaskError> {
    conn.execute(
        "INSERT INTO tasks (title, description, start_date, deadline, status, priority,
                            recurring, tag, project_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            task.title,
            task.description,
            task.start_date,
            task.deadline,
            task.status.as_str(),
            task.priority,
            task.recurring,
            task.tag,
            task.project_id,
        ],
    )?;
    get_task_by_id(conn, conn.last_insert_rowid())
}

pub fn get_task_by_id(conn: &Connection, id: i64) -> Result<Task, TaskError> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
        params![id],
        row_to_task,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => TaskError::task_not_found(id),
        _ => TaskError::from(e),
    })
}

/// Fetch the rows for `ids` that exist, in ascending id order.
pub fn get_tasks_by_ids(conn: &Connection, ids: &[i64]) -> Result<Vec<Task>, TaskError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; ids.len()].join(", ");
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id IN ({placeholders}) ORDER BY id ASC"
    ))?;
    let tasks = stmt
        .query_map(params_from_iter(ids.iter()), row_to_task)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tasks)
}

pub fn list_tasks(conn: &Connection, active_only: bool) -> Result<Vec<Task>, TaskError> {
    let sql = if active_only {
        format!("SELECT {TASK_COLUMNS} FROM tasks WHERE active = 1")
    } else {
        format!("SELECT {TASK_COLUMNS} FROM tasks")
    };
    let mut stmt = conn.prepare(&sql)?;
    let tasks = stmt
        .query_map([], row_to_task)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tasks)
}

/// Apply the scalar fields of a patch. Fields left `None` keep their value.
pub fn update_task_fields(conn: &Connection, id: i64, patch: &TaskPatch) -> Result<(), TaskError> {
    conn.execute(
        "UPDATE tasks SET
            title = COALESCE(?1, title),
            description = COALESCE(?2, description),
            start_date = COALESCE(?3, start_date),
            deadline = COALESCE(?4, deadline),
            priority = COALESCE(?5, priority),
            recurring = COALESCE(?6, recurring),
            tag = COALESCE(?7, tag),
            project_id = COALESCE(?8, project_id),
            updated_at = datetime('now')
         WHERE id = ?9",
        params![
            patch.title,
            patch.description,
            patch.start_date,
            patch.deadline,
            patch.priority,
            patch.recurring,
            patch.tag,
            patch.project_id,
            id,
        ],
    )?;
    Ok(())
}

pub fn update_task_status(conn: &Connection, id: i64, status: TaskStatus) -> Result<(), TaskError> {
    conn.execute(
        "UPDATE tasks SET status = ?1, updated_at = datetime('now') WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    Ok(())
}

pub fn set_task_active(conn: &Connection, id: i64, active: bool) -> Result<(), TaskError> {
    conn.execute(
        "UPDATE tasks SET active = ?1, updated_at = datetime('now') WHERE id = ?2",
        params![active, id],
    )?;
    Ok(())
}

#[cfg(test)]
pub fn count_tasks(conn: &Connection) -> Result<i64, TaskError> {
    let count = conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?;
    Ok(count)
}

fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    let status: String = row.get(5)?;
    let status = TaskStatus::from_str(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Text,
            format!("unknown task status '{status}'").into(),
        )
    })?;
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        start_date: row.get(3)?,
        deadline: row.get(4)?,
        status,
        priority: row.get(6)?,
        recurring: row.get(7)?,
        tag: row.get(8)?,
        project_id: row.get(9)?,
        active: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}
