use rusqlite::{params, Connection, ErrorCode as SqliteErrorCode, OptionalExtension};

use crate::error::TaskError;
use crate::models::ParentAssignment;

/// Record a parent → subtask edge.
///
/// A unique-constraint failure on `subtask_id` means another writer attached
/// the subtask first; it is reported as a parent conflict.
pub fn insert_edge(conn: &Connection, parent_id: i64, subtask_id: i64) -> Result<(), TaskError> {
    conn.execute(
        "INSERT INTO parent_assignment (parent_id, subtask_id) VALUES (?1, ?2)",
        params![parent_id, subtask_id],
    )
    .map_err(|e| match e.sqlite_error_code() {
        Some(SqliteErrorCode::ConstraintViolation) => TaskError::already_has_parent(subtask_id),
        _ => TaskError::from(e),
    })?;
    Ok(())
}

/// Remove exactly one edge. Returns whether it existed.
pub fn delete_edge(conn: &Connection, parent_id: i64, subtask_id: i64) -> Result<bool, TaskError> {
    let removed = conn.execute(
        "DELETE FROM parent_assignment WHERE parent_id = ?1 AND subtask_id = ?2",
        params![parent_id, subtask_id],
    )?;
    Ok(removed > 0)
}

/// Remove every edge where the task is either end. Returns the number removed.
pub fn delete_edges_touching(conn: &Connection, task_id: i64) -> Result<usize, TaskError> {
    let removed = conn.execute(
        "DELETE FROM parent_assignment WHERE parent_id = ?1 OR subtask_id = ?1",
        params![task_id],
    )?;
    Ok(removed)
}

pub fn get_parent_id(conn: &Connection, subtask_id: i64) -> Result<Option<i64>, TaskError> {
    let parent = conn
        .query_row(
            "SELECT parent_id FROM parent_assignment WHERE subtask_id = ?1",
            params![subtask_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(parent)
}

pub fn get_subtask_ids(conn: &Connection, parent_id: i64) -> Result<Vec<i64>, TaskError> {
    let mut stmt = conn.prepare(
        "SELECT subtask_id FROM parent_assignment WHERE parent_id = ?1 ORDER BY subtask_id ASC",
    )?;
    let ids = stmt
        .query_map(params![parent_id], |row| row.get(0))?
        .collect::<Result<Vec<i64>, _>>()?;
    Ok(ids)
}

/// Every id that currently has a parent.
pub fn get_all_subtask_ids(conn: &Connection) -> Result<Vec<i64>, TaskError> {
    let mut stmt = conn.prepare("SELECT subtask_id FROM parent_assignment")?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<i64>, _>>()?;
    Ok(ids)
}

/// All edges (used for cycle detection).
pub fn get_all_edges(conn: &Connection) -> Result<Vec<ParentAssignment>, TaskError> {
    let mut stmt = conn.prepare("SELECT parent_id, subtask_id FROM parent_assignment")?;
    let edges = stmt
        .query_map([], |row| {
            Ok(ParentAssignment {
                parent_id: row.get(0)?,
                subtask_id: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(edges)
}
