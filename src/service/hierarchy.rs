//! Parent → subtask edges.
//!
//! This module is the only writer of `parent_assignment`. Every task has at
//! most one parent and the edge set never contains a cycle.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::db::{hierarchy_repo, in_transaction, task_repo};
use crate::error::TaskError;
use crate::graph::cycle::EdgeIndex;
use crate::models::{Task, TaskWithSubtasks};
use crate::service::store;

/// Attach `subtask_ids` under `parent_id`, all or nothing.
///
/// Ids are processed in input order; an edge recorded for an earlier id is
/// visible to the checks for later ones. Returns the parent with its subtasks.
pub fn attach(
    conn: &Connection,
    parent_id: i64,
    subtask_ids: &[i64],
) -> Result<TaskWithSubtasks, TaskError> {
    in_transaction(conn, |conn| {
        attach_in(conn, parent_id, subtask_ids)?;
        store::get_with_subtasks_in(conn, parent_id)
    })
}

pub(crate) fn attach_in(
    conn: &Connection,
    parent_id: i64,
    subtask_ids: &[i64],
) -> Result<(), TaskError> {
    let parent = task_repo::get_task_by_id(conn, parent_id)?;
    if !parent.active {
        return Err(TaskError::inactive_parent(parent_id));
    }
    if subtask_ids.is_empty() {
        return Ok(());
    }

    let found = task_repo::get_tasks_by_ids(conn, subtask_ids)?;
    let mut missing: Vec<i64> = Vec::new();
    for id in subtask_ids {
        if !found.iter().any(|t| t.id == *id) && !missing.contains(id) {
            missing.push(*id);
        }
    }
    if !missing.is_empty() {
        return Err(TaskError::tasks_not_found(&missing));
    }
    let inactive: Vec<i64> = found.iter().filter(|t| !t.active).map(|t| t.id).collect();
    if !inactive.is_empty() {
        return Err(TaskError::inactive_subtasks(&inactive));
    }

    let mut index = EdgeIndex::from_edges(&hierarchy_repo::get_all_edges(conn)?);
    for &subtask_id in subtask_ids {
        if subtask_id == parent_id {
            debug!(parent_id, "rejecting attach: self-link");
            return Err(TaskError::cycle_detected(parent_id, subtask_id));
        }
        if hierarchy_repo::get_parent_id(conn, subtask_id)?.is_some() {
            debug!(parent_id, subtask_id, "rejecting attach: subtask already has a parent");
            return Err(TaskError::already_has_parent(subtask_id));
        }
        if index.would_create_cycle(parent_id, subtask_id) {
            debug!(parent_id, subtask_id, "rejecting attach: cycle");
            return Err(TaskError::cycle_detected(parent_id, subtask_id));
        }
        hierarchy_repo::insert_edge(conn, parent_id, subtask_id)?;
        index.insert(parent_id, subtask_id);
    }
    info!(parent_id, count = subtask_ids.len(), "attached subtasks");
    Ok(())
}

/// Remove the edge (parent_id → subtask_id). The exact pair must exist.
pub fn detach(conn: &Connection, parent_id: i64, subtask_id: i64) -> Result<bool, TaskError> {
    in_transaction(conn, |conn| {
        if !hierarchy_repo::delete_edge(conn, parent_id, subtask_id)? {
            return Err(TaskError::link_not_found(parent_id, subtask_id));
        }
        info!(parent_id, subtask_id, "detached subtask");
        Ok(true)
    })
}

/// Drop all edges where `task_id` is parent or subtask. Runs inside the
/// caller's transaction.
pub(crate) fn cascade_remove_edges(conn: &Connection, task_id: i64) -> Result<usize, TaskError> {
    hierarchy_repo::delete_edges_touching(conn, task_id)
}

pub fn subtasks_of(conn: &Connection, task_id: i64) -> Result<Vec<Task>, TaskError> {
    task_repo::get_task_by_id(conn, task_id)?;
    let ids = hierarchy_repo::get_subtask_ids(conn, task_id)?;
    task_repo::get_tasks_by_ids(conn, &ids)
}

pub fn parent_of(conn: &Connection, task_id: i64) -> Result<Option<Task>, TaskError> {
    task_repo::get_task_by_id(conn, task_id)?;
    match hierarchy_repo::get_parent_id(conn, task_id)? {
        Some(parent_id) => Ok(Some(task_repo::get_task_by_id(conn, parent_id)?)),
        None => Ok(None),
    }
}
