use serde_json::{json, Value};

use crate::cli::commands::TaskCommands;
use crate::cli::{exit_code, Context};
use crate::db::in_read_transaction;
use crate::error::TaskError;
use crate::models::{NewTask, TaskPatch};
use crate::output;
use crate::service::query::ListQuery;
use crate::service::{hierarchy, lifecycle, query, store};

pub fn run(cmd: TaskCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        TaskCommands::Add {
            title,
            project,
            description,
            start,
            deadline,
            priority,
            recurring,
            tag,
            status,
            parent,
        } => lifecycle::parse_status(&status).and_then(|status| {
            let input = NewTask {
                title,
                description,
                start_date: start,
                deadline,
                priority,
                recurring,
                tag,
                project_id: project,
                status,
                parent_id: parent,
            };
            run_add(&input, ctx)
        }),
        TaskCommands::Show { id } => run_show(id, ctx),
        TaskCommands::Update {
            id,
            title,
            description,
            start,
            deadline,
            priority,
            recurring,
            tag,
            project,
            status,
            active,
        } => {
            let patch = TaskPatch {
                title,
                description,
                start_date: start,
                deadline,
                priority,
                recurring,
                tag,
                project_id: project,
                status,
                active,
            };
            run_update(id, &patch, ctx)
        }
        TaskCommands::Delete { id } => run_delete(id, ctx),
        TaskCommands::Restore { id } => run_restore(id, ctx),
        TaskCommands::Status { id, status } => run_status(id, &status, ctx),
        TaskCommands::List {
            sort,
            filter,
            parents_only,
            all,
            project,
        } => parse_filter(filter.as_deref()).and_then(|filter_by| {
            let q = ListQuery {
                sort_by: sort.or_else(|| ctx.config.default_sort.clone()),
                filter_by,
                parents_only,
                active_only: !all,
                project_id: project,
            };
            run_list(&q, ctx)
        }),
    };
    exit_code(result, ctx.json)
}

fn parse_filter(raw: Option<&str>) -> Result<Option<serde_json::Map<String, Value>>, TaskError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(_) => Err(TaskError::validation("--filter must be a JSON object")),
        Err(e) => Err(TaskError::validation(format!("--filter is not valid JSON: {e}"))),
    }
}

fn run_add(input: &NewTask, ctx: &Context) -> Result<i32, TaskError> {
    let conn = ctx.open_db()?;
    let task = store::create(&conn, input)?;
    if ctx.json {
        output::json::print(&output::json::success(json!({
            "task": output::json::task_json(&task)
        })));
    } else {
        println!("Added task: {} (#{})", task.title, task.id);
    }
    Ok(0)
}

fn run_show(id: i64, ctx: &Context) -> Result<i32, TaskError> {
    let conn = ctx.open_db()?;
    let (task, parent) = in_read_transaction(&conn, |conn| {
        Ok((
            store::get_with_subtasks_in(conn, id)?,
            hierarchy::parent_of(conn, id)?,
        ))
    })?;

    if ctx.json {
        output::json::print(&output::json::success(json!({
            "task": output::json::task_with_subtasks(&task),
            "parent": parent.as_ref().map(output::json::task_summary),
        })));
    } else {
        output::text::print_task(&task.task);
        if let Some(ref p) = parent {
            println!("  Parent: {} (#{})", p.title, p.id);
        }
        output::text::print_subtasks(&task);
    }
    Ok(0)
}

fn run_update(id: i64, patch: &TaskPatch, ctx: &Context) -> Result<i32, TaskError> {
    let conn = ctx.open_db()?;
    let task = store::update(&conn, id, patch)?;
    if ctx.json {
        output::json::print(&output::json::success(json!({
            "task": output::json::task_json(&task)
        })));
    } else {
        println!("Updated task: {} (#{})", task.title, task.id);
    }
    Ok(0)
}

fn run_delete(id: i64, ctx: &Context) -> Result<i32, TaskError> {
    let conn = ctx.open_db()?;
    let task = store::soft_delete(&conn, id)?;
    if ctx.json {
        output::json::print(&output::json::success(json!({
            "deleted": output::json::task_json(&task)
        })));
    } else {
        println!("Deleted task: {} (#{})", task.title, task.id);
    }
    Ok(0)
}

fn run_restore(id: i64, ctx: &Context) -> Result<i32, TaskError> {
    let conn = ctx.open_db()?;
    let task = store::restore(&conn, id)?;
    if ctx.json {
        output::json::print(&output::json::success(json!({
            "restored": output::json::task_json(&task)
        })));
    } else {
        println!("Restored task: {} (#{})", task.title, task.id);
    }
    Ok(0)
}

fn run_status(id: i64, status: &str, ctx: &Context) -> Result<i32, TaskError> {
    let conn = ctx.open_db()?;
    let task = lifecycle::set_status(&conn, id, status)?;
    if ctx.json {
        output::json::print(&output::json::success(json!({
            "task": output::json::task_json(&task)
        })));
    } else {
        println!("Task #{} → {}", task.id, task.status.as_str());
    }
    Ok(0)
}

fn run_list(q: &ListQuery, ctx: &Context) -> Result<i32, TaskError> {
    let conn = ctx.open_db()?;
    let tasks = query::list_tasks(&conn, q)?;
    if ctx.json {
        let tasks_json: Vec<_> = tasks.iter().map(output::json::task_json).collect();
        output::json::print(&output::json::success(json!({
            "tasks": tasks_json,
            "count": tasks.len()
        })));
    } else {
        output::text::print_task_list(&tasks);
    }
    Ok(0)
}
