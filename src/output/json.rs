use serde_json::{json, Value};

use crate::error::TaskError;
use crate::models::{Task, TaskWithSubtasks};

pub fn success(data: Value) -> Value {
    json!({
        "success": true,
        "data": data
    })
}

pub fn error(err: &TaskError) -> Value {
    json!({
        "success": false,
        "error": {
            "code": err.code.as_str(),
            "message": err.message
        }
    })
}

pub fn task_json(t: &Task) -> Value {
    json!({
        "id": t.id,
        "title": t.title,
        "description": t.description,
        "start_date": t.start_date,
        "deadline": t.deadline,
        "status": t.status.as_str(),
        "priority": t.priority,
        "recurring": t.recurring,
        "tag": t.tag,
        "project_id": t.project_id,
        "active": t.active,
        "created_at": t.created_at,
        "updated_at": t.updated_at
    })
}

pub fn task_summary(t: &Task) -> Value {
    json!({
        "id": t.id,
        "title": t.title,
        "status": t.status.as_str(),
        "priority": t.priority
    })
}

pub fn task_with_subtasks(t: &TaskWithSubtasks) -> Value {
    let mut v = task_json(&t.task);
    v["subtasks"] = json!(t.subtasks.iter().map(task_json).collect::<Vec<_>>());
    v
}

pub fn print(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Error: cannot serialize output: {e}"),
    }
}
