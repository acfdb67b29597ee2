use serde_json::json;

use crate::cli::commands::SubtaskCommands;
use crate::cli::{exit_code, Context};
use crate::error::TaskError;
use crate::output;
use crate::service::hierarchy;

pub fn run(cmd: SubtaskCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        SubtaskCommands::Attach { parent, subtasks } => run_attach(parent, &subtasks, ctx),
        SubtaskCommands::Detach { parent, subtask } => run_detach(parent, subtask, ctx),
    };
    exit_code(result, ctx.json)
}

fn run_attach(parent: i64, subtasks: &[i64], ctx: &Context) -> Result<i32, TaskError> {
    let conn = ctx.open_db()?;
    let hydrated = hierarchy::attach(&conn, parent, subtasks)?;
    if ctx.json {
        output::json::print(&output::json::success(json!({
            "parent": output::json::task_with_subtasks(&hydrated)
        })));
    } else {
        println!(
            "Task #{} now has {} subtask(s)",
            hydrated.task.id,
            hydrated.subtasks.len()
        );
        output::text::print_subtasks(&hydrated);
    }
    Ok(0)
}

fn run_detach(parent: i64, subtask: i64, ctx: &Context) -> Result<i32, TaskError> {
    let conn = ctx.open_db()?;
    let detached = hierarchy::detach(&conn, parent, subtask)?;
    if ctx.json {
        output::json::print(&output::json::success(json!({
            "detached": detached,
            "parent_id": parent,
            "subtask_id": subtask
        })));
    } else {
        println!("Detached task #{subtask} from #{parent}");
    }
    Ok(0)
}
