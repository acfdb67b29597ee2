pub mod commands;
pub mod init;
pub mod subtask;
pub mod task;

pub use commands::*;

use std::path::PathBuf;

use rusqlite::Connection;

use crate::config::Config;
use crate::db::connection;
use crate::error::TaskError;
use crate::output;

/// Resolved per-invocation settings shared by all commands.
pub struct Context {
    pub db_path: PathBuf,
    pub config: Config,
    pub json: bool,
}

impl Context {
    pub fn open_db(&self) -> Result<Connection, TaskError> {
        connection::open_db(&self.db_path)
    }
}

/// Print an error in the selected format and return the exit code.
pub fn report_error(err: &TaskError, json_output: bool) -> i32 {
    if json_output {
        output::json::print(&output::json::error(err));
    } else {
        eprintln!("Error: {}", err.message);
    }
    1
}

pub fn exit_code(result: Result<i32, TaskError>, json_output: bool) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => report_error(&e, json_output),
    }
}
