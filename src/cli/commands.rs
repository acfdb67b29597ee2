use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tasktree",
    version,
    about = "Hierarchical task store with recurring tasks",
    after_help = "\
NOTE:
  DB defaults to ./.tasktree/tasktree.db (override with --db or TASKTREE_DB).
  Optional settings are read from config.json in the same directory.
  Run `tasktree init` before any other command.

EXIT CODES:
  0  Success
  1  Error (not found, conflict, invalid input, DB, etc.)

HIERARCHY RULES:
  A task has at most one parent. Attaching that would form a cycle is rejected.
  Deleting a task detaches it from its parent and promotes its subtasks to top level.
  Completing a recurring task (--recurring N) creates its next occurrence,
  starting on the old deadline and due N days later."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to the database file
    #[arg(long, global = true, env = "TASKTREE_DB")]
    pub db: Option<PathBuf>,

    /// Log filter written to stderr (e.g. `info`, `debug`)
    #[arg(long, global = true, env = "TASKTREE_LOG")]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and run migrations
    Init,

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Parent/subtask links
    #[command(subcommand)]
    Subtask(SubtaskCommands),
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Create a task
    Add {
        /// Task title
        title: String,
        #[arg(long)]
        project: i64,
        #[arg(long)]
        description: Option<String>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<NaiveDate>,
        /// 1 (least important) to 10 (most important)
        #[arg(long, default_value = "5")]
        priority: i32,
        /// Recurrence interval in days (0 = not recurring)
        #[arg(long, default_value = "0")]
        recurring: i64,
        #[arg(long)]
        tag: Option<String>,
        /// Initial status
        #[arg(long, default_value = "To-do")]
        status: String,
        /// Attach under this parent task
        #[arg(long)]
        parent: Option<i64>,
    },
    /// Show a task with its parent and subtasks
    Show { id: i64 },
    /// Change scalar fields of a task
    #[command(after_help = "\
NOTE:
  --status and --active are rejected here. Use `task status`, `task delete`
  or `task restore` instead.")]
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        deadline: Option<NaiveDate>,
        #[arg(long)]
        priority: Option<i32>,
        #[arg(long)]
        recurring: Option<i64>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        project: Option<i64>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Soft-delete a task (detaches all of its links)
    Delete { id: i64 },
    /// Reactivate a soft-deleted task
    Restore { id: i64 },
    /// Set status: To-do, In-progress, Completed, Blocked
    Status { id: i64, status: String },
    /// List tasks
    #[command(after_help = "\
SORT KEYS:
  priority_desc (default), priority_asc, start_date_asc, start_date_desc,
  deadline_asc, deadline_desc, status

FILTERS (JSON object, one key unless both are date ranges):
  {\"priority_range\": [3, 7]}
  {\"status\": \"In-progress\"}
  {\"deadline_range\": [\"2025-01-01\", \"2025-01-31\"]}
  {\"start_date_range\": [\"2025-01-01\", \"2025-01-31\"]}")]
    List {
        #[arg(long)]
        sort: Option<String>,
        /// Filter object as JSON
        #[arg(long)]
        filter: Option<String>,
        /// Only tasks without a parent
        #[arg(long)]
        parents_only: bool,
        /// Include soft-deleted tasks
        #[arg(long)]
        all: bool,
        #[arg(long)]
        project: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum SubtaskCommands {
    /// Attach one or more subtasks to a parent (all or nothing)
    Attach {
        parent: i64,
        subtasks: Vec<i64>,
    },
    /// Detach a subtask from its parent
    Detach { parent: i64, subtask: i64 },
}
