use rusqlite::Connection;

use crate::error::TaskError;

pub fn run_migrations(conn: &Connection) -> Result<(), TaskError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            start_date TEXT,
            deadline TEXT,
            status TEXT NOT NULL DEFAULT 'To-do'
                CHECK (status IN ('To-do', 'In-progress', 'Completed', 'Blocked')),
            priority INTEGER NOT NULL DEFAULT 5
                CHECK (priority BETWEEN 1 AND 10),
            recurring INTEGER NOT NULL DEFAULT 0
                CHECK (recurring >= 0),
            tag TEXT,
            project_id INTEGER NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS parent_assignment (
            parent_id INTEGER NOT NULL REFERENCES tasks(id),
            subtask_id INTEGER NOT NULL REFERENCES tasks(id),
            PRIMARY KEY (parent_id, subtask_id),
            CONSTRAINT uq_parent_assignment_subtask UNIQUE (subtask_id),
            CHECK (parent_id != subtask_id)
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_active ON tasks(active);
        CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project_id);
        CREATE INDEX IF NOT EXISTS idx_parent_assignment_parent ON parent_assignment(parent_id);
        ",
    )?;
    Ok(())
}
