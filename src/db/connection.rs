use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{debug, warn};

use crate::error::TaskError;

use super::migrations;

const DATA_DIR: &str = ".tasktree";
const DB_FILE: &str = "tasktree.db";
const CONFIG_FILE: &str = "config.json";

/// Database path used when neither `--db` nor `TASKTREE_DB` is given.
pub fn default_db_path() -> Result<PathBuf, TaskError> {
    let dir = env::current_dir().map_err(|e| TaskError::database(e.to_string()))?;
    Ok(dir.join(DATA_DIR).join(DB_FILE))
}

pub fn resolve_db_path(explicit: Option<&Path>) -> Result<PathBuf, TaskError> {
    match explicit {
        Some(p) => Ok(p.to_path_buf()),
        None => default_db_path(),
    }
}

/// The config file lives next to the database.
pub fn config_path(db_path: &Path) -> PathBuf {
    match db_path.parent() {
        Some(dir) => dir.join(CONFIG_FILE),
        None => PathBuf::from(CONFIG_FILE),
    }
}

/// Open a connection to the database. Returns error if not initialized.
pub fn open_db(path: &Path) -> Result<Connection, TaskError> {
    if !path.exists() {
        return Err(TaskError::not_initialized());
    }
    let conn = Connection::open(path)?;
    configure_connection(&conn)?;
    debug!(path = %path.display(), "opened database");
    Ok(conn)
}

/// Initialize the database: create directories, database, and run migrations.
pub fn init_db(path: &Path) -> Result<PathBuf, TaskError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| TaskError::database(e.to_string()))?;
        }
    }
    let conn = Connection::open(path)?;
    configure_connection(&conn)?;
    migrations::run_migrations(&conn)?;
    Ok(path.to_path_buf())
}

/// Migrated in-memory database.
pub fn open_in_memory() -> Result<Connection, TaskError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}

fn configure_connection(conn: &Connection) -> Result<(), TaskError> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA busy_timeout=5000;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Run `f` inside `BEGIN IMMEDIATE` / `COMMIT`, rolling back on any error.
pub fn in_transaction<T, F>(conn: &Connection, f: F) -> Result<T, TaskError>
where
    F: FnOnce(&Connection) -> Result<T, TaskError>,
{
    run_in(conn, "BEGIN IMMEDIATE", f)
}

/// Run a group of reads against one snapshot (deferred `BEGIN`).
pub fn in_read_transaction<T, F>(conn: &Connection, f: F) -> Result<T, TaskError>
where
    F: FnOnce(&Connection) -> Result<T, TaskError>,
{
    run_in(conn, "BEGIN DEFERRED", f)
}

fn run_in<T, F>(conn: &Connection, begin: &str, f: F) -> Result<T, TaskError>
where
    F: FnOnce(&Connection) -> Result<T, TaskError>,
{
    conn.execute_batch(begin)?;
    match f(conn) {
        Ok(value) => {
            if let Err(e) = conn.execute_batch("COMMIT") {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(e.into());
            }
            Ok(value)
        }
        Err(e) => {
            warn!(code = e.code.as_str(), "rolling back: {}", e.message);
            let _ = conn.execute_batch("ROLLBACK");
            Err(e)
        }
    }
}
