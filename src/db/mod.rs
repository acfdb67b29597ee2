pub mod connection;
pub mod hierarchy_repo;
pub mod migrations;
pub mod task_repo;

pub use connection::*;
