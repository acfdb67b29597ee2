use serde::{Deserialize, Serialize};

/// Directed parent → subtask edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentAssignment {
    pub parent_id: i64,
    pub subtask_id: i64,
}
