use std::collections::{HashMap, HashSet, VecDeque};

use crate::models::ParentAssignment;

/// Adjacency view over parent → subtask edges.
#[derive(Debug, Default, Clone)]
pub struct EdgeIndex {
    children: HashMap<i64, Vec<i64>>,
}

impl EdgeIndex {
    pub fn from_edges(edges: &[ParentAssignment]) -> Self {
        let mut index = Self::default();
        for edge in edges {
            index.insert(edge.parent_id, edge.subtask_id);
        }
        index
    }

    pub fn insert(&mut self, parent_id: i64, subtask_id: i64) {
        self.children.entry(parent_id).or_default().push(subtask_id);
    }

    /// Breadth-first search from `from` along subtask edges.
    /// `from` itself counts as reachable.
    pub fn reaches(&self, from: i64, target: i64) -> bool {
        let mut seen: HashSet<i64> = HashSet::new();
        let mut queue: VecDeque<i64> = VecDeque::new();
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            if current == target {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(children) = self.children.get(&current) {
                for &child in children {
                    if !seen.contains(&child) {
                        queue.push_back(child);
                    }
                }
            }
        }
        false
    }

    /// Adding (parent → subtask) closes a cycle iff parent is already
    /// reachable from subtask. A self-link is the degenerate case.
    pub fn would_create_cycle(&self, parent_id: i64, subtask_id: i64) -> bool {
        self.reaches(subtask_id, parent_id)
    }

    /// True when no task is its own ancestor.
    pub fn is_acyclic(&self) -> bool {
        self.children
            .iter()
            .all(|(&parent, kids)| kids.iter().all(|&kid| !self.reaches(kid, parent)))
    }
}
