//! Serializable view of a stack.

use super::entry::EntryKind;
use crate::lifecycle::Phase;
use serde::{Deserialize, Serialize};

/// Point-in-time picture of a navigator, bottom entry first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSnapshot {
    pub name: String,
    pub entries: Vec<EntrySnapshot>,
    pub transition_in_progress: bool,
}

impl StackSnapshot {
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn top(&self) -> Option<&EntrySnapshot> {
        self.entries.last()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.id.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySnapshot {
    pub id: String,
    pub kind: EntryKind,
    pub phase: Phase,
    /// Stays in the stack once covered
    pub retained: bool,
}
