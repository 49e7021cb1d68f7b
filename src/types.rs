//! Newtype wrappers and type aliases for domain concepts.
//!
//! Identifiers get newtypes so a process id can never be confused with a
//! resource name or an action index. Plain quantities (cycles, priorities)
//! stay type aliases.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discrete unit of simulated time.
pub type Cycle = u64;

/// Static or dynamic priority value. Lower numbers mean higher priority.
pub type Priority = i64;

/// Process identifier, as given in the input records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(pub String);

impl ProcessId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProcessId {
    fn from(s: &str) -> Self {
        ProcessId(s.to_string())
    }
}

impl From<String> for ProcessId {
    fn from(s: String) -> Self {
        ProcessId(s)
    }
}

/// Action identifier: the position of the action in input order. Among
/// requests for the same cycle, lower ids are admitted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub usize);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
