//! Timestamped resource requests issued by processes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Cycle, ProcessId};

/// What the process does with the resource. Both verbs need the same
/// access; the verb is carried through to the history for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    #[serde(alias = "read", alias = "Read")]
    Read,
    #[serde(alias = "write", alias = "Write")]
    Write,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verb::Read => f.write_str("READ"),
            Verb::Write => f.write_str("WRITE"),
        }
    }
}

/// A request by `process_id` to use `resource` starting at `request_cycle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub process_id: ProcessId,
    pub verb: Verb,
    pub resource: String,
    pub request_cycle: Cycle,
}

impl Action {
    pub fn new(
        process_id: impl Into<ProcessId>,
        verb: Verb,
        resource: impl Into<String>,
        request_cycle: Cycle,
    ) -> Self {
        Action {
            process_id: process_id.into(),
            verb,
            resource: resource.into(),
            request_cycle,
        }
    }
}

/// Where an action is in its `requested → waiting* → accessed` lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPhase {
    /// Not yet dispatched (request cycle not reached).
    Requested,
    /// In a resource's waiting queue.
    Waiting,
    /// Admitted; holds the resource for its admission cycle.
    Accessed,
}

/// Mutable per-run state of an action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionStatus {
    pub completed: bool,
    pub completion_cycle: Option<Cycle>,
    pub waiting_since: Option<Cycle>,
}

impl ActionStatus {
    pub fn phase(&self) -> ActionPhase {
        if self.completed {
            ActionPhase::Accessed
        } else if self.waiting_since.is_some() {
            ActionPhase::Waiting
        } else {
            ActionPhase::Requested
        }
    }
}
