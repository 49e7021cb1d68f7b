//! Error kinds shared by the scheduling and synchronization engines.
//!
//! Structural problems (`EmptyInput`, `UnknownResource`, ...) are reported
//! before any simulation step runs. `InvariantViolation` is the only error
//! that can surface mid-run and always indicates a logic defect. Starvation
//! is not an error at all; see [`crate::driver::ExitKind::Unsatisfiable`].

use std::fmt;

use crate::types::{ActionId, ProcessId};

/// Errors produced by the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// No processes, actions or schedulable work were supplied.
    EmptyInput(&'static str),
    /// A malformed input row. The loader skips these and keeps going;
    /// the error only surfaces when a caller asks for strict parsing.
    InvalidRecord { line: u64, reason: String },
    /// An action references a resource that was never declared.
    UnknownResource { action: ActionId, resource: String },
    /// A segment or action references a process that is not registered.
    UnknownProcess(ProcessId),
    /// Two processes share the same id.
    DuplicateProcess(ProcessId),
    /// A schedulable process never appears in the timeline.
    IncompleteSchedule(ProcessId),
    /// A policy or driver parameter is out of range.
    InvalidParameter(String),
    /// A resource counter would leave `[0, capacity]`.
    InvariantViolation(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::EmptyInput(what) => write!(f, "empty input: no {what} supplied"),
            SimError::InvalidRecord { line, reason } => {
                write!(f, "invalid record on line {line}: {reason}")
            }
            SimError::UnknownResource { action, resource } => {
                write!(f, "action {action} references undeclared resource {resource:?}")
            }
            SimError::UnknownProcess(pid) => write!(f, "unknown process {pid:?}"),
            SimError::DuplicateProcess(pid) => write!(f, "duplicate process id {pid:?}"),
            SimError::IncompleteSchedule(pid) => {
                write!(f, "process {pid:?} has no segments in the timeline")
            }
            SimError::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            SimError::InvariantViolation(msg) => write!(f, "invariant violation: {msg}"),
        }
    }
}

impl std::error::Error for SimError {}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SimError>;
