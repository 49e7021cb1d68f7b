//! CPU scheduling policies.
//!
//! Every policy is a pure function from the process registry (plus an
//! optional parameter) to a [`Timeline`]. [`run`] is the single entry point
//! and dispatches on the closed [`Policy`] enum.
//!
//! Tie-breaks are part of the contract:
//!
//! | Policy | Selection key | Tie-break |
//! |---|---|---|
//! | FIFO | arrival time | input order |
//! | SJF | burst time | first found scanning input order |
//! | SRT | remaining time | stable order over all pending (input order) |
//! | RR | ready-queue order | arrivals before the preempted process |
//! | Priority | aged priority value | earliest arrival, then input order |

pub mod fifo;
pub mod priority;
pub mod round_robin;
pub mod sjf;
pub mod srt;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SimError};
use crate::process::ProcessSet;
use crate::timeline::Timeline;
use crate::types::Cycle;

pub use priority::{AgingEvent, PriorityTrace};

/// Default Round-Robin quantum, in cycles.
pub const DEFAULT_QUANTUM: Cycle = 2;

/// Default number of waiting cycles between priority boosts.
pub const DEFAULT_AGING_INTERVAL: Cycle = 5;

/// A scheduling policy with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum Policy {
    Fifo,
    Sjf,
    Srt,
    RoundRobin { quantum: Cycle },
    PriorityAging { interval: Cycle },
}

impl Policy {
    /// Reject parameters that would stall the simulation.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Policy::RoundRobin { quantum: 0 } => Err(SimError::InvalidParameter(
                "round-robin quantum must be at least 1".into(),
            )),
            Policy::PriorityAging { interval: 0 } => Err(SimError::InvalidParameter(
                "aging interval must be at least 1".into(),
            )),
            _ => Ok(()),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Policy::Fifo => PolicyKind::Fifo,
            Policy::Sjf => PolicyKind::Sjf,
            Policy::Srt => PolicyKind::Srt,
            Policy::RoundRobin { .. } => PolicyKind::Rr,
            Policy::PriorityAging { .. } => PolicyKind::Priority,
        }
    }

    /// Whether the policy can take the CPU away from a running process.
    pub fn is_preemptive(&self) -> bool {
        !matches!(self, Policy::Fifo | Policy::Sjf)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Fifo => write!(f, "FIFO"),
            Policy::Sjf => write!(f, "SJF"),
            Policy::Srt => write!(f, "SRT"),
            Policy::RoundRobin { quantum } => write!(f, "RR(q={quantum})"),
            Policy::PriorityAging { interval } => write!(f, "Priority(aging={interval})"),
        }
    }
}

/// Policy names as selected from configuration or the command line.
///
/// Parameters come separately (quantum, aging interval), see
/// [`PolicyKind::with_params`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    Fifo,
    Sjf,
    Srt,
    Rr,
    Priority,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 5] = [
        PolicyKind::Fifo,
        PolicyKind::Sjf,
        PolicyKind::Srt,
        PolicyKind::Rr,
        PolicyKind::Priority,
    ];

    pub fn with_params(self, quantum: Cycle, aging_interval: Cycle) -> Policy {
        match self {
            PolicyKind::Fifo => Policy::Fifo,
            PolicyKind::Sjf => Policy::Sjf,
            PolicyKind::Srt => Policy::Srt,
            PolicyKind::Rr => Policy::RoundRobin { quantum },
            PolicyKind::Priority => Policy::PriorityAging {
                interval: aging_interval,
            },
        }
    }
}

/// Run `policy` over `processes` and return the execution timeline.
///
/// Zero-burst processes never appear in the timeline.
pub fn run(policy: Policy, processes: &ProcessSet) -> Result<Timeline> {
    policy.validate()?;
    let timeline = match policy {
        Policy::Fifo => fifo::schedule(processes),
        Policy::Sjf => sjf::schedule(processes),
        Policy::Srt => srt::schedule(processes),
        Policy::RoundRobin { quantum } => round_robin::schedule(processes, quantum),
        Policy::PriorityAging { interval } => priority::schedule(processes, interval).0,
    };
    info!(
        policy = %policy,
        segments = timeline.len(),
        makespan = timeline.end_cycle(),
        idle = timeline.idle_cycles(),
        "schedule complete"
    );
    Ok(timeline)
}

/// Run Priority-with-aging and also return the aging history.
pub fn run_priority_traced(
    processes: &ProcessSet,
    interval: Cycle,
) -> Result<(Timeline, PriorityTrace)> {
    Policy::PriorityAging { interval }.validate()?;
    Ok(priority::schedule(processes, interval))
}

/// Next arrival strictly in the future among the given processes.
fn next_arrival<'a>(
    pending: impl Iterator<Item = &'a crate::process::Process>,
    clock: Cycle,
) -> Option<Cycle> {
    pending
        .map(|p| p.arrival_time)
        .filter(|&at| at > clock)
        .min()
}
