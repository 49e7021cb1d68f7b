//! cyclesim - Deterministic cycle-stepped simulator for CPU scheduling and
//! resource synchronization.
//!
//! # Architecture
//!
//! - **Policies**: FIFO, SJF, SRT, Round-Robin and Priority-with-aging, each a
//!   pure function from a [`ProcessSet`] to a [`Timeline`]
//! - **Metrics**: per-process completion, turnaround, response and waiting
//!   times, plus their means
//! - **Arbiter**: mutex or semaphore counters with FIFO waiting queues
//! - **Driver**: steps the arbiter one cycle at a time and records a
//!   [`CycleState`] per cycle
//!
//! # Usage
//!
//! ```rust
//! use cyclesim::*;
//!
//! let processes = ProcessSet::builder()
//!     .add("A", 5, 0, 1)
//!     .add("B", 3, 1, 1)
//!     .build()
//!     .unwrap();
//! let report = simulate(Policy::Fifo, &processes).unwrap();
//! assert_eq!(report.metrics.summary.avg_response, 2.0);
//!
//! let scenario = SyncScenario::builder()
//!     .mode(SyncMode::Mutex)
//!     .action("P1", Verb::Read, "R1", 0)
//!     .action("P2", Verb::Write, "R1", 0)
//!     .build()
//!     .unwrap();
//! let report = SyncSimulator::new(scenario).unwrap().run_to_end().unwrap();
//! assert!(report.exit.is_completed());
//! ```

pub mod action;
pub mod arbiter;
pub mod config;
pub mod driver;
pub mod error;
pub mod export;
pub mod fmt;
pub mod history;
pub mod metrics;
pub mod policy;
pub mod process;
pub mod records;
pub mod resource;
pub mod scenario;
pub mod timeline;
pub mod types;
pub mod workloads;

// Re-export the main public types for convenience.
pub use action::{Action, ActionPhase, ActionStatus, Verb};
pub use arbiter::{Arbiter, ResourceLevel};
pub use config::Config;
pub use driver::{
    ActionResult, DriverState, ExitKind, StallReason, SyncReport, SyncSimulator, SyncSummary,
};
pub use error::{Result, SimError};
pub use fmt::{FmtCycle, SimFormat};
pub use history::{ActionRecord, CycleState, SyncHistory};
pub use metrics::{
    compare, compute, simulate, MetricsSummary, ProcessMetrics, ScheduleMetrics, ScheduleReport,
};
pub use policy::{run, run_priority_traced, AgingEvent, Policy, PolicyKind, PriorityTrace};
pub use process::{Process, ProcessSet};
pub use records::{Parsed, SkippedRow};
pub use resource::{Resource, SyncMode};
pub use scenario::SyncScenario;
pub use timeline::{CycleSlot, ExecutionSegment, Timeline};
pub use types::{ActionId, Cycle, Priority, ProcessId};
