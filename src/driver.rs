//! Cycle-stepped synchronization driver.
//!
//! [`SyncSimulator`] owns the mutable state of one run (the arbiter, the
//! action statuses, the cycle counter and the history) and advances it one
//! cycle per [`SyncSimulator::step`] call. Within a cycle the order is
//! fixed: releases, then queue advancement, then new admissions.
//!
//! An admitted action completes in its admission cycle and holds its
//! resource until the start of the next one.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::action::{Action, ActionStatus, Verb};
use crate::arbiter::Arbiter;
use crate::error::{Result, SimError};
use crate::history::{ActionRecord, CycleState, SyncHistory};
use crate::resource::SyncMode;
use crate::scenario::SyncScenario;
use crate::types::{ActionId, Cycle, ProcessId};

/// Why a run could not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StallReason {
    /// Every action was dispatched, waiters remain and a whole cycle went by
    /// without a release or an admission.
    NoProgress,
    /// A queued action waited `max_cycles` cycles without being admitted.
    /// Idle cycles before a request is due never count.
    Watchdog,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "exit", rename_all = "snake_case")]
pub enum ExitKind {
    /// Every action was admitted; `cycles` is the number of cycles stepped.
    Completed { cycles: Cycle },
    /// Starvation or deadlock. Not an error; reported in the summary.
    Unsatisfiable {
        cycle: Cycle,
        waiting: Vec<ActionId>,
        reason: StallReason,
    },
    /// An invariant violation stopped the run.
    Aborted { cycle: Cycle, reason: String },
}

impl ExitKind {
    pub fn is_completed(&self) -> bool {
        matches!(self, ExitKind::Completed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Finished(ExitKind),
}

/// Outcome of one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResult {
    pub action: ActionId,
    pub process_id: ProcessId,
    pub verb: Verb,
    pub resource: String,
    pub request_cycle: Cycle,
    pub completion_cycle: Option<Cycle>,
    /// `completion_cycle - request_cycle`, when completed.
    pub wait: Option<Cycle>,
}

/// Aggregates over a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncSummary {
    pub total_actions: usize,
    pub completed: usize,
    /// Completed actions that had to wait at least one cycle.
    pub contended: usize,
    pub avg_wait: f64,
    pub max_wait: Cycle,
    pub cycles: Cycle,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub mode: SyncMode,
    pub exit: ExitKind,
    pub history: SyncHistory,
    pub actions: Vec<ActionResult>,
    pub summary: SyncSummary,
}

/// Steps a [`SyncScenario`] cycle by cycle.
#[derive(Debug)]
pub struct SyncSimulator {
    /// Definitions in input order; `ActionId(i)` is `actions[i]`.
    actions: Vec<Action>,
    /// Action indices stably sorted by request cycle.
    order: Vec<usize>,
    max_cycles: Option<Cycle>,
    arbiter: Arbiter,
    status: Vec<ActionStatus>,
    /// Actions admitted in the previous cycle, released at the next step.
    held: Vec<ActionId>,
    /// Next position in `order` to dispatch.
    next: usize,
    cycle: Cycle,
    history: SyncHistory,
    state: DriverState,
}

impl SyncSimulator {
    /// Prepare a run. Every action's resource is resolved here, so an
    /// undeclared resource in semaphore mode fails before the first step.
    pub fn new(scenario: SyncScenario) -> Result<Self> {
        if scenario.actions.is_empty() {
            return Err(SimError::EmptyInput("actions"));
        }
        let mut arbiter = Arbiter::new(scenario.mode, &scenario.resources)?;
        for (i, action) in scenario.actions.iter().enumerate() {
            arbiter.resolve(ActionId(i), &action.resource)?;
        }

        let mut order: Vec<usize> = (0..scenario.actions.len()).collect();
        order.sort_by_key(|&i| scenario.actions[i].request_cycle);

        let n = scenario.actions.len();
        Ok(SyncSimulator {
            actions: scenario.actions,
            order,
            max_cycles: scenario.max_cycles,
            arbiter,
            status: vec![ActionStatus::default(); n],
            held: Vec::new(),
            next: 0,
            cycle: 0,
            history: SyncHistory::default(),
            state: DriverState::Idle,
        })
    }

    /// Advance one cycle and return its snapshot.
    ///
    /// Returns `Ok(None)` once the run has finished. An invariant violation
    /// is returned as an error and finishes the run as
    /// [`ExitKind::Aborted`].
    pub fn step(&mut self) -> Result<Option<&CycleState>> {
        match self.state {
            DriverState::Finished(_) => return Ok(None),
            DriverState::Idle => {
                info!(
                    mode = %self.arbiter.mode(),
                    actions = self.actions.len(),
                    "starting sync run"
                );
                self.state = DriverState::Running;
            }
            DriverState::Running => {}
        }

        if let Err(e) = self.advance() {
            error!(cycle = self.cycle, error = %e, "aborting sync run");
            self.state = DriverState::Finished(ExitKind::Aborted {
                cycle: self.cycle,
                reason: e.to_string(),
            });
            return Err(e);
        }
        Ok(self.history.last())
    }

    /// Step until the run finishes and report it.
    pub fn run_to_end(&mut self) -> Result<SyncReport> {
        while !self.is_finished() {
            self.step()?;
        }
        self.report().ok_or_else(|| {
            SimError::InvariantViolation("driver stopped without an exit state".into())
        })
    }

    /// Discard all mutable state and return to `Idle`. Definitions, including
    /// implicitly declared mutexes, are kept.
    pub fn reset(&mut self) {
        self.arbiter.reset();
        self.status.fill(ActionStatus::default());
        self.held.clear();
        self.next = 0;
        self.cycle = 0;
        self.history.clear();
        self.state = DriverState::Idle;
    }

    pub fn state(&self) -> &DriverState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, DriverState::Finished(_))
    }

    /// The cycle the next `step()` will simulate.
    pub fn cycle(&self) -> Cycle {
        self.cycle
    }

    pub fn history(&self) -> &SyncHistory {
        &self.history
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn arbiter(&self) -> &Arbiter {
        &self.arbiter
    }

    pub fn status(&self, id: ActionId) -> Option<&ActionStatus> {
        self.status.get(id.0)
    }

    /// Report of the run, once it has finished.
    pub fn report(&self) -> Option<SyncReport> {
        let DriverState::Finished(exit) = &self.state else {
            return None;
        };

        let actions: Vec<ActionResult> = self
            .actions
            .iter()
            .zip(&self.status)
            .enumerate()
            .map(|(i, (a, s))| ActionResult {
                action: ActionId(i),
                process_id: a.process_id.clone(),
                verb: a.verb,
                resource: a.resource.clone(),
                request_cycle: a.request_cycle,
                completion_cycle: s.completion_cycle,
                wait: s.completion_cycle.map(|c| c - a.request_cycle),
            })
            .collect();

        let waits: Vec<Cycle> = actions.iter().filter_map(|r| r.wait).collect();
        let avg_wait = if waits.is_empty() {
            0.0
        } else {
            waits.iter().sum::<Cycle>() as f64 / waits.len() as f64
        };
        let summary = SyncSummary {
            total_actions: actions.len(),
            completed: waits.len(),
            contended: waits.iter().filter(|&&w| w > 0).count(),
            avg_wait,
            max_wait: waits.iter().copied().max().unwrap_or(0),
            cycles: self.cycle,
        };

        Some(SyncReport {
            mode: self.arbiter.mode(),
            exit: exit.clone(),
            history: self.history.clone(),
            actions,
            summary,
        })
    }

    fn advance(&mut self) -> Result<()> {
        let c = self.cycle;
        let mut snap = CycleState::new(c);

        for id in std::mem::take(&mut self.held) {
            self.arbiter.release(&self.actions[id.0].resource)?;
            debug!(cycle = c, action = %id, resource = %self.actions[id.0].resource, "release");
            snap.released.push(self.record(id));
        }

        for id in self.arbiter.advance_queues()? {
            self.admit(id, c, &mut snap);
        }

        while let Some(&i) = self.order.get(self.next) {
            if self.actions[i].request_cycle > c {
                break;
            }
            self.next += 1;
            let id = ActionId(i);
            let resource = self.actions[i].resource.clone();
            if !self.arbiter.has_waiters(&resource)? && self.arbiter.try_acquire(&resource)? {
                self.admit(id, c, &mut snap);
            } else {
                self.arbiter.enqueue(&resource, id)?;
                self.status[i].waiting_since = Some(c);
                debug!(cycle = c, action = %id, resource = %resource, "queued");
                snap.queued.push(self.record(id));
            }
        }

        self.check_levels()?;
        snap.waiting = self
            .arbiter
            .all_waiting()
            .into_iter()
            .map(|id| self.record(id))
            .collect();
        snap.levels = self.arbiter.levels();
        let progress = snap.made_progress();
        self.history.push(snap);
        self.cycle += 1;

        if let Some(exit) = self.termination(progress) {
            match &exit {
                ExitKind::Unsatisfiable {
                    cycle,
                    waiting,
                    reason,
                } => warn!(cycle, waiting = waiting.len(), ?reason, "sync run is unsatisfiable"),
                _ => info!(cycle = self.cycle, "sync run completed"),
            }
            self.state = DriverState::Finished(exit);
        }
        Ok(())
    }

    fn admit(&mut self, id: ActionId, cycle: Cycle, snap: &mut CycleState) {
        let status = &mut self.status[id.0];
        status.completed = true;
        status.completion_cycle = Some(cycle);
        self.held.push(id);
        debug!(
            cycle,
            action = %id,
            pid = %self.actions[id.0].process_id,
            resource = %self.actions[id.0].resource,
            "access"
        );
        snap.accessed.push(self.record(id));
    }

    /// Cross-check the arbiter's counters against the actions it admitted.
    fn check_levels(&self) -> Result<()> {
        for level in self.arbiter.levels() {
            let holders = self
                .held
                .iter()
                .filter(|id| self.actions[id.0].resource == level.name)
                .count() as u32;
            let limit = match self.arbiter.mode() {
                SyncMode::Mutex => 1,
                SyncMode::Semaphore => level.capacity,
            };
            if level.available > level.capacity || holders > limit {
                return Err(SimError::InvariantViolation(format!(
                    "resource {:?} has {holders} holders with {}/{} available",
                    level.name, level.available, level.capacity
                )));
            }
        }
        Ok(())
    }

    fn termination(&self, progress: bool) -> Option<ExitKind> {
        if self.status.iter().all(|s| s.completed) {
            return Some(ExitKind::Completed { cycles: self.cycle });
        }
        let waiting = self.arbiter.all_waiting();
        if waiting.is_empty() {
            return None;
        }
        let all_dispatched = self.next == self.order.len();
        let reason = if all_dispatched && !progress {
            StallReason::NoProgress
        } else if self.longest_wait(&waiting) >= self.max_cycles.unwrap_or(Cycle::MAX) {
            StallReason::Watchdog
        } else {
            return None;
        };
        Some(ExitKind::Unsatisfiable {
            cycle: self.cycle,
            waiting,
            reason,
        })
    }

    /// Cycles the oldest of `waiting` has spent queued, counting the one
    /// just stepped.
    fn longest_wait(&self, waiting: &[ActionId]) -> Cycle {
        waiting
            .iter()
            .filter_map(|id| self.status[id.0].waiting_since)
            .map(|since| self.cycle - since)
            .max()
            .unwrap_or(0)
    }

    fn record(&self, id: ActionId) -> ActionRecord {
        let a = &self.actions[id.0];
        ActionRecord {
            action: id,
            process_id: a.process_id.clone(),
            verb: a.verb,
            resource: a.resource.clone(),
        }
    }
}
