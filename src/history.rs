//! Per-cycle snapshots of the synchronization run.
//!
//! One [`CycleState`] is appended per simulated cycle, so a rendering layer
//! can replay the whole run without re-simulating it.

use serde::Serialize;

use crate::action::Verb;
use crate::arbiter::ResourceLevel;
use crate::types::{ActionId, Cycle, ProcessId};

/// An action as it appears in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    pub action: ActionId,
    pub process_id: ProcessId,
    pub verb: Verb,
    pub resource: String,
}

/// What happened during one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleState {
    pub cycle: Cycle,
    /// Actions admitted in the previous cycle whose resources were freed.
    pub released: Vec<ActionRecord>,
    /// Actions admitted this cycle, queue heads first, then new requests.
    pub accessed: Vec<ActionRecord>,
    /// New requests that had to join a waiting queue this cycle.
    pub queued: Vec<ActionRecord>,
    /// Every action still waiting at the end of the cycle.
    pub waiting: Vec<ActionRecord>,
    /// Resource counters at the end of the cycle.
    pub levels: Vec<ResourceLevel>,
}

impl CycleState {
    pub(crate) fn new(cycle: Cycle) -> Self {
        CycleState {
            cycle,
            released: Vec::new(),
            accessed: Vec::new(),
            queued: Vec::new(),
            waiting: Vec::new(),
            levels: Vec::new(),
        }
    }

    /// Whether anything was released or admitted.
    pub fn made_progress(&self) -> bool {
        !self.released.is_empty() || !self.accessed.is_empty()
    }

    /// Number of actions admitted to `resource` this cycle. Admitted
    /// actions hold for exactly their admission cycle, so this is also the
    /// number of concurrent holders.
    pub fn holders_of(&self, resource: &str) -> usize {
        self.accessed.iter().filter(|r| r.resource == resource).count()
    }
}

/// Append-only list of cycle snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SyncHistory {
    states: Vec<CycleState>,
}

impl SyncHistory {
    pub(crate) fn push(&mut self, state: CycleState) {
        debug_assert_eq!(state.cycle as usize, self.states.len());
        self.states.push(state);
    }

    pub(crate) fn clear(&mut self) {
        self.states.clear();
    }

    pub fn states(&self) -> &[CycleState] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, cycle: Cycle) -> Option<&CycleState> {
        self.states.get(cycle as usize)
    }

    pub fn last(&self) -> Option<&CycleState> {
        self.states.last()
    }

    /// Cycle at which `id` was admitted.
    pub fn admitted_at(&self, id: ActionId) -> Option<Cycle> {
        self.states
            .iter()
            .find(|s| s.accessed.iter().any(|r| r.action == id))
            .map(|s| s.cycle)
    }

    /// Cycle at which `id` joined a waiting queue, if it ever did.
    pub fn queued_at(&self, id: ActionId) -> Option<Cycle> {
        self.states
            .iter()
            .find(|s| s.queued.iter().any(|r| r.action == id))
            .map(|s| s.cycle)
    }

    /// Cycles `id` spent in a waiting queue; 0 if it was admitted on request.
    pub fn waited(&self, id: ActionId) -> Option<Cycle> {
        let admitted = self.admitted_at(id)?;
        Some(self.queued_at(id).map_or(0, |q| admitted - q))
    }

    /// Number of holders of `resource` during `cycle`.
    pub fn holders_at(&self, cycle: Cycle, resource: &str) -> usize {
        self.get(cycle).map_or(0, |s| s.holders_of(resource))
    }

    /// Pretty-print the history for debugging.
    pub fn dump(&self) {
        for s in &self.states {
            let fmt_list = |list: &[ActionRecord]| -> String {
                list.iter()
                    .map(|r| format!("{}:{}:{}", r.process_id, r.verb, r.resource))
                    .collect::<Vec<_>>()
                    .join(" ")
            };
            eprintln!(
                "[cycle {:>5}] accessed=[{}] waiting=[{}]",
                s.cycle,
                fmt_list(&s.accessed),
                fmt_list(&s.waiting)
            );
        }
    }
}
