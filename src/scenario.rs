//! Synchronization scenario definition and builder API.

use std::collections::HashSet;

use crate::action::{Action, Verb};
use crate::error::{Result, SimError};
use crate::process::ProcessSet;
use crate::resource::{Resource, SyncMode};
use crate::types::Cycle;

/// Default watchdog: a run whose oldest queued action has waited this many
/// cycles is reported as unsatisfiable.
pub const DEFAULT_MAX_CYCLES: Cycle = 100_000;

/// Everything the synchronization driver needs for one run.
#[derive(Debug, Clone)]
pub struct SyncScenario {
    pub mode: SyncMode,
    pub resources: Vec<Resource>,
    /// Actions in input order; the driver sorts them by request cycle.
    pub actions: Vec<Action>,
    /// Optional registry used to validate the actions' process ids.
    pub processes: Option<ProcessSet>,
    /// Longest a queued action may wait before the run is declared
    /// unsatisfiable, `None` to disable.
    pub max_cycles: Option<Cycle>,
}

/// Builder for constructing scenarios.
pub struct SyncScenarioBuilder {
    mode: SyncMode,
    resources: Vec<Resource>,
    actions: Vec<Action>,
    processes: Option<ProcessSet>,
    max_cycles: Option<Cycle>,
}

impl SyncScenario {
    pub fn builder() -> SyncScenarioBuilder {
        SyncScenarioBuilder {
            mode: SyncMode::Mutex,
            resources: Vec::new(),
            actions: Vec::new(),
            processes: None,
            max_cycles: Some(DEFAULT_MAX_CYCLES),
        }
    }
}

impl SyncScenarioBuilder {
    pub fn mode(mut self, mode: SyncMode) -> Self {
        self.mode = mode;
        self
    }

    /// Declare a resource.
    pub fn resource(mut self, name: &str, capacity: u32) -> Self {
        self.resources.push(Resource::new(name, capacity));
        self
    }

    pub fn resources(mut self, resources: impl IntoIterator<Item = Resource>) -> Self {
        self.resources.extend(resources);
        self
    }

    /// Convenience: add an action from its fields.
    pub fn action(mut self, pid: &str, verb: Verb, resource: &str, request_cycle: Cycle) -> Self {
        self.actions
            .push(Action::new(pid, verb, resource, request_cycle));
        self
    }

    pub fn actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Validate action process ids against this registry.
    pub fn processes(mut self, processes: ProcessSet) -> Self {
        self.processes = Some(processes);
        self
    }

    /// Set the watchdog bound (`None` disables it).
    pub fn max_cycles(mut self, max_cycles: Option<Cycle>) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Build the scenario.
    ///
    /// Resource lookups are left to the driver, which knows whether
    /// undeclared names are allowed in the chosen mode.
    pub fn build(self) -> Result<SyncScenario> {
        if self.actions.is_empty() {
            return Err(SimError::EmptyInput("actions"));
        }
        if self.max_cycles == Some(0) {
            return Err(SimError::InvalidParameter(
                "max_cycles must be at least 1".into(),
            ));
        }
        let mut seen = HashSet::new();
        for r in &self.resources {
            r.validate()?;
            if !seen.insert(r.name.as_str()) {
                return Err(SimError::InvalidParameter(format!(
                    "resource {:?} declared twice",
                    r.name
                )));
            }
        }
        if let Some(processes) = &self.processes {
            if let Some(a) = self
                .actions
                .iter()
                .find(|a| processes.get(&a.process_id).is_none())
            {
                return Err(SimError::UnknownProcess(a.process_id.clone()));
            }
        }
        Ok(SyncScenario {
            mode: self.mode,
            resources: self.resources,
            actions: self.actions,
            processes: self.processes,
            max_cycles: self.max_cycles,
        })
    }
}
