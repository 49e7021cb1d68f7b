//! Resource arbiter: availability counters and FIFO waiting queues.
//!
//! The arbiter exclusively owns every resource's `available` counter and
//! waiting queue. Callers ask it to admit, queue, release and advance; it
//! never looks at the clock or at action lifecycles.
//!
//! Counter rules per mode:
//!
//! - **Semaphore**: acquire decrements `available` when it is positive,
//!   release increments it.
//! - **Mutex**: acquire succeeds only when the resource is fully free
//!   (`available == capacity`) and drops `available` to 0; release
//!   restores it to `capacity`.
//!
//! Either way `available` stays within `[0, capacity]`; an operation that
//! would break that is reported as [`SimError::InvariantViolation`].

use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use tracing::debug;

use crate::error::{Result, SimError};
use crate::resource::{Resource, SyncMode};
use crate::types::ActionId;

/// Counter snapshot of one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceLevel {
    pub name: String,
    pub capacity: u32,
    pub available: u32,
}

#[derive(Debug)]
struct ResourceState {
    resource: Resource,
    available: u32,
    waiting: VecDeque<ActionId>,
}

impl ResourceState {
    fn new(resource: Resource) -> Self {
        ResourceState {
            available: resource.capacity,
            resource,
            waiting: VecDeque::new(),
        }
    }
}

/// Arbitrates access to every resource of one run.
#[derive(Debug)]
pub struct Arbiter {
    mode: SyncMode,
    /// Declaration order; queues are advanced in this order.
    resources: Vec<ResourceState>,
    index: HashMap<String, usize>,
}

impl Arbiter {
    /// Create an arbiter over the declared resources.
    ///
    /// Rejects zero-capacity and duplicated resources.
    pub fn new(mode: SyncMode, resources: &[Resource]) -> Result<Self> {
        let mut arbiter = Arbiter {
            mode,
            resources: Vec::with_capacity(resources.len()),
            index: HashMap::with_capacity(resources.len()),
        };
        for r in resources {
            r.validate()?;
            if arbiter.index.contains_key(&r.name) {
                return Err(SimError::InvalidParameter(format!(
                    "resource {:?} declared twice",
                    r.name
                )));
            }
            arbiter.insert(r.clone());
        }
        Ok(arbiter)
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    /// Make sure the resource named by `action` exists.
    ///
    /// Mutex mode declares unknown resources implicitly with capacity 1;
    /// semaphore mode reports them as [`SimError::UnknownResource`].
    pub fn resolve(&mut self, action: ActionId, name: &str) -> Result<()> {
        if self.index.contains_key(name) {
            return Ok(());
        }
        match self.mode {
            SyncMode::Mutex => {
                debug!(resource = name, "implicitly declaring mutex");
                self.insert(Resource::mutex(name));
                Ok(())
            }
            SyncMode::Semaphore => Err(SimError::UnknownResource {
                action,
                resource: name.to_string(),
            }),
        }
    }

    /// Try to take one unit of `name`. Returns whether access was granted.
    pub fn try_acquire(&mut self, name: &str) -> Result<bool> {
        let mode = self.mode;
        let state = self.state_mut(name)?;
        let granted = match mode {
            SyncMode::Semaphore => {
                if state.available > 0 {
                    state.available -= 1;
                    true
                } else {
                    false
                }
            }
            SyncMode::Mutex => {
                if state.available == state.resource.capacity {
                    state.available = 0;
                    true
                } else {
                    false
                }
            }
        };
        Ok(granted)
    }

    /// Give back one unit of `name`.
    pub fn release(&mut self, name: &str) -> Result<()> {
        let mode = self.mode;
        let state = self.state_mut(name)?;
        if state.available >= state.resource.capacity {
            return Err(SimError::InvariantViolation(format!(
                "release of {name:?} would exceed capacity {} (available {})",
                state.resource.capacity, state.available
            )));
        }
        match mode {
            SyncMode::Semaphore => state.available += 1,
            SyncMode::Mutex => state.available = state.resource.capacity,
        }
        Ok(())
    }

    /// Append `id` to the waiting queue of `name`.
    pub fn enqueue(&mut self, name: &str, id: ActionId) -> Result<()> {
        self.state_mut(name)?.waiting.push_back(id);
        Ok(())
    }

    /// Whether `name` has actions waiting.
    pub fn has_waiters(&self, name: &str) -> Result<bool> {
        Ok(!self.state(name)?.waiting.is_empty())
    }

    /// Admit waiting actions, head first, for as long as capacity allows.
    /// Resources are visited in declaration order. Returns the admitted
    /// actions in admission order.
    pub fn advance_queues(&mut self) -> Result<Vec<ActionId>> {
        let mut admitted = Vec::new();
        for idx in 0..self.resources.len() {
            while let Some(&head) = self.resources[idx].waiting.front() {
                let name = self.resources[idx].resource.name.clone();
                if !self.try_acquire(&name)? {
                    break;
                }
                self.resources[idx].waiting.pop_front();
                admitted.push(head);
            }
        }
        Ok(admitted)
    }

    pub fn available(&self, name: &str) -> Option<u32> {
        self.state(name).ok().map(|s| s.available)
    }

    /// Number of actions currently holding `name`.
    pub fn holders(&self, name: &str) -> Option<u32> {
        let state = self.state(name).ok()?;
        Some(match self.mode {
            SyncMode::Semaphore => state.resource.capacity - state.available,
            SyncMode::Mutex => u32::from(state.available < state.resource.capacity),
        })
    }

    /// Waiting queue of `name`, head first.
    pub fn waiting(&self, name: &str) -> Vec<ActionId> {
        self.state(name)
            .map(|s| s.waiting.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Every waiting action, resources in declaration order.
    pub fn all_waiting(&self) -> Vec<ActionId> {
        self.resources
            .iter()
            .flat_map(|s| s.waiting.iter().copied())
            .collect()
    }

    pub fn total_waiting(&self) -> usize {
        self.resources.iter().map(|s| s.waiting.len()).sum()
    }

    /// Counter snapshot of every resource, in declaration order.
    pub fn levels(&self) -> Vec<ResourceLevel> {
        self.resources
            .iter()
            .map(|s| ResourceLevel {
                name: s.resource.name.clone(),
                capacity: s.resource.capacity,
                available: s.available,
            })
            .collect()
    }

    /// Declared resources (including implicit mutexes), in declaration order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter().map(|s| &s.resource)
    }

    /// Restore every counter to full capacity and empty every queue.
    /// Declarations are kept.
    pub fn reset(&mut self) {
        for state in &mut self.resources {
            state.available = state.resource.capacity;
            state.waiting.clear();
        }
    }

    fn insert(&mut self, resource: Resource) {
        self.index
            .insert(resource.name.clone(), self.resources.len());
        self.resources.push(ResourceState::new(resource));
    }

    fn state(&self, name: &str) -> Result<&ResourceState> {
        self.index
            .get(name)
            .map(|&i| &self.resources[i])
            .ok_or_else(|| SimError::InvalidParameter(format!("resource {name:?} is not declared")))
    }

    fn state_mut(&mut self, name: &str) -> Result<&mut ResourceState> {
        match self.index.get(name) {
            Some(&i) => Ok(&mut self.resources[i]),
            None => Err(SimError::InvalidParameter(format!(
                "resource {name:?} is not declared"
            ))),
        }
    }
}
