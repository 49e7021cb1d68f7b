//! Process registry: the immutable set of simulated processes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::types::{Cycle, Priority, ProcessId};

/// A simulated process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub id: ProcessId,
    /// Total CPU cycles the process needs.
    pub burst_time: Cycle,
    /// Cycle at which the process becomes eligible to run.
    pub arrival_time: Cycle,
    /// Static priority (lower value = higher priority).
    pub priority: Priority,
}

impl Process {
    pub fn new(
        id: impl Into<ProcessId>,
        burst_time: Cycle,
        arrival_time: Cycle,
        priority: Priority,
    ) -> Self {
        Process {
            id: id.into(),
            burst_time,
            arrival_time,
            priority,
        }
    }

    /// Zero-burst processes are complete on arrival and never scheduled.
    pub fn is_schedulable(&self) -> bool {
        self.burst_time > 0
    }
}

/// The validated, immutable process set for one run.
///
/// Input order is preserved: several policies break ties by it.
#[derive(Debug, Clone)]
pub struct ProcessSet {
    processes: Vec<Process>,
    index: HashMap<ProcessId, usize>,
}

impl ProcessSet {
    /// Validate and freeze a process list.
    ///
    /// Rejects an empty list and duplicated ids.
    pub fn new(processes: Vec<Process>) -> Result<Self> {
        if processes.is_empty() {
            return Err(SimError::EmptyInput("processes"));
        }
        let mut index = HashMap::with_capacity(processes.len());
        for (i, p) in processes.iter().enumerate() {
            if index.insert(p.id.clone(), i).is_some() {
                return Err(SimError::DuplicateProcess(p.id.clone()));
            }
        }
        Ok(ProcessSet { processes, index })
    }

    pub fn builder() -> ProcessSetBuilder {
        ProcessSetBuilder {
            processes: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    /// Always false for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn as_slice(&self) -> &[Process] {
        &self.processes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.processes.iter()
    }

    pub fn get(&self, id: &ProcessId) -> Option<&Process> {
        self.index.get(id).map(|&i| &self.processes[i])
    }

    /// Position of the process in input order.
    pub fn index_of(&self, id: &ProcessId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Processes with a non-zero burst, in input order.
    pub fn schedulable(&self) -> impl Iterator<Item = &Process> {
        self.processes.iter().filter(|p| p.is_schedulable())
    }

    /// Sum of all burst times.
    pub fn total_burst(&self) -> Cycle {
        self.processes.iter().map(|p| p.burst_time).sum()
    }
}

impl<'a> IntoIterator for &'a ProcessSet {
    type Item = &'a Process;
    type IntoIter = std::slice::Iter<'a, Process>;

    fn into_iter(self) -> Self::IntoIter {
        self.processes.iter()
    }
}

/// Builder for process sets, mostly for tests and benches.
pub struct ProcessSetBuilder {
    processes: Vec<Process>,
}

impl ProcessSetBuilder {
    /// Add a fully specified process.
    pub fn process(mut self, p: Process) -> Self {
        self.processes.push(p);
        self
    }

    /// Convenience: add a process from its fields.
    pub fn add(self, id: &str, burst_time: Cycle, arrival_time: Cycle, priority: Priority) -> Self {
        self.process(Process::new(id, burst_time, arrival_time, priority))
    }

    pub fn build(self) -> Result<ProcessSet> {
        ProcessSet::new(self.processes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert_eq!(
            ProcessSet::new(Vec::new()).unwrap_err(),
            SimError::EmptyInput("processes")
        );
        let err = ProcessSet::builder()
            .add("A", 1, 0, 1)
            .add("A", 2, 0, 1)
            .build()
            .unwrap_err();
        assert_eq!(err, SimError::DuplicateProcess(ProcessId::from("A")));
    }

    #[test]
    fn test_lookup_preserves_input_order() {
        let set = ProcessSet::builder()
            .add("B", 3, 1, 2)
            .add("A", 0, 0, 1)
            .add("C", 4, 2, 1)
            .build()
            .unwrap();
        assert_eq!(set.index_of(&"C".into()), Some(2));
        assert_eq!(set.get(&"B".into()).unwrap().burst_time, 3);
        let ids: Vec<&str> = set.schedulable().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "C"]);
        assert_eq!(set.total_burst(), 7);
    }
}
