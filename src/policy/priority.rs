//! Preemptive priority scheduling with aging.
//!
//! Each cycle the ready process with the smallest dynamic priority value
//! runs (ties: earliest arrival, then input order). Every other ready
//! process accrues one waiting cycle; each time its accrued waiting hits a
//! multiple of the aging interval, its priority value drops by one,
//! floored at 1. Values already at or below 1 are never raised, so a
//! process's effective priority is non-increasing. Running resets the
//! accrued waiting but keeps the aged priority.

use serde::Serialize;
use tracing::debug;

use super::next_arrival;
use crate::process::{Process, ProcessSet};
use crate::timeline::Timeline;
use crate::types::{Cycle, Priority, ProcessId};

/// Lowest priority value aging can reach.
pub const PRIORITY_FLOOR: Priority = 1;

/// One aging step applied to a waiting process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgingEvent {
    /// First cycle at which the new value is in effect.
    pub cycle: Cycle,
    pub process_id: ProcessId,
    pub from: Priority,
    pub to: Priority,
}

/// Aging history of one Priority-with-aging run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PriorityTrace {
    events: Vec<AgingEvent>,
    initial: Vec<(ProcessId, Priority)>,
}

impl PriorityTrace {
    pub fn events(&self) -> &[AgingEvent] {
        &self.events
    }

    /// `(cycle, value)` pairs for `pid`, starting with its static priority
    /// at its arrival cycle.
    pub fn history(&self, pid: &ProcessId, arrival: Cycle) -> Vec<(Cycle, Priority)> {
        let mut out: Vec<(Cycle, Priority)> = self
            .initial
            .iter()
            .filter(|(p, _)| p == pid)
            .map(|&(_, prio)| (arrival, prio))
            .collect();
        out.extend(
            self.events
                .iter()
                .filter(|e| e.process_id == *pid)
                .map(|e| (e.cycle, e.to)),
        );
        out
    }

    /// Priority value of `pid` when its run finished.
    pub fn final_priority(&self, pid: &ProcessId) -> Option<Priority> {
        self.events
            .iter()
            .rev()
            .find(|e| e.process_id == *pid)
            .map(|e| e.to)
            .or_else(|| {
                self.initial
                    .iter()
                    .find(|(p, _)| p == pid)
                    .map(|&(_, prio)| prio)
            })
    }
}

struct Slot<'a> {
    process: &'a Process,
    remaining: Cycle,
    priority: Priority,
    waited: Cycle,
}

pub fn schedule(processes: &ProcessSet, interval: Cycle) -> (Timeline, PriorityTrace) {
    let mut slots: Vec<Slot> = processes
        .schedulable()
        .map(|p| Slot {
            process: p,
            remaining: p.burst_time,
            priority: p.priority,
            waited: 0,
        })
        .collect();
    let mut trace = PriorityTrace {
        events: Vec::new(),
        initial: slots
            .iter()
            .map(|s| (s.process.id.clone(), s.priority))
            .collect(),
    };

    let mut timeline = Timeline::new();
    let mut left = slots.len();
    let mut clock: Cycle = 0;
    while left > 0 {
        let ready: Vec<usize> = slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.remaining > 0 && s.process.arrival_time <= clock)
            .map(|(i, _)| i)
            .collect();

        let chosen = ready
            .iter()
            .copied()
            .min_by_key(|&i| (slots[i].priority, slots[i].process.arrival_time, i));

        let Some(chosen) = chosen else {
            let pending = slots
                .iter()
                .filter(|s| s.remaining > 0)
                .map(|s| s.process);
            match next_arrival(pending, clock) {
                Some(at) => {
                    debug!(cycle = clock, until = at, "cpu idle");
                    clock = at;
                    continue;
                }
                None => break,
            }
        };

        timeline.run_cycle(&slots[chosen].process.id, clock);
        let slot = &mut slots[chosen];
        slot.remaining -= 1;
        slot.waited = 0;
        if slot.remaining == 0 {
            left -= 1;
            debug!(cycle = clock + 1, pid = %slot.process.id, "completed");
        }

        for &i in ready.iter().filter(|&&i| i != chosen) {
            let slot = &mut slots[i];
            slot.waited += 1;
            if slot.waited % interval == 0 && slot.priority > PRIORITY_FLOOR {
                let from = slot.priority;
                slot.priority -= 1;
                debug!(
                    cycle = clock + 1,
                    pid = %slot.process.id,
                    from,
                    to = slot.priority,
                    "aged"
                );
                trace.events.push(AgingEvent {
                    cycle: clock + 1,
                    process_id: slot.process.id.clone(),
                    from,
                    to: slot.priority,
                });
            }
        }
        clock += 1;
    }
    (timeline, trace)
}
