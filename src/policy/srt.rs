//! Preemptive Shortest-Remaining-Time, evaluated every cycle.

use std::collections::BTreeMap;

use tracing::debug;

use super::next_arrival;
use crate::process::{Process, ProcessSet};
use crate::timeline::Timeline;
use crate::types::Cycle;

pub fn schedule(processes: &ProcessSet) -> Timeline {
    let procs: Vec<&Process> = processes.schedulable().collect();
    // Keyed by input index so iteration order is input order.
    let mut remaining: BTreeMap<usize, Cycle> = procs
        .iter()
        .enumerate()
        .map(|(i, p)| (i, p.burst_time))
        .collect();

    let mut timeline = Timeline::new();
    let mut clock: Cycle = 0;
    let mut running: Option<usize> = None;
    while !remaining.is_empty() {
        let mut pending: Vec<(usize, Cycle)> = remaining.iter().map(|(&i, &r)| (i, r)).collect();
        pending.sort_by_key(|&(_, r)| r);
        let chosen = pending
            .iter()
            .find(|&&(i, _)| procs[i].arrival_time <= clock)
            .map(|&(i, _)| i);

        let Some(i) = chosen else {
            match next_arrival(remaining.keys().map(|&i| procs[i]), clock) {
                Some(at) => {
                    debug!(cycle = clock, until = at, "cpu idle");
                    clock = at;
                    running = None;
                    continue;
                }
                None => break,
            }
        };

        if running != Some(i) {
            debug!(cycle = clock, pid = %procs[i].id, remaining = remaining[&i], "switch");
            running = Some(i);
        }
        timeline.run_cycle(&procs[i].id, clock);
        clock += 1;

        let left = remaining[&i] - 1;
        if left == 0 {
            remaining.remove(&i);
            debug!(cycle = clock, pid = %procs[i].id, "completed");
        } else {
            remaining.insert(i, left);
        }
    }
    timeline
}
