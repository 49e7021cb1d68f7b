//! Round Robin with a fixed quantum.
//!
//! One segment is emitted per dispatch, even when the same process is
//! dispatched again immediately, so no segment of a process exceeds the
//! quantum.

use std::collections::VecDeque;

use tracing::debug;

use crate::process::{Process, ProcessSet};
use crate::timeline::Timeline;
use crate::types::Cycle;

pub fn schedule(processes: &ProcessSet, quantum: Cycle) -> Timeline {
    let mut order: Vec<&Process> = processes.schedulable().collect();
    order.sort_by_key(|p| p.arrival_time);
    let mut remaining: Vec<Cycle> = order.iter().map(|p| p.burst_time).collect();

    let mut timeline = Timeline::new();
    let mut ready: VecDeque<usize> = VecDeque::new();
    let mut next = 0;
    let mut finished = 0;
    let mut clock: Cycle = 0;

    while finished < order.len() {
        while next < order.len() && order[next].arrival_time <= clock {
            ready.push_back(next);
            next += 1;
        }

        let Some(i) = ready.pop_front() else {
            if next >= order.len() {
                break;
            }
            debug!(cycle = clock, until = order[next].arrival_time, "cpu idle");
            clock = order[next].arrival_time;
            continue;
        };

        let slice = quantum.min(remaining[i]);
        debug!(cycle = clock, pid = %order[i].id, slice, "dispatch");
        timeline.push_segment(&order[i].id, clock, slice);
        clock += slice;
        remaining[i] -= slice;

        // Arrivals during the slice queue ahead of the preempted process.
        while next < order.len() && order[next].arrival_time < clock {
            ready.push_back(next);
            next += 1;
        }

        if remaining[i] > 0 {
            debug!(cycle = clock, pid = %order[i].id, remaining = remaining[i], "preempted");
            ready.push_back(i);
        } else {
            debug!(cycle = clock, pid = %order[i].id, "completed");
            finished += 1;
        }
    }
    timeline
}
