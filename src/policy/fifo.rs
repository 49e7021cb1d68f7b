//! First-In First-Out: run to completion in arrival order.

use tracing::debug;

use crate::process::{Process, ProcessSet};
use crate::timeline::Timeline;
use crate::types::Cycle;

pub fn schedule(processes: &ProcessSet) -> Timeline {
    let mut order: Vec<&Process> = processes.schedulable().collect();
    // Stable: equal arrivals keep input order.
    order.sort_by_key(|p| p.arrival_time);

    let mut timeline = Timeline::new();
    let mut clock: Cycle = 0;
    for p in order {
        if clock < p.arrival_time {
            debug!(cycle = clock, until = p.arrival_time, "cpu idle");
            clock = p.arrival_time;
        }
        debug!(cycle = clock, pid = %p.id, burst = p.burst_time, "dispatch");
        timeline.push_segment(&p.id, clock, p.burst_time);
        clock += p.burst_time;
    }
    timeline
}
