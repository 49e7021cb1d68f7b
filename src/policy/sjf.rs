//! Non-preemptive Shortest-Job-First.

use tracing::debug;

use super::next_arrival;
use crate::process::{Process, ProcessSet};
use crate::timeline::Timeline;
use crate::types::Cycle;

pub fn schedule(processes: &ProcessSet) -> Timeline {
    let procs: Vec<&Process> = processes.schedulable().collect();
    let mut done = vec![false; procs.len()];
    let mut left = procs.len();

    let mut timeline = Timeline::new();
    let mut clock: Cycle = 0;
    while left > 0 {
        // Strict `<` keeps the first candidate found in input order on ties.
        let mut chosen: Option<usize> = None;
        for (i, p) in procs.iter().enumerate() {
            if done[i] || p.arrival_time > clock {
                continue;
            }
            if chosen.map_or(true, |c| p.burst_time < procs[c].burst_time) {
                chosen = Some(i);
            }
        }

        let Some(i) = chosen else {
            let pending = procs
                .iter()
                .enumerate()
                .filter(|(j, _)| !done[*j])
                .map(|(_, p)| *p);
            match next_arrival(pending, clock) {
                Some(at) => {
                    debug!(cycle = clock, until = at, "cpu idle");
                    clock = at;
                    continue;
                }
                None => break,
            }
        };

        let p = procs[i];
        debug!(cycle = clock, pid = %p.id, burst = p.burst_time, "dispatch shortest job");
        timeline.push_segment(&p.id, clock, p.burst_time);
        clock += p.burst_time;
        done[i] = true;
        left -= 1;
    }
    timeline
}
