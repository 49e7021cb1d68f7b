//! Workload generators for common process and request patterns.
//!
//! Used by the benchmarks and the property tests. Random generators take an
//! explicit seed so every workload is reproducible.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::action::{Action, Verb};
use crate::error::Result;
use crate::process::{Process, ProcessSet};
use crate::types::{Cycle, Priority};

/// `n` processes arriving every `gap` cycles, each needing `burst` cycles.
/// Priorities alternate between 1 and 2.
pub fn staggered(n: usize, burst: Cycle, gap: Cycle) -> Vec<Process> {
    (0..n)
        .map(|i| {
            Process::new(
                format!("P{}", i + 1),
                burst,
                i as Cycle * gap,
                1 + (i % 2) as Priority,
            )
        })
        .collect()
}

/// `n` processes with random bursts in `1..=max_burst`, arrivals in
/// `0..=max_arrival` and priorities in `1..=5`.
pub fn random_processes(
    seed: u64,
    n: usize,
    max_burst: Cycle,
    max_arrival: Cycle,
) -> Vec<Process> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            Process::new(
                format!("P{}", i + 1),
                rng.gen_range(1..=max_burst.max(1)),
                rng.gen_range(0..=max_arrival),
                rng.gen_range(1..=5),
            )
        })
        .collect()
}

/// [`random_processes`] as a validated [`ProcessSet`]. Fails only for `n == 0`.
pub fn random_set(
    seed: u64,
    n: usize,
    max_burst: Cycle,
    max_arrival: Cycle,
) -> Result<ProcessSet> {
    ProcessSet::new(random_processes(seed, n, max_burst, max_arrival))
}

/// `n` actions from `n` processes hitting the same resource in one cycle.
pub fn thundering_herd(n: usize, resource: &str, cycle: Cycle) -> Vec<Action> {
    (0..n)
        .map(|i| {
            let verb = if i % 2 == 0 { Verb::Read } else { Verb::Write };
            Action::new(format!("P{}", i + 1), verb, resource, cycle)
        })
        .collect()
}

/// `n` random actions by processes `P1..=Pprocs` over `resources`, with
/// request cycles in `0..=max_cycle`.
///
/// # Panics
/// Panics if `resources` is empty.
pub fn random_actions(
    seed: u64,
    n: usize,
    procs: usize,
    resources: &[&str],
    max_cycle: Cycle,
) -> Vec<Action> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let pid = format!("P{}", rng.gen_range(1..=procs.max(1)));
            let verb = if rng.gen_bool(0.5) {
                Verb::Read
            } else {
                Verb::Write
            };
            let resource = resources[rng.gen_range(0..resources.len())];
            Action::new(pid, verb, resource, rng.gen_range(0..=max_cycle))
        })
        .collect()
}
