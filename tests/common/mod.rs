#![allow(dead_code)]

use cyclesim::{ProcessSet, SimFormat};

/// Initialize tracing from `RUST_LOG` with the cycle-prefixed formatter.
///
/// `try_init()` is idempotent: first call in the process succeeds,
/// subsequent calls are silently ignored.
pub fn setup_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .event_format(SimFormat)
        .try_init();
}

/// Build a process set from `(id, burst, arrival, priority)` tuples.
pub fn processes(rows: &[(&str, u64, u64, i64)]) -> ProcessSet {
    rows.iter()
        .fold(ProcessSet::builder(), |b, &(id, bt, at, prio)| {
            b.add(id, bt, at, prio)
        })
        .build()
        .unwrap()
}

/// Segments as `(pid, start, end)` triples for compact assertions.
pub fn spans(timeline: &cyclesim::Timeline) -> Vec<(String, u64, u64)> {
    timeline
        .segments()
        .iter()
        .map(|s| (s.process_id.to_string(), s.start_cycle, s.end_cycle()))
        .collect()
}

pub fn span(pid: &str, start: u64, end: u64) -> (String, u64, u64) {
    (pid.to_string(), start, end)
}
