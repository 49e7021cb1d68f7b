mod common;

use common::{processes, setup_test};
use cyclesim::*;

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

#[test]
fn test_fifo_average_response() {
    setup_test();
    let set = processes(&[("A", 5, 0, 1), ("B", 3, 1, 1)]);
    let report = simulate(Policy::Fifo, &set).unwrap();
    let m = &report.metrics;

    let b = m.get(&"B".into()).unwrap();
    assert_eq!(b.first_start, 5);
    assert_eq!(b.finish, 8);
    assert_eq!(b.response_time, 4);
    assert_eq!(b.completion_time, 7);
    assert_eq!(b.turnaround_time, 3);
    assert_eq!(b.waiting_time, 4);

    assert_close(m.summary.avg_response, 2.0);
    assert_close(m.summary.avg_completion, 6.0);
    assert_eq!(m.makespan, 8);
    assert_close(m.utilization(), 1.0);
}

#[test]
fn test_srt_metrics_account_for_preemption() {
    setup_test();
    let set = processes(&[("A", 8, 0, 1), ("B", 4, 1, 1)]);
    let report = simulate(Policy::Srt, &set).unwrap();
    let a = report.metrics.get(&"A".into()).unwrap();
    // A: 0..1 then 5..12.
    assert_eq!(a.response_time, 0);
    assert_eq!(a.turnaround_time, 12);
    assert_eq!(a.completion_time, 12);
    assert_eq!(a.waiting_time, 4);
}

#[test]
fn test_metric_identities_hold_for_every_policy() {
    setup_test();
    let set = cyclesim::workloads::random_set(3, 15, 9, 40).unwrap();
    let policies: Vec<Policy> = PolicyKind::ALL
        .iter()
        .map(|k| k.with_params(2, 3))
        .collect();
    for report in compare(&policies, &set).unwrap() {
        for m in &report.metrics.processes {
            let p = set.get(&m.process_id).unwrap();
            assert_eq!(m.completion_time, m.finish - p.arrival_time);
            assert_eq!(m.response_time, m.first_start - p.arrival_time);
            assert_eq!(m.turnaround_time, m.finish - m.first_start);
            assert_eq!(m.waiting_time + p.burst_time, m.completion_time);
            assert!(m.turnaround_time >= p.burst_time);
        }
    }
}

#[test]
fn test_all_zero_burst_is_empty_input() {
    let set = processes(&[("A", 0, 0, 1), ("B", 0, 3, 1)]);
    let timeline = run(Policy::Fifo, &set).unwrap();
    assert!(timeline.is_empty());
    assert_eq!(
        compute(&timeline, &set).unwrap_err(),
        SimError::EmptyInput("schedulable processes")
    );
}

#[test]
fn test_empty_registry_is_rejected() {
    assert_eq!(
        ProcessSet::new(Vec::new()).unwrap_err(),
        SimError::EmptyInput("processes")
    );
}
