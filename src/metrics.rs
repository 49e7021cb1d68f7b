//! Per-process and aggregate metrics derived from a timeline.
//!
//! Naming is canonical across the crate:
//!
//! - **completion** = finish − arrival
//! - **turnaround** = finish − first start
//! - **response** = first start − arrival
//! - **waiting** = completion − burst (cycles spent ready but not running)
//!
//! Aggregates are arithmetic means over all schedulable processes.
//! Zero-burst processes are complete on arrival and are left out.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::{Result, SimError};
use crate::policy::{self, Policy};
use crate::process::ProcessSet;
use crate::timeline::Timeline;
use crate::types::{Cycle, ProcessId};

/// Metrics for one process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessMetrics {
    pub process_id: ProcessId,
    pub arrival_time: Cycle,
    pub burst_time: Cycle,
    pub first_start: Cycle,
    pub finish: Cycle,
    pub completion_time: Cycle,
    pub turnaround_time: Cycle,
    pub response_time: Cycle,
    pub waiting_time: Cycle,
}

/// Means over all processes of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub avg_completion: f64,
    pub avg_turnaround: f64,
    pub avg_response: f64,
    pub avg_waiting: f64,
}

impl fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  avg_completion: {:>8.2}", self.avg_completion)?;
        writeln!(f, "  avg_turnaround: {:>8.2}", self.avg_turnaround)?;
        writeln!(f, "  avg_response:   {:>8.2}", self.avg_response)?;
        writeln!(f, "  avg_waiting:    {:>8.2}", self.avg_waiting)
    }
}

/// Full metrics of one schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleMetrics {
    /// Per-process metrics in registry order.
    pub processes: Vec<ProcessMetrics>,
    pub summary: MetricsSummary,
    /// Exclusive end of the last segment.
    pub makespan: Cycle,
    pub busy_cycles: Cycle,
}

impl ScheduleMetrics {
    pub fn get(&self, pid: &ProcessId) -> Option<&ProcessMetrics> {
        self.processes.iter().find(|m| m.process_id == *pid)
    }

    /// Fraction of the makespan the CPU was busy, 0 for an empty schedule.
    pub fn utilization(&self) -> f64 {
        if self.makespan == 0 {
            0.0
        } else {
            self.busy_cycles as f64 / self.makespan as f64
        }
    }
}

/// Compute metrics for `timeline` against the registry it was built from.
pub fn compute(timeline: &Timeline, processes: &ProcessSet) -> Result<ScheduleMetrics> {
    if let Some(seg) = timeline
        .segments()
        .iter()
        .find(|s| processes.get(&s.process_id).is_none())
    {
        return Err(SimError::UnknownProcess(seg.process_id.clone()));
    }
    timeline.check_order()?;

    let mut per_process = Vec::new();
    for p in processes.schedulable() {
        let (Some(first_start), Some(finish)) =
            (timeline.first_start(&p.id), timeline.finish(&p.id))
        else {
            return Err(SimError::IncompleteSchedule(p.id.clone()));
        };
        let completion_time = finish.saturating_sub(p.arrival_time);
        let m = ProcessMetrics {
            process_id: p.id.clone(),
            arrival_time: p.arrival_time,
            burst_time: p.burst_time,
            first_start,
            finish,
            completion_time,
            turnaround_time: finish - first_start,
            response_time: first_start.saturating_sub(p.arrival_time),
            waiting_time: completion_time.saturating_sub(p.burst_time),
        };
        debug!(
            pid = %m.process_id,
            completion = m.completion_time,
            turnaround = m.turnaround_time,
            response = m.response_time,
            "process metrics"
        );
        per_process.push(m);
    }

    if per_process.is_empty() {
        return Err(SimError::EmptyInput("schedulable processes"));
    }

    let n = per_process.len() as f64;
    let mean = |f: fn(&ProcessMetrics) -> Cycle| -> f64 {
        per_process.iter().map(f).sum::<Cycle>() as f64 / n
    };
    let summary = MetricsSummary {
        avg_completion: mean(|m| m.completion_time),
        avg_turnaround: mean(|m| m.turnaround_time),
        avg_response: mean(|m| m.response_time),
        avg_waiting: mean(|m| m.waiting_time),
    };

    Ok(ScheduleMetrics {
        processes: per_process,
        summary,
        makespan: timeline.end_cycle(),
        busy_cycles: timeline.busy_cycles(),
    })
}

/// One policy's timeline together with its metrics.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleReport {
    pub policy: Policy,
    pub timeline: Timeline,
    pub metrics: ScheduleMetrics,
}

/// Run `policy` and compute its metrics.
pub fn simulate(policy: Policy, processes: &ProcessSet) -> Result<ScheduleReport> {
    let timeline = policy::run(policy, processes)?;
    let metrics = compute(&timeline, processes)?;
    Ok(ScheduleReport {
        policy,
        timeline,
        metrics,
    })
}

/// Run every policy in `policies` over the same registry.
pub fn compare(policies: &[Policy], processes: &ProcessSet) -> Result<Vec<ScheduleReport>> {
    policies.iter().map(|&p| simulate(p, processes)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::ExecutionSegment;

    #[test]
    fn test_definitions() {
        let set = ProcessSet::builder()
            .add("A", 2, 1, 1)
            .add("B", 2, 0, 1)
            .build()
            .unwrap();
        // B 0..1, A 1..3, B 3..4
        let timeline: Timeline = vec![
            ExecutionSegment::new("B", 0, 1),
            ExecutionSegment::new("A", 1, 2),
            ExecutionSegment::new("B", 3, 1),
        ]
        .into_iter()
        .collect();
        let m = compute(&timeline, &set).unwrap();
        let b = m.get(&"B".into()).unwrap();
        assert_eq!(b.first_start, 0);
        assert_eq!(b.finish, 4);
        assert_eq!(b.completion_time, 4);
        assert_eq!(b.turnaround_time, 4);
        assert_eq!(b.response_time, 0);
        assert_eq!(b.waiting_time, 2);
        let a = m.get(&"A".into()).unwrap();
        assert_eq!((a.completion_time, a.turnaround_time, a.response_time), (2, 2, 0));
        assert_eq!(m.summary.avg_completion, 3.0);
        assert_eq!(m.utilization(), 1.0);
    }

    #[test]
    fn test_errors() {
        let set = ProcessSet::builder().add("A", 2, 0, 1).build().unwrap();
        assert_eq!(
            compute(&Timeline::new(), &set).unwrap_err(),
            SimError::IncompleteSchedule("A".into())
        );

        let stray: Timeline = vec![ExecutionSegment::new("Z", 0, 1)].into_iter().collect();
        assert_eq!(
            compute(&stray, &set).unwrap_err(),
            SimError::UnknownProcess("Z".into())
        );

        let idle = ProcessSet::builder().add("A", 0, 0, 1).build().unwrap();
        assert_eq!(
            compute(&Timeline::new(), &idle).unwrap_err(),
            SimError::EmptyInput("schedulable processes")
        );
    }

    #[test]
    fn test_unordered_timeline_is_rejected() {
        let set = ProcessSet::builder().add("A", 2, 0, 1).build().unwrap();
        let reversed: Timeline = vec![
            ExecutionSegment::new("A", 5, 1),
            ExecutionSegment::new("A", 0, 1),
        ]
        .into_iter()
        .collect();
        assert!(matches!(
            compute(&reversed, &set).unwrap_err(),
            SimError::InvariantViolation(_)
        ));

        let overlapping: Timeline = vec![
            ExecutionSegment::new("A", 0, 2),
            ExecutionSegment::new("A", 1, 1),
        ]
        .into_iter()
        .collect();
        assert!(compute(&overlapping, &set).is_err());
    }
}
