//! Execution timeline produced by the scheduling policies.
//!
//! A timeline is an ordered, non-overlapping sequence of
//! [`ExecutionSegment`]s. Policies append to it in chronological order,
//! either a whole dispatch at a time ([`Timeline::push_segment`]) or one
//! cycle at a time ([`Timeline::run_cycle`], which extends the previous
//! segment when the same process keeps the CPU).

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::process::ProcessSet;
use crate::types::{Cycle, ProcessId};

/// A contiguous run of one process on the CPU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSegment {
    pub process_id: ProcessId,
    pub start_cycle: Cycle,
    pub duration: Cycle,
}

impl ExecutionSegment {
    pub fn new(process_id: impl Into<ProcessId>, start_cycle: Cycle, duration: Cycle) -> Self {
        ExecutionSegment {
            process_id: process_id.into(),
            start_cycle,
            duration,
        }
    }

    /// First cycle after the segment (exclusive end).
    pub fn end_cycle(&self) -> Cycle {
        self.start_cycle + self.duration
    }

    pub fn contains(&self, cycle: Cycle) -> bool {
        self.start_cycle <= cycle && cycle < self.end_cycle()
    }
}

/// An ordered sequence of execution segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    segments: Vec<ExecutionSegment>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a whole dispatch as its own segment. Zero-length dispatches
    /// are dropped.
    pub(crate) fn push_segment(&mut self, pid: &ProcessId, start_cycle: Cycle, duration: Cycle) {
        if duration == 0 {
            return;
        }
        debug_assert!(
            start_cycle >= self.end_cycle(),
            "segment for {pid} at {start_cycle} overlaps timeline ending at {}",
            self.end_cycle()
        );
        self.segments.push(ExecutionSegment {
            process_id: pid.clone(),
            start_cycle,
            duration,
        });
    }

    /// Record that `pid` held the CPU during `cycle`, extending the last
    /// segment if it is a continuation of the same process.
    pub(crate) fn run_cycle(&mut self, pid: &ProcessId, cycle: Cycle) {
        if let Some(last) = self.segments.last_mut() {
            if last.process_id == *pid && last.end_cycle() == cycle {
                last.duration += 1;
                return;
            }
        }
        self.push_segment(pid, cycle, 1);
    }

    /// All segments in chronological order.
    pub fn segments(&self) -> &[ExecutionSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Latest segment end (the makespan), 0 when empty.
    pub fn end_cycle(&self) -> Cycle {
        self.segments.iter().map(|s| s.end_cycle()).max().unwrap_or(0)
    }

    /// Total cycles during which some process held the CPU.
    pub fn busy_cycles(&self) -> Cycle {
        self.segments.iter().map(|s| s.duration).sum()
    }

    /// Cycles during which the CPU sat idle before the makespan.
    pub fn idle_cycles(&self) -> Cycle {
        self.end_cycle().saturating_sub(self.busy_cycles())
    }

    /// Total cycles executed by `pid` across all its segments.
    pub fn total_runtime(&self, pid: &ProcessId) -> Cycle {
        self.segments_of(pid).map(|s| s.duration).sum()
    }

    /// Number of segments belonging to `pid`.
    pub fn dispatch_count(&self, pid: &ProcessId) -> usize {
        self.segments_of(pid).count()
    }

    /// Start of the earliest segment of `pid`.
    pub fn first_start(&self, pid: &ProcessId) -> Option<Cycle> {
        self.segments_of(pid).map(|s| s.start_cycle).min()
    }

    /// End of the latest segment of `pid`.
    pub fn finish(&self, pid: &ProcessId) -> Option<Cycle> {
        self.segments_of(pid).map(|s| s.end_cycle()).max()
    }

    /// Process ids in order of their first dispatch.
    pub fn dispatch_order(&self) -> Vec<&ProcessId> {
        let mut order: Vec<&ProcessId> = Vec::new();
        for seg in &self.segments {
            if !order.contains(&&seg.process_id) {
                order.push(&seg.process_id);
            }
        }
        order
    }

    /// The process holding the CPU during `cycle`, if any.
    pub fn process_at(&self, cycle: Cycle) -> Option<&ProcessId> {
        let idx = self.segments.partition_point(|s| s.end_cycle() <= cycle);
        self.segments
            .get(idx)
            .filter(|s| s.contains(cycle))
            .map(|s| &s.process_id)
    }

    /// Replay the timeline one cycle at a time, from cycle 0 to the
    /// makespan. Idle cycles yield a slot with no process.
    pub fn cycles(&self) -> Cycles<'_> {
        Cycles {
            segments: &self.segments,
            end: self.end_cycle(),
            cycle: 0,
            seg_idx: 0,
        }
    }

    /// Check the structural guarantees every policy must uphold: segments
    /// are positive-length, chronological and non-overlapping, reference
    /// registered processes, and each process executes exactly its burst.
    pub fn check_invariants(&self, processes: &ProcessSet) -> Result<()> {
        if let Some(seg) = self
            .segments
            .iter()
            .find(|s| processes.get(&s.process_id).is_none())
        {
            return Err(SimError::UnknownProcess(seg.process_id.clone()));
        }
        self.check_order()?;
        for p in processes {
            let ran = self.total_runtime(&p.id);
            if ran != p.burst_time {
                return Err(SimError::InvariantViolation(format!(
                    "process {} executed {ran} cycles, burst is {}",
                    p.id, p.burst_time
                )));
            }
            if let Some(start) = self.first_start(&p.id) {
                if start < p.arrival_time {
                    return Err(SimError::InvariantViolation(format!(
                        "process {} starts at {start} before arriving at {}",
                        p.id, p.arrival_time
                    )));
                }
            }
        }
        Ok(())
    }

    /// Check that segments are non-empty, in chronological order and
    /// non-overlapping. Timelines built from arbitrary segments (via
    /// `collect()` or deserialization) must pass this before their
    /// per-process queries are trusted.
    pub fn check_order(&self) -> Result<()> {
        let mut prev_end = 0;
        for seg in &self.segments {
            if seg.duration == 0 {
                return Err(SimError::InvariantViolation(format!(
                    "zero-length segment for {} at cycle {}",
                    seg.process_id, seg.start_cycle
                )));
            }
            if seg.start_cycle < prev_end {
                return Err(SimError::InvariantViolation(format!(
                    "segment for {} at cycle {} starts before the previous one ends at {prev_end}",
                    seg.process_id, seg.start_cycle
                )));
            }
            prev_end = seg.end_cycle();
        }
        Ok(())
    }

    /// Pretty-print the timeline for debugging.
    pub fn dump(&self) {
        for seg in &self.segments {
            eprintln!(
                "[{:>6}..{:<6}] {:<8} ({} cycles)",
                seg.start_cycle,
                seg.end_cycle(),
                seg.process_id,
                seg.duration
            );
        }
    }

    fn segments_of<'a>(
        &'a self,
        pid: &'a ProcessId,
    ) -> impl Iterator<Item = &'a ExecutionSegment> + 'a {
        self.segments.iter().filter(move |s| s.process_id == *pid)
    }
}

impl FromIterator<ExecutionSegment> for Timeline {
    fn from_iter<I: IntoIterator<Item = ExecutionSegment>>(iter: I) -> Self {
        Timeline {
            segments: iter.into_iter().collect(),
        }
    }
}

/// One cycle of a replayed timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSlot<'a> {
    pub cycle: Cycle,
    /// The process on the CPU, or `None` when idle.
    pub process: Option<&'a ProcessId>,
}

/// Iterator returned by [`Timeline::cycles`].
pub struct Cycles<'a> {
    segments: &'a [ExecutionSegment],
    end: Cycle,
    cycle: Cycle,
    seg_idx: usize,
}

impl<'a> Iterator for Cycles<'a> {
    type Item = CycleSlot<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cycle >= self.end {
            return None;
        }
        while self
            .segments
            .get(self.seg_idx)
            .is_some_and(|s| s.end_cycle() <= self.cycle)
        {
            self.seg_idx += 1;
        }
        let process = self
            .segments
            .get(self.seg_idx)
            .filter(|s| s.contains(self.cycle))
            .map(|s| &s.process_id);
        let slot = CycleSlot {
            cycle: self.cycle,
            process,
        };
        self.cycle += 1;
        Some(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> ProcessId {
        ProcessId::from(s)
    }

    #[test]
    fn test_run_cycle_merges_continuations() {
        let mut t = Timeline::new();
        t.run_cycle(&pid("A"), 0);
        t.run_cycle(&pid("A"), 1);
        t.run_cycle(&pid("B"), 2);
        t.run_cycle(&pid("A"), 4); // gap: no merge
        assert_eq!(
            t.segments(),
            &[
                ExecutionSegment::new("A", 0, 2),
                ExecutionSegment::new("B", 2, 1),
                ExecutionSegment::new("A", 4, 1),
            ]
        );
        assert_eq!(t.idle_cycles(), 1);
        assert_eq!(t.total_runtime(&pid("A")), 3);
        assert_eq!(t.finish(&pid("A")), Some(5));
    }

    #[test]
    fn test_cycles_replay_includes_idle() {
        let t: Timeline = vec![
            ExecutionSegment::new("A", 1, 2),
            ExecutionSegment::new("B", 3, 1),
        ]
        .into_iter()
        .collect();
        let slots: Vec<Option<&str>> = t.cycles().map(|s| s.process.map(|p| p.as_str())).collect();
        assert_eq!(slots, vec![None, Some("A"), Some("A"), Some("B")]);
        assert_eq!(t.process_at(2), Some(&pid("A")));
        assert_eq!(t.process_at(0), None);
        assert_eq!(t.process_at(9), None);
    }

    #[test]
    fn test_queries_tolerate_unordered_segments() {
        let t: Timeline = vec![
            ExecutionSegment::new("A", 5, 1),
            ExecutionSegment::new("A", 0, 1),
        ]
        .into_iter()
        .collect();
        assert_eq!(t.first_start(&pid("A")), Some(0));
        assert_eq!(t.finish(&pid("A")), Some(6));
        assert_eq!(t.end_cycle(), 6);
        assert_eq!(t.idle_cycles(), 4);
        assert!(matches!(
            t.check_order(),
            Err(SimError::InvariantViolation(_))
        ));

        let overlapping: Timeline = vec![
            ExecutionSegment::new("A", 0, 4),
            ExecutionSegment::new("B", 1, 4),
        ]
        .into_iter()
        .collect();
        assert_eq!(overlapping.idle_cycles(), 0);
        assert!(overlapping.check_order().is_err());
    }

    #[test]
    fn test_zero_length_dispatch_dropped() {
        let mut t = Timeline::new();
        t.push_segment(&pid("A"), 0, 0);
        assert!(t.is_empty());
    }
}
