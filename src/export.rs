//! JSON and CSV writers for simulation results.
//!
//! JSON is the full report structure. CSV is flattened into one row per
//! segment, per process or per history event so it loads straight into a
//! spreadsheet or a dataframe.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::history::{ActionRecord, SyncHistory};
use crate::metrics::ScheduleReport;
use crate::types::Cycle;

/// Write `value` as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value).context("serializing JSON")?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_json(BufWriter::new(file), value)
}

#[derive(Serialize)]
struct SegmentRow<'a> {
    policy: String,
    process_id: &'a str,
    start_cycle: Cycle,
    duration: Cycle,
    end_cycle: Cycle,
}

/// One row per execution segment, tagged with its policy.
pub fn write_segments_csv<W: Write>(writer: W, reports: &[ScheduleReport]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for report in reports {
        let policy = report.policy.to_string();
        for seg in report.timeline.segments() {
            wtr.serialize(SegmentRow {
                policy: policy.clone(),
                process_id: seg.process_id.as_str(),
                start_cycle: seg.start_cycle,
                duration: seg.duration,
                end_cycle: seg.end_cycle(),
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct MetricsRow<'a> {
    policy: String,
    process_id: &'a str,
    arrival_time: Cycle,
    burst_time: Cycle,
    first_start: Cycle,
    finish: Cycle,
    completion_time: Cycle,
    turnaround_time: Cycle,
    response_time: Cycle,
    waiting_time: Cycle,
}

/// One row per process and policy.
pub fn write_metrics_csv<W: Write>(writer: W, reports: &[ScheduleReport]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for report in reports {
        let policy = report.policy.to_string();
        for m in &report.metrics.processes {
            wtr.serialize(MetricsRow {
                policy: policy.clone(),
                process_id: m.process_id.as_str(),
                arrival_time: m.arrival_time,
                burst_time: m.burst_time,
                first_start: m.first_start,
                finish: m.finish,
                completion_time: m.completion_time,
                turnaround_time: m.turnaround_time,
                response_time: m.response_time,
                waiting_time: m.waiting_time,
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct HistoryRow<'a> {
    cycle: Cycle,
    event: &'static str,
    action: usize,
    process_id: &'a str,
    verb: String,
    resource: &'a str,
}

/// One row per (cycle, event, action). Events per cycle are listed in
/// simulation order: `released`, `accessed`, `queued`, then `waiting`.
pub fn write_history_csv<W: Write>(writer: W, history: &SyncHistory) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for state in history.states() {
        let events: [(&'static str, &[ActionRecord]); 4] = [
            ("released", &state.released),
            ("accessed", &state.accessed),
            ("queued", &state.queued),
            ("waiting", &state.waiting),
        ];
        for (event, records) in events {
            for r in records {
                wtr.serialize(HistoryRow {
                    cycle: state.cycle,
                    event,
                    action: r.action.0,
                    process_id: r.process_id.as_str(),
                    verb: r.verb.to_string(),
                    resource: &r.resource,
                })?;
            }
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Create `path` and hand a buffered writer to `write`.
pub fn to_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(BufWriter<File>) -> Result<()>,
{
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write(BufWriter::new(file)).with_context(|| format!("writing {}", path.display()))
}
