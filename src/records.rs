//! Loader for the comma-separated record formats.
//!
//! ```text
//! # processes: PID, BurstTime, ArrivalTime, Priority
//! P1, 5, 0, 2
//! # resources: Name, Capacity
//! R1, 1
//! # actions: PID, READ|WRITE, ResourceName, RequestCycle
//! P1, READ, R1, 0
//! ```
//!
//! Whitespace around fields is trimmed, and blank lines and `#` comment
//! lines are ignored. Malformed rows are skipped with a warning and
//! reported in [`Parsed::skipped`] so the caller can surface the count.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::warn;

use crate::action::{Action, Verb};
use crate::error::{Result, SimError};
use crate::process::Process;
use crate::resource::Resource;
use crate::types::Priority;

/// A row that was dropped during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the input.
    pub line: u64,
    pub reason: String,
}

/// Records parsed from one input, plus the rows that were skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<T> {
    pub records: Vec<T>,
    pub skipped: Vec<SkippedRow>,
}

impl<T> Parsed<T> {
    pub fn has_skipped(&self) -> bool {
        !self.skipped.is_empty()
    }

    /// Fail on the first skipped row instead of recovering from it.
    pub fn into_result_strict(self) -> Result<Vec<T>> {
        match self.skipped.into_iter().next() {
            Some(row) => Err(SimError::InvalidRecord {
                line: row.line,
                reason: row.reason,
            }),
            None => Ok(self.records),
        }
    }
}

#[derive(Deserialize)]
struct ProcessRow {
    id: String,
    burst_time: i64,
    arrival_time: i64,
    priority: Priority,
}

#[derive(Deserialize)]
struct ResourceRow {
    name: String,
    capacity: i64,
}

#[derive(Deserialize)]
struct ActionRow {
    pid: String,
    verb: Verb,
    resource: String,
    request_cycle: i64,
}

/// Parse process rows. Negative times and repeated ids are skipped.
pub fn parse_processes(input: &str) -> Parsed<Process> {
    let mut seen = HashSet::new();
    parse_rows(input, 4, |row: ProcessRow| {
        let burst = non_negative("burst time", row.burst_time)?;
        let arrival = non_negative("arrival time", row.arrival_time)?;
        if row.id.is_empty() {
            return Err("empty process id".to_string());
        }
        if !seen.insert(row.id.clone()) {
            return Err(format!("duplicate process id {:?}", row.id));
        }
        Ok(Process::new(row.id, burst, arrival, row.priority))
    })
}

/// Parse resource rows. Capacity must be at least 1.
pub fn parse_resources(input: &str) -> Parsed<Resource> {
    let mut seen = HashSet::new();
    parse_rows(input, 2, |row: ResourceRow| {
        if row.name.is_empty() {
            return Err("empty resource name".to_string());
        }
        let capacity = u32::try_from(row.capacity)
            .ok()
            .filter(|&c| c >= 1)
            .ok_or_else(|| format!("capacity must be at least 1, got {}", row.capacity))?;
        if !seen.insert(row.name.clone()) {
            return Err(format!("duplicate resource {:?}", row.name));
        }
        Ok(Resource::new(row.name, capacity))
    })
}

/// Parse action rows. The verb is `READ` or `WRITE`; lower-case and
/// capitalized spellings are accepted too.
pub fn parse_actions(input: &str) -> Parsed<Action> {
    parse_rows(input, 4, |row: ActionRow| {
        let cycle = non_negative("request cycle", row.request_cycle)?;
        if row.pid.is_empty() || row.resource.is_empty() {
            return Err("empty process id or resource name".to_string());
        }
        Ok(Action::new(row.pid, row.verb, row.resource, cycle))
    })
}

pub fn load_processes(path: impl AsRef<Path>) -> std::io::Result<Parsed<Process>> {
    Ok(parse_processes(&fs::read_to_string(path)?))
}

pub fn load_resources(path: impl AsRef<Path>) -> std::io::Result<Parsed<Resource>> {
    Ok(parse_resources(&fs::read_to_string(path)?))
}

pub fn load_actions(path: impl AsRef<Path>) -> std::io::Result<Parsed<Action>> {
    Ok(parse_actions(&fs::read_to_string(path)?))
}

fn non_negative(what: &str, value: i64) -> std::result::Result<u64, String> {
    u64::try_from(value).map_err(|_| format!("{what} must not be negative, got {value}"))
}

fn parse_rows<R, T, F>(input: &str, fields: usize, mut convert: F) -> Parsed<T>
where
    R: DeserializeOwned,
    F: FnMut(R) -> std::result::Result<T, String>,
{
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(input.as_bytes());

    let mut parsed = Parsed {
        records: Vec::new(),
        skipped: Vec::new(),
    };
    let mut record = StringRecord::new();
    loop {
        let (line, result) = match reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => (
                record.position().map_or(0, |p| p.line()),
                decode(&record, fields, &mut convert),
            ),
            Err(e) => (
                e.position().map_or(reader.position().line(), |p| p.line()),
                Err(e.to_string()),
            ),
        };
        match result {
            Ok(value) => parsed.records.push(value),
            Err(reason) => {
                warn!(line, %reason, "skipping record");
                parsed.skipped.push(SkippedRow { line, reason });
            }
        }
    }
    parsed
}

fn decode<R, T, F>(
    record: &StringRecord,
    fields: usize,
    convert: &mut F,
) -> std::result::Result<T, String>
where
    R: DeserializeOwned,
    F: FnMut(R) -> std::result::Result<T, String>,
{
    if record.len() != fields {
        return Err(format!("expected {fields} fields, found {}", record.len()));
    }
    let row: R = record.deserialize(None).map_err(|e| e.to_string())?;
    convert(row)
}
