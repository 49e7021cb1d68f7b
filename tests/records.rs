mod common;

use std::io::Write;

use common::setup_test;
use cyclesim::records;
use cyclesim::*;

fn write_tmp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_files_into_a_sync_run() {
    setup_test();
    let procs = write_tmp("# PID, BT, AT, Priority\nP1, 3, 0, 1\nP2, 2, 1, 2\n");
    let res = write_tmp("R1, 1\n");
    let acts = write_tmp("P1, READ, R1, 0\nP2, WRITE, R1, 0\n");

    let processes = records::load_processes(procs.path()).unwrap();
    let resources = records::load_resources(res.path()).unwrap();
    let actions = records::load_actions(acts.path()).unwrap();
    assert!(!processes.has_skipped());

    let scenario = SyncScenario::builder()
        .processes(ProcessSet::new(processes.records).unwrap())
        .resources(resources.records)
        .actions(actions.records)
        .build()
        .unwrap();
    let report = SyncSimulator::new(scenario).unwrap().run_to_end().unwrap();
    assert!(report.exit.is_completed());
}

#[test]
fn test_skipped_rows_are_counted() {
    setup_test();
    let input = "\
P1, 5, 0, 2
P2, five, 0, 1
# a comment
P3, 2, 1
P4, 1, 0, -3
";
    let parsed = records::parse_processes(input);
    assert_eq!(parsed.records.len(), 2);
    assert_eq!(parsed.records[1].priority, -3);
    let lines: Vec<u64> = parsed.skipped.iter().map(|s| s.line).collect();
    assert_eq!(lines, vec![2, 4]);
}

#[test]
fn test_action_for_unregistered_process_is_rejected() {
    let processes = ProcessSet::new(records::parse_processes("P1, 1, 0, 1\n").records).unwrap();
    let actions = records::parse_actions("P2, READ, R, 0\n").records;
    let err = SyncScenario::builder()
        .processes(processes)
        .actions(actions)
        .build()
        .unwrap_err();
    assert_eq!(err, SimError::UnknownProcess("P2".into()));
}

#[test]
fn test_missing_file_is_io_error() {
    assert!(records::load_actions("/nonexistent/cyclesim/actions.txt").is_err());
}
