mod common;

use common::setup_test;
use cyclesim::{scenario, workloads};
use cyclesim::*;

fn run(scenario: SyncScenario) -> SyncReport {
    SyncSimulator::new(scenario).unwrap().run_to_end().unwrap()
}

fn pids(records: &[ActionRecord]) -> Vec<&str> {
    records.iter().map(|r| r.process_id.as_str()).collect()
}

#[test]
fn test_mutex_second_request_waits_one_cycle() {
    setup_test();
    let report = run(SyncScenario::builder()
        .mode(SyncMode::Mutex)
        .resource("R1", 1)
        .action("P1", Verb::Read, "R1", 0)
        .action("P2", Verb::Write, "R1", 0)
        .build()
        .unwrap());

    let c0 = report.history.get(0).unwrap();
    assert_eq!(pids(&c0.accessed), vec!["P1"]);
    assert_eq!(pids(&c0.waiting), vec!["P2"]);
    let c1 = report.history.get(1).unwrap();
    assert_eq!(pids(&c1.released), vec!["P1"]);
    assert_eq!(pids(&c1.accessed), vec!["P2"]);

    assert_eq!(report.exit, ExitKind::Completed { cycles: 2 });
    assert_eq!(report.history.waited(ActionId(1)), Some(1));
}

#[test]
fn test_semaphore_admits_up_to_capacity() {
    setup_test();
    let report = run(SyncScenario::builder()
        .mode(SyncMode::Semaphore)
        .resource("R", 2)
        .actions(workloads::thundering_herd(5, "R", 0))
        .build()
        .unwrap());

    let admitted: Vec<_> = (0..5)
        .map(|i| report.history.admitted_at(ActionId(i)).unwrap())
        .collect();
    assert_eq!(admitted, vec![0, 0, 1, 1, 2]);
    for state in report.history.states() {
        assert!(state.holders_of("R") <= 2);
        let level = &state.levels[0];
        assert!(level.available <= level.capacity);
    }
    assert_eq!(report.summary.contended, 3);
    assert_eq!(report.summary.max_wait, 2);
}

#[test]
fn test_mutex_mode_ignores_declared_capacity() {
    setup_test();
    let report = run(SyncScenario::builder()
        .mode(SyncMode::Mutex)
        .resource("R", 3)
        .action("P1", Verb::Read, "R", 0)
        .action("P2", Verb::Read, "R", 0)
        .build()
        .unwrap());
    assert_eq!(report.history.holders_at(0, "R"), 1);
    assert_eq!(report.history.admitted_at(ActionId(1)), Some(1));
}

#[test]
fn test_queued_requests_keep_fifo_order_ahead_of_newcomers() {
    setup_test();
    // P3 arrives at cycle 1 when R is free again, but P2 has been waiting
    // since cycle 0 and goes first.
    let report = run(SyncScenario::builder()
        .action("P1", Verb::Write, "R", 0)
        .action("P2", Verb::Write, "R", 0)
        .action("P3", Verb::Write, "R", 1)
        .build()
        .unwrap());
    let c1 = report.history.get(1).unwrap();
    assert_eq!(pids(&c1.accessed), vec!["P2"]);
    assert_eq!(pids(&c1.queued), vec!["P3"]);
    assert_eq!(report.history.admitted_at(ActionId(2)), Some(2));
}

#[test]
fn test_same_cycle_requests_admitted_in_input_order() {
    setup_test();
    // Input order wins among equal request cycles even when listed after
    // a later request.
    let report = run(SyncScenario::builder()
        .action("P9", Verb::Read, "R", 3)
        .action("P1", Verb::Read, "R", 0)
        .action("P2", Verb::Read, "R", 0)
        .build()
        .unwrap());
    assert_eq!(report.history.admitted_at(ActionId(1)), Some(0));
    assert_eq!(report.history.admitted_at(ActionId(2)), Some(1));
    assert_eq!(report.history.admitted_at(ActionId(0)), Some(3));
}

#[test]
fn test_independent_resources_do_not_block_each_other() {
    setup_test();
    let report = run(SyncScenario::builder()
        .action("P1", Verb::Read, "A", 0)
        .action("P2", Verb::Read, "B", 0)
        .build()
        .unwrap());
    assert_eq!(pids(&report.history.get(0).unwrap().accessed), vec!["P1", "P2"]);
    assert_eq!(report.summary.contended, 0);
}

#[test]
fn test_step_by_step_matches_run_to_end() {
    setup_test();
    let scenario = SyncScenario::builder()
        .mode(SyncMode::Semaphore)
        .resource("A", 2)
        .resource("B", 1)
        .actions(workloads::random_actions(5, 40, 6, &["A", "B"], 15))
        .build()
        .unwrap();

    let mut stepped = SyncSimulator::new(scenario.clone()).unwrap();
    let mut cycles = 0;
    while let Some(state) = stepped.step().unwrap() {
        assert_eq!(state.cycle, cycles);
        cycles += 1;
    }
    assert!(stepped.is_finished());
    assert!(stepped.step().unwrap().is_none());

    let report = run(scenario);
    assert_eq!(stepped.history(), &report.history);
    assert_eq!(report.history.len() as u64, cycles);
}

#[test]
fn test_every_queued_action_is_admitted_on_completion() {
    setup_test();
    for seed in 0..10 {
        let scenario = SyncScenario::builder()
            .mode(SyncMode::Semaphore)
            .resource("A", 1)
            .resource("B", 3)
            .actions(workloads::random_actions(seed, 60, 8, &["A", "B"], 20))
            .build()
            .unwrap();
        let report = run(scenario);
        assert!(report.exit.is_completed(), "seed {seed}: {:?}", report.exit);
        for r in &report.actions {
            let done = r.completion_cycle.unwrap();
            assert!(done >= r.request_cycle);
        }
        for state in report.history.states() {
            assert!(state.holders_of("A") <= 1);
            assert!(state.holders_of("B") <= 3);
        }
    }
}

#[test]
fn test_watchdog_marks_run_unsatisfiable() {
    setup_test();
    let mut sim = SyncSimulator::new(
        SyncScenario::builder()
            .actions(workloads::thundering_herd(10, "R", 0))
            .max_cycles(Some(4))
            .build()
            .unwrap(),
    )
    .unwrap();
    let report = sim.run_to_end().unwrap();
    match &report.exit {
        ExitKind::Unsatisfiable {
            cycle,
            waiting,
            reason,
        } => {
            assert_eq!(*cycle, 4);
            assert_eq!(waiting.len(), 6);
            assert_eq!(*reason, StallReason::Watchdog);
        }
        other => panic!("unexpected exit {other:?}"),
    }
    assert_eq!(report.summary.completed, 4);
    assert_eq!(
        sim.status(ActionId(9)).unwrap().phase(),
        ActionPhase::Waiting
    );
}

#[test]
fn test_request_after_default_watchdog_bound_completes() {
    setup_test();
    let late = scenario::DEFAULT_MAX_CYCLES + 50_000;
    let report = SyncSimulator::new(
        SyncScenario::builder()
            .action("P1", Verb::Read, "R", 0)
            .action("P2", Verb::Read, "R", late)
            .build()
            .unwrap(),
    )
    .unwrap()
    .run_to_end()
    .unwrap();
    assert_eq!(report.exit, ExitKind::Completed { cycles: late + 1 });
    assert_eq!(report.actions[1].completion_cycle, Some(late));
    assert_eq!(report.summary.max_wait, 0);
}

#[test]
fn test_reset_restores_idle_state() {
    setup_test();
    let scenario = SyncScenario::builder()
        .actions(workloads::thundering_herd(3, "R", 0))
        .build()
        .unwrap();
    let mut sim = SyncSimulator::new(scenario).unwrap();
    sim.step().unwrap();
    sim.reset();
    assert_eq!(sim.state(), &DriverState::Idle);
    assert_eq!(sim.arbiter().available("R"), Some(1));
    assert_eq!(sim.arbiter().total_waiting(), 0);
    assert_eq!(
        sim.status(ActionId(0)).unwrap().phase(),
        ActionPhase::Requested
    );
    let report = sim.run_to_end().unwrap();
    assert_eq!(report.exit, ExitKind::Completed { cycles: 3 });
}

#[test]
fn test_semaphore_unknown_resource_fails_before_first_step() {
    let scenario = SyncScenario::builder()
        .mode(SyncMode::Semaphore)
        .resource("R", 1)
        .action("P1", Verb::Read, "R", 0)
        .action("P2", Verb::Read, "S", 4)
        .build()
        .unwrap();
    assert_eq!(
        SyncSimulator::new(scenario).unwrap_err(),
        SimError::UnknownResource {
            action: ActionId(1),
            resource: "S".into()
        }
    );
}
