use std::io::Write;

use cyclesim::config::{self, Config};
use cyclesim::{Policy, PolicyKind, SyncMode};

#[test]
fn test_default_config() {
    let config = config::default_config();
    assert_eq!(config, Config::default());
    assert_eq!(config.schedule.policies, PolicyKind::ALL.to_vec());
    assert_eq!(config.schedule.quantum, 2);
    assert_eq!(config.schedule.aging_interval, 5);
    assert_eq!(config.sync.mode, SyncMode::Mutex);
    assert_eq!(config.sync.watchdog(), Some(100_000));
}

#[test]
fn test_parse_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[schedule]\npolicies = [\"srt\", \"rr\"]\nquantum = 4\n\n[sync]\nmode = \"semaphore\""
    )
    .unwrap();

    let config = config::parse_config_file(file.path()).unwrap();
    assert_eq!(
        config.schedule.policies(),
        vec![Policy::Srt, Policy::RoundRobin { quantum: 4 }]
    );
    assert_eq!(config.sync.mode, SyncMode::Semaphore);
    assert_eq!(config.sync.max_cycles, 100_000);
}

#[test]
fn test_unknown_keys_are_rejected() {
    assert!(config::parse_config_content("[schedule]\nquantun = 4\n").is_err());
    assert!(config::parse_config_content("[sync]\nmode = \"spinlock\"\n").is_err());
}
