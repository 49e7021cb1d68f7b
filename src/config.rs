//! TOML run configuration.
//!
//! ```toml
//! [schedule]
//! policies = ["fifo", "rr", "priority"]
//! quantum = 3
//! aging_interval = 4
//!
//! [sync]
//! mode = "semaphore"
//! max_cycles = 500
//! ```
//!
//! Every key is optional. Command-line flags and `CYCLESIM_*` environment
//! variables take precedence over the file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::policy::{Policy, PolicyKind, DEFAULT_AGING_INTERVAL, DEFAULT_QUANTUM};
use crate::resource::SyncMode;
use crate::scenario::DEFAULT_MAX_CYCLES;
use crate::types::Cycle;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub schedule: ScheduleConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    pub policies: Vec<PolicyKind>,
    pub quantum: Cycle,
    pub aging_interval: Cycle,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            policies: PolicyKind::ALL.to_vec(),
            quantum: DEFAULT_QUANTUM,
            aging_interval: DEFAULT_AGING_INTERVAL,
        }
    }
}

impl ScheduleConfig {
    /// Selected policies with their parameters filled in.
    pub fn policies(&self) -> Vec<Policy> {
        self.policies
            .iter()
            .map(|k| k.with_params(self.quantum, self.aging_interval))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    pub mode: SyncMode,
    /// Longest queue wait before a run is unsatisfiable; 0 disables the
    /// watchdog.
    pub max_cycles: Cycle,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            mode: SyncMode::Mutex,
            max_cycles: DEFAULT_MAX_CYCLES,
        }
    }
}

impl SyncConfig {
    pub fn watchdog(&self) -> Option<Cycle> {
        (self.max_cycles > 0).then_some(self.max_cycles)
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn parse_config_file(path: &Path) -> Result<Config> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_config_content(&content).with_context(|| format!("parsing {}", path.display()))
}

pub fn parse_config_content(content: &str) -> Result<Config> {
    if content.trim().is_empty() {
        anyhow::bail!("The config file is empty!");
    }
    let config: Config = toml::from_str(content)?;
    if config.schedule.policies.is_empty() {
        anyhow::bail!("schedule.policies must name at least one policy");
    }
    for policy in config.schedule.policies() {
        policy.validate()?;
    }
    Ok(config)
}
