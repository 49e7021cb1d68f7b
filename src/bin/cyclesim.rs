//! cyclesim - Run scheduling and synchronization simulations from record files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use cyclesim::config::{self, Config};
use cyclesim::export;
use cyclesim::records::{self, Parsed};
use cyclesim::{
    compare, Cycle, ExitKind, PolicyKind, ProcessSet, ScheduleReport, SimFormat, SyncMode,
    SyncReport, SyncScenario, SyncSimulator,
};

/// Run CPU scheduling and resource synchronization simulations.
#[derive(Parser)]
#[command(name = "cyclesim", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Schedule a process file under one or more CPU policies.
    Schedule(ScheduleArgs),
    /// Simulate resource contention for an action file.
    Sync(SyncArgs),
}

/// Output options shared by both subcommands.
#[derive(Args)]
struct OutputArgs {
    /// TOML configuration file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the full report as JSON.
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Write a CSV table (per-process metrics or per-cycle history).
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Print the raw timeline or history to stderr.
    #[arg(long)]
    dump: bool,
}

#[derive(Args)]
struct ScheduleArgs {
    /// Process records: `PID, BurstTime, ArrivalTime, Priority`.
    processes: PathBuf,

    /// Policy to run; repeat for several. Defaults to the configured list.
    #[arg(short, long, value_enum)]
    policy: Vec<PolicyKind>,

    /// Round-Robin quantum in cycles.
    #[arg(short, long, env = "CYCLESIM_QUANTUM")]
    quantum: Option<Cycle>,

    /// Waiting cycles between priority boosts.
    #[arg(long, env = "CYCLESIM_AGING_INTERVAL")]
    aging_interval: Option<Cycle>,

    /// Also write execution segments as CSV.
    #[arg(long, value_name = "PATH")]
    segments_csv: Option<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct SyncArgs {
    /// Process records: `PID, BurstTime, ArrivalTime, Priority`.
    processes: PathBuf,

    /// Resource records: `Name, Capacity`.
    resources: PathBuf,

    /// Action records: `PID, READ|WRITE, ResourceName, RequestCycle`.
    actions: PathBuf,

    /// Synchronization mode.
    #[arg(short, long, value_enum, env = "CYCLESIM_MODE")]
    mode: Option<SyncMode>,

    /// Declare the run unsatisfiable after this many cycles (0 disables).
    #[arg(long, env = "CYCLESIM_MAX_CYCLES")]
    max_cycles: Option<Cycle>,

    #[command(flatten)]
    output: OutputArgs,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match &cli.command {
        Command::Schedule(args) => run_schedule(args),
        Command::Sync(args) => run_sync(args),
    };
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => config::parse_config_file(path),
        None => Ok(config::default_config()),
    }
}

/// Surface the skipped-row count and unwrap the records.
fn report_skipped<T>(parsed: Parsed<T>, path: &Path) -> Vec<T> {
    if parsed.has_skipped() {
        warn!(
            file = %path.display(),
            skipped = parsed.skipped.len(),
            "some records were skipped"
        );
    }
    parsed.records
}

fn load_processes(path: &Path) -> Result<ProcessSet> {
    let parsed = records::load_processes(path)
        .with_context(|| format!("reading processes from {}", path.display()))?;
    let processes = report_skipped(parsed, path);
    ProcessSet::new(processes).with_context(|| format!("loading {}", path.display()))
}

fn run_schedule(args: &ScheduleArgs) -> Result<()> {
    let mut config = load_config(args.output.config.as_deref())?;
    if !args.policy.is_empty() {
        config.schedule.policies = args.policy.clone();
    }
    if let Some(q) = args.quantum {
        config.schedule.quantum = q;
    }
    if let Some(n) = args.aging_interval {
        config.schedule.aging_interval = n;
    }

    let processes = load_processes(&args.processes)?;
    info!(processes = processes.len(), "loaded process set");

    let reports = compare(&config.schedule.policies(), &processes)?;
    for report in &reports {
        print_schedule(report);
        if args.output.dump {
            report.timeline.dump();
        }
    }

    if let Some(path) = &args.output.json {
        export::write_json_file(path, &reports)?;
    }
    if let Some(path) = &args.output.csv {
        export::to_file(path, |w| export::write_metrics_csv(w, &reports))?;
    }
    if let Some(path) = &args.segments_csv {
        export::to_file(path, |w| export::write_segments_csv(w, &reports))?;
    }
    Ok(())
}

fn print_schedule(report: &ScheduleReport) {
    let preemption = if report.policy.is_preemptive() {
        "preemptive"
    } else {
        "non-preemptive"
    };
    println!("== {} ({preemption}) ==", report.policy);
    let segments: Vec<String> = report
        .timeline
        .segments()
        .iter()
        .map(|s| format!("{}@{}..{}", s.process_id, s.start_cycle, s.end_cycle()))
        .collect();
    println!("  timeline: {}", segments.join(" "));
    println!(
        "  {:<8} {:>10} {:>10} {:>10} {:>10}",
        "pid", "completion", "turnaround", "response", "waiting"
    );
    for m in &report.metrics.processes {
        println!(
            "  {:<8} {:>10} {:>10} {:>10} {:>10}",
            m.process_id.as_str(),
            m.completion_time,
            m.turnaround_time,
            m.response_time,
            m.waiting_time
        );
    }
    print!("{}", report.metrics.summary);
    println!("  utilization:    {:>8.2}", report.metrics.utilization());
}

fn run_sync(args: &SyncArgs) -> Result<()> {
    let mut config = load_config(args.output.config.as_deref())?;
    if let Some(mode) = args.mode {
        config.sync.mode = mode;
    }
    if let Some(max) = args.max_cycles {
        config.sync.max_cycles = max;
    }

    let processes = load_processes(&args.processes)?;
    let resources = records::load_resources(&args.resources)
        .with_context(|| format!("reading resources from {}", args.resources.display()))?;
    let actions = records::load_actions(&args.actions)
        .with_context(|| format!("reading actions from {}", args.actions.display()))?;

    let scenario = SyncScenario::builder()
        .mode(config.sync.mode)
        .max_cycles(config.sync.watchdog())
        .processes(processes)
        .resources(report_skipped(resources, &args.resources))
        .actions(report_skipped(actions, &args.actions))
        .build()?;

    let mut sim = SyncSimulator::new(scenario)?;
    let declared: Vec<String> = sim
        .arbiter()
        .resources()
        .map(|r| format!("{}({})", r.name, r.capacity))
        .collect();
    info!(resources = %declared.join(" "), "declared resources");
    let report = sim.run_to_end()?;
    print_sync(&report);
    if args.output.dump {
        report.history.dump();
    }

    if let Some(path) = &args.output.json {
        export::write_json_file(path, &report)?;
    }
    if let Some(path) = &args.output.csv {
        export::to_file(path, |w| export::write_history_csv(w, &report.history))?;
    }
    Ok(())
}

fn print_sync(report: &SyncReport) {
    println!("== sync ({}) ==", report.mode);
    for state in report.history.states() {
        if state.accessed.is_empty() && state.waiting.is_empty() {
            continue;
        }
        let names = |list: &[cyclesim::ActionRecord]| -> String {
            list.iter()
                .map(|r| format!("{}:{}:{}", r.process_id, r.verb, r.resource))
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!(
            "  cycle {:>4}  accessed [{}]  waiting [{}]",
            state.cycle,
            names(&state.accessed),
            names(&state.waiting)
        );
    }
    let s = &report.summary;
    println!(
        "  completed {}/{} in {} cycles, {} contended, avg wait {:.2}, max wait {}",
        s.completed, s.total_actions, s.cycles, s.contended, s.avg_wait, s.max_wait
    );
    match &report.exit {
        ExitKind::Completed { .. } => {}
        ExitKind::Unsatisfiable {
            cycle,
            waiting,
            reason,
        } => println!(
            "  warning: unsatisfiable at cycle {cycle} ({reason:?}), {} action(s) still waiting",
            waiting.len()
        ),
        ExitKind::Aborted { cycle, reason } => {
            println!("  aborted at cycle {cycle}: {reason}")
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .event_format(SimFormat)
        .try_init();
}
