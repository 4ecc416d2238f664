use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use log::{debug, info};
use scorch::StressPool;

/// scorch: a multi-threaded CPU stress tester.
///
/// Spawns one worker per hardware thread. Each worker spins on a fixed block
/// of transcendental floating-point work, printing a progress line every 1000
/// iterations and a per-worker total when it stops.
///
/// Without --run-for-seconds (or with a value of 0) the workers run until the
/// process is interrupted from outside.
#[derive(Debug, Parser)]
struct Opts {
    /// How many seconds to run before stopping. 0 means run until externally
    /// interrupted.
    #[clap(long, default_value = "0")]
    run_for_seconds: u64,

    /// Enable verbose output. Specify multiple times to increase verbosity.
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    let llv = match opts.verbose {
        0 => simplelog::LevelFilter::Warn,
        1 => simplelog::LevelFilter::Info,
        _ => simplelog::LevelFilter::Debug,
    };
    let mut lcfg = simplelog::ConfigBuilder::new();
    lcfg.set_time_level(simplelog::LevelFilter::Error)
        .set_location_level(simplelog::LevelFilter::Off)
        .set_target_level(simplelog::LevelFilter::Off)
        .set_thread_level(simplelog::LevelFilter::Off);
    // Diagnostics go to stderr; stdout carries only the worker output lines.
    simplelog::TermLogger::init(
        llv,
        lcfg.build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let run_for = match opts.run_for_seconds {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    let pool = StressPool::with_hardware_workers(run_for);
    info!(
        "spawning {} workers ({})",
        pool.worker_count(),
        match run_for {
            Some(run_for) => format!("running for {run_for:?}"),
            None => "running until interrupted".to_string(),
        }
    );

    let reports = pool.run();
    debug!(
        "total iterations across all workers: {}",
        reports.iter().map(|report| report.iterations).sum::<u64>()
    );

    Ok(())
}
