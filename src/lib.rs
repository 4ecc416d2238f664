//! A multi-threaded CPU stress driver. [`StressPool`] spawns one worker per
//! hardware thread (or however many you ask for), and every worker spins on a
//! fixed block of transcendental floating-point work until it is told to stop,
//! tracking its own iteration count along the way.
//!
//! Workers report progress on stdout every 1000 iterations and print a final
//! per-worker total when they exit. All console output goes through a single
//! shared lock, so lines from concurrent workers never interleave.
//!
//! # Examples
//!
//! ## Timed run
//!
//! Give the pool a duration and every worker stops once the first of them
//! observes that much wall-clock time has passed.
//!
//! ```rust
//! use scorch::StressPool;
//! use std::time::Duration;
//!
//! // One worker per hardware thread, stopping after 100ms.
//! let pool = StressPool::with_hardware_workers(Some(Duration::from_millis(100)));
//! let reports = pool.run();
//!
//! assert_eq!(reports.len(), pool.worker_count());
//! ```
//!
//! ## Unbounded run
//!
//! With no duration the workers spin until someone calls [`StressPool::stop`].
//! The stop flag is shared and idempotent, so it is fine to call it from any
//! thread, any number of times.
//!
//! ```rust
//! use scorch::StressPool;
//! use std::{thread, time::Duration};
//!
//! let pool = StressPool::new(2, None);
//! pool.start();
//!
//! thread::sleep(Duration::from_millis(50));
//! pool.stop();
//!
//! let reports = pool.wait();
//! assert!(reports.iter().all(|report| report.iterations > 0));
//! ```

mod console;
mod pool;
mod worker;

pub mod compute;

pub use pool::StressPool;

use std::{
    sync::{Mutex, MutexGuard},
    thread,
};

/// What a worker hands back when its loop exits: its identifier and how many
/// passes over the compute block it completed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerReport {
    pub id: usize,
    pub iterations: u64,
}

/// The number of hardware execution contexts available to this process.
/// Falls back to a single worker when the host cannot report a count.
pub fn hardware_workers() -> usize {
    thread::available_parallelism()
        .map(|parallelism| parallelism.get())
        .unwrap_or(1)
}

// One-liner that allows us to easily lock a Mutex while handling possible poison.
pub(crate) fn safe_lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
