use std::{sync::Arc, thread, time::Instant};

use crossbeam_channel::Sender;
use log::debug;

use crate::{WorkerReport, compute, pool::Shared};

/// A worker prints a progress line every this many loop iterations.
pub(crate) const REPORT_INTERVAL: u64 = 1000;

/// Spawns a new thread that runs the stress loop until the shared stop flag
/// is set. When the pool has a configured duration, the first worker to see
/// its own elapsed time reach it sets the flag for everyone.
pub(crate) fn spawn(
    id: usize,
    shared: Arc<Shared>,
    reports: Sender<WorkerReport>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        debug!("worker {id} started");
        let start = Instant::now();
        let mut iterations: u64 = 0;

        while !shared.stop_requested() {
            compute::burn();
            iterations += 1;

            if let Some(run_for) = shared.run_for {
                if start.elapsed() >= run_for {
                    // Idempotent: every worker past the deadline may store
                    // `true`, the loop check above ends them all.
                    shared.request_stop();
                }
            }

            if iterations % REPORT_INTERVAL == 0 {
                shared.console.progress(id, iterations);
            }
        }

        shared.console.completed(id, iterations);
        let _ = reports.send(WorkerReport { id, iterations });
        debug!("worker {id} exiting after {iterations} iterations");
    })
}
