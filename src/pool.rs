use std::{
    sync::{
        Arc, Mutex, Once,
        atomic::{AtomicBool, Ordering},
    },
    thread::JoinHandle,
    time::Duration,
};

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::debug;

use crate::{WorkerReport, console::Console, safe_lock, worker};

// Everything a worker can reach: the stop flag, the configured run duration,
// and the guarded console. Never mutated after construction except the flag.
pub(crate) struct Shared {
    stop: AtomicBool,
    pub(crate) run_for: Option<Duration>,
    pub(crate) console: Console,
}

impl Shared {
    pub(crate) fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub(crate) fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

/// A pool of stress workers, one OS thread each.
///
/// The pool spawns every worker up front ([`start`](Self::start)), lets them
/// spin, and joins them all ([`wait`](Self::wait)). There is no task queue and
/// no redistribution: every worker runs the same loop until the shared stop
/// flag is set, either by the first worker past the configured duration or by
/// an explicit [`stop`](Self::stop).
pub struct StressPool {
    shared: Arc<Shared>,
    workers: usize,
    handles: Mutex<Vec<JoinHandle<()>>>,
    report_sender: Mutex<Option<Sender<WorkerReport>>>,
    report_receiver: Receiver<WorkerReport>,
    start_once: Once,
}

impl StressPool {
    /// Creates a pool of `workers` workers. `run_for == None` means the
    /// workers spin until [`stop`](Self::stop) is called.
    ///
    /// `workers` must be greater than 0! If `workers == 0` we panic.
    pub fn new(workers: usize, run_for: Option<Duration>) -> Self {
        Self::with_console(workers, run_for, Console::stdout())
    }

    /// Creates a pool with one worker per hardware execution context, or a
    /// single worker if the host cannot report a count.
    pub fn with_hardware_workers(run_for: Option<Duration>) -> Self {
        Self::new(crate::hardware_workers(), run_for)
    }

    pub(crate) fn with_console(
        workers: usize,
        run_for: Option<Duration>,
        console: Console,
    ) -> Self {
        assert!(workers > 0, "workers must be greater than 0");

        let (report_sender, report_receiver) = unbounded();

        Self {
            shared: Arc::new(Shared {
                stop: AtomicBool::new(false),
                run_for,
                console,
            }),
            workers,
            handles: Vec::new().into(),
            report_sender: Some(report_sender).into(),
            report_receiver,
            start_once: Once::new(),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Spawns every worker. Calling this more than once is a no-op.
    pub fn start(&self) {
        self.start_once.call_once(|| {
            let sender = match safe_lock(&self.report_sender).take() {
                Some(sender) => sender,
                None => return,
            };

            debug!("spawning {} workers", self.workers);
            let mut handles = safe_lock(&self.handles);
            for id in 0..self.workers {
                handles.push(worker::spawn(id, Arc::clone(&self.shared), sender.clone()));
            }
            // The pool's own sender drops here; workers hold the only clones.
        });
    }

    /// Sets the shared stop flag, ending every worker's loop at its next
    /// top-of-loop check. Idempotent — the flag only ever goes to `true`.
    pub fn stop(&self) {
        self.shared.request_stop();
    }

    /// Blocks until every worker has exited its loop, then prints the final
    /// completion line and returns one report per worker, ordered by id.
    ///
    /// With no configured duration this blocks until someone calls
    /// [`stop`](Self::stop). A second call returns nothing and prints nothing.
    pub fn wait(&self) -> Vec<WorkerReport> {
        let handles: Vec<JoinHandle<()>> = safe_lock(&self.handles).drain(..).collect();
        if handles.is_empty() {
            return Vec::new();
        }

        // Join after releasing the handle lock.
        for handle in handles {
            let _ = handle.join();
        }

        // Every worker sent its report before exiting, so the channel holds
        // all of them by now.
        let mut reports: Vec<WorkerReport> = self.report_receiver.try_iter().collect();
        reports.sort_by_key(|report| report.id);

        self.shared.console.all_completed();
        debug!("all {} workers joined", reports.len());
        reports
    }

    /// Spawns the workers and blocks until they are all done.
    pub fn run(&self) -> Vec<WorkerReport> {
        self.start();
        self.wait()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        thread,
        time::{Duration, Instant},
    };

    use crate::{
        console::{CaptureBuf, Console},
        hardware_workers,
    };

    use super::StressPool;

    fn capture_pool(workers: usize, run_for: Option<Duration>) -> (StressPool, CaptureBuf) {
        let buf = CaptureBuf::default();
        let console = Console::with_writer(Box::new(buf.clone()));
        (StressPool::with_console(workers, run_for, console), buf)
    }

    #[test]
    fn test_timed_run_completes() {
        let run_for = Duration::from_millis(200);
        let (pool, _buf) = capture_pool(2, Some(run_for));

        let start = Instant::now();
        let reports = pool.run();

        assert!(
            start.elapsed() >= run_for,
            "pool finished before its configured duration"
        );
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].id, 0);
        assert_eq!(reports[1].id, 1);
        assert!(reports.iter().all(|report| report.iterations > 0));
    }

    #[test]
    fn test_unbounded_run_has_no_internal_deadline() {
        let (pool, _buf) = capture_pool(1, None);
        pool.start();

        thread::sleep(Duration::from_millis(100));
        // Nothing asked the pool to stop, so no worker may have set the flag.
        assert!(!pool.shared.stop_requested());

        pool.stop();
        let reports = pool.wait();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].iterations > 0);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (pool, _buf) = capture_pool(2, None);
        pool.start();
        pool.stop();
        pool.stop();

        let reports = pool.wait();
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn test_wait_after_run_returns_nothing() {
        let (pool, buf) = capture_pool(1, Some(Duration::from_millis(50)));

        let first = pool.run();
        assert_eq!(first.len(), 1);

        let second = pool.wait();
        assert!(second.is_empty());
        // The final line must not repeat either.
        assert_eq!(buf.contents().matches("All threads completed.").count(), 1);
    }

    #[test]
    fn test_wait_before_start_returns_nothing() {
        let (pool, buf) = capture_pool(3, None);
        assert!(pool.wait().is_empty());
        assert_eq!(buf.contents(), "");
    }

    #[test]
    #[should_panic]
    fn test_zero_workers_panics() {
        let _ = StressPool::new(0, None);
    }

    #[test]
    fn test_hardware_workers_at_least_one() {
        assert!(hardware_workers() >= 1);
    }

    #[test]
    fn test_output_line_protocol() {
        let workers = 2;
        let (pool, buf) = capture_pool(workers, Some(Duration::from_millis(250)));
        pool.run();

        let output = buf.contents();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            *lines.last().expect("at least the final line"),
            "All threads completed."
        );
        assert_eq!(output.matches("All threads completed.").count(), 1);

        for id in 0..workers {
            let completed_prefix = format!("Thread {id} completed: Total iterations = ");
            let completed_at: Vec<usize> = lines
                .iter()
                .enumerate()
                .filter(|(_, line)| line.starts_with(&completed_prefix))
                .map(|(index, _)| index)
                .collect();
            assert_eq!(
                completed_at.len(),
                1,
                "worker {id} must complete exactly once"
            );

            // Progress counts are positive multiples of 1000, strictly
            // increasing, and all precede the completion line.
            let progress_prefix = format!("Thread {id}: Iterations = ");
            let mut last_count = 0;
            for (index, line) in lines.iter().enumerate() {
                if let Some(rest) = line.strip_prefix(&progress_prefix) {
                    let count: u64 = rest.parse().expect("progress count parses");
                    assert!(count > 0 && count % 1000 == 0);
                    assert!(count > last_count);
                    assert!(index < completed_at[0]);
                    last_count = count;
                }
            }
        }
    }
}
