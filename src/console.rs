use std::{
    fmt,
    io::{self, Write},
    sync::Mutex,
};

use crate::safe_lock;

// The shared output sink. Workers and the driver all print through this one
// lock; the guard spans exactly one line write, so concurrent workers cannot
// interleave partial lines.
pub(crate) struct Console {
    out: Mutex<Box<dyn Write + Send>>,
}

impl Console {
    pub(crate) fn stdout() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub(crate) fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub(crate) fn progress(&self, id: usize, iterations: u64) {
        self.line(format_args!("Thread {id}: Iterations = {iterations}"));
    }

    pub(crate) fn completed(&self, id: usize, iterations: u64) {
        self.line(format_args!(
            "Thread {id} completed: Total iterations = {iterations}"
        ));
    }

    pub(crate) fn all_completed(&self) {
        self.line(format_args!("All threads completed."));
    }

    fn line(&self, args: fmt::Arguments<'_>) {
        let mut out = safe_lock(&self.out);
        let _ = writeln!(out, "{args}");
        // Flush per line so progress is visible while the workers spin.
        let _ = out.flush();
    }
}

// Write sink that keeps everything written, so tests can read the output back.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct CaptureBuf {
    inner: std::sync::Arc<Mutex<Vec<u8>>>,
}

#[cfg(test)]
impl CaptureBuf {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8(safe_lock(&self.inner).clone()).expect("console output is utf8")
    }
}

#[cfg(test)]
impl Write for CaptureBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        safe_lock(&self.inner).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
