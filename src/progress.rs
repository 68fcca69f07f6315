// src/progress.rs
/// Lightweight progress reporting used by long-running operations (create/update).
/// Frontends implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the total number of steps.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called when one step completes (scrape, load, merge, ...).
    fn item_done(&mut self, _step: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Collects every call as a line; handy in tests and for replaying a run.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub lines: Vec<String>,
}

impl Progress for RecordingProgress {
    fn begin(&mut self, total: usize) {
        self.lines.push(format!("begin {total}"));
    }

    fn log(&mut self, msg: &str) {
        self.lines.push(s!(msg));
    }

    fn item_done(&mut self, step: &str) {
        self.lines.push(format!("done {step}"));
    }

    fn finish(&mut self) {
        self.lines.push(s!("finish"));
    }
}
