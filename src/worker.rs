// src/worker.rs
//! Run a workflow off the caller's thread.
//!
//! The worker owns its inputs and reports over a channel: any number of
//! `Event::Progress` lines, then exactly one `Event::Finished`. Nothing is
//! shared between the two sides, so a UI can poll with
//! [`JobHandle::try_recv`] and a CLI can simply [`JobHandle::wait`].

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::config::options::ConvertOptions;
use crate::error::Error;
use crate::pipeline::{self, RunSummary};
use crate::progress::Progress;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Job {
    /// Scrape `html` into a new workbook at `out`.
    Create { html: PathBuf, out: PathBuf },
    /// Merge a scrape of `html` into `workbook`, writing to `out`.
    Update { html: PathBuf, workbook: PathBuf, out: PathBuf },
}

impl Job {
    pub fn run(&self, opts: &ConvertOptions, progress: Option<&mut dyn Progress>) -> Result<RunSummary, Error> {
        match self {
            Job::Create { html, out } => pipeline::create(html, out, opts, progress),
            Job::Update { html, workbook, out } => pipeline::update(html, workbook, out, opts, progress),
        }
    }
}

#[derive(Debug)]
pub enum Event {
    Progress(String),
    Finished(Result<RunSummary, Error>),
}

pub struct JobHandle {
    rx: Receiver<Event>,
    thread: Option<JoinHandle<()>>,
}

/// Forwards progress calls as `Event::Progress` lines.
struct ChannelProgress {
    tx: Sender<Event>,
}

impl Progress for ChannelProgress {
    fn log(&mut self, msg: &str) {
        let _ = self.tx.send(Event::Progress(s!(msg)));
    }

    fn item_done(&mut self, step: &str) {
        let _ = self.tx.send(Event::Progress(format!("{step}: done")));
    }
}

pub fn spawn(job: Job, options: ConvertOptions) -> JobHandle {
    let (tx, rx) = mpsc::channel::<Event>();

    let thread = thread::spawn(move || {
        let mut progress = ChannelProgress { tx: tx.clone() };
        let result = job.run(&options, Some(&mut progress));
        if let Err(e) = &result {
            loge!("worker: {e}");
        }
        // receiver may be gone; nothing left to tell anyone then
        let _ = tx.send(Event::Finished(result));
    });

    JobHandle { rx, thread: Some(thread) }
}

impl JobHandle {
    /// Next event if one is ready. After `Finished` has been taken this
    /// keeps returning `None`.
    pub fn try_recv(&self) -> Option<Event> {
        match self.rx.try_recv() {
            Ok(ev) => Some(ev),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Block until the job ends, forwarding progress lines to `progress`.
    pub fn wait(mut self, progress: &mut dyn Progress) -> Result<RunSummary, Error> {
        let outcome = loop {
            match self.rx.recv() {
                Ok(Event::Progress(msg)) => progress.log(&msg),
                Ok(Event::Finished(result)) => break result,
                // sender dropped without a result: the worker panicked
                Err(_) => break Err(Error::WorkerLost),
            }
        };
        if let Some(t) = self.thread.take() {
            if t.join().is_err() {
                return Err(Error::WorkerLost);
            }
        }
        outcome
    }
}
