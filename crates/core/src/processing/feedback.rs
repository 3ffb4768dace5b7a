//! Progress, log and cancellation context threaded through algorithm runs.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

/// Log level for feedback messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
}

/// A recorded feedback message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn debug(msg: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Debug,
            message: msg.into(),
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Info,
            message: msg.into(),
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Warning,
            message: msg.into(),
        }
    }
}

/// Cloneable handle raising the cancellation flag of a [`Feedback`].
///
/// May be moved to another thread (signal handler, UI).
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

type ProgressFn = Box<dyn FnMut(u32)>;
type LogFn = Box<dyn FnMut(&LogEntry)>;

/// Feedback context for a single algorithm run.
///
/// Holds the cancellation flag, an optional progress callback, an optional
/// log callback and the info and warning messages pushed during the run.
/// Every message is emitted through `tracing` and handed to the log callback.
/// Debug notes can be one per vertex, so they are counted but not retained.
#[derive(Default)]
pub struct Feedback {
    canceled: Arc<AtomicBool>,
    progress: Option<u32>,
    on_progress: Option<ProgressFn>,
    on_log: Option<LogFn>,
    entries: Vec<LogEntry>,
    debug_notes: usize,
}

impl Feedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a progress callback (receives percentages 0-100)
    pub fn with_progress(mut self, f: impl FnMut(u32) + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Install a log callback
    pub fn with_log(mut self, f: impl FnMut(&LogEntry) + 'static) -> Self {
        self.on_log = Some(Box::new(f));
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.canceled))
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::Relaxed);
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Relaxed)
    }

    /// Report progress; values above 100 are clamped
    pub fn set_progress(&mut self, percent: u32) {
        let percent = percent.min(100);
        self.progress = Some(percent);
        if let Some(f) = self.on_progress.as_mut() {
            f(percent);
        }
    }

    /// Last reported progress
    pub fn progress(&self) -> Option<u32> {
        self.progress
    }

    pub fn push_info(&mut self, msg: impl Into<String>) {
        let entry = LogEntry::info(msg);
        info!("{}", entry.message);
        self.record(entry);
    }

    pub fn push_warning(&mut self, msg: impl Into<String>) {
        let entry = LogEntry::warning(msg);
        warn!("{}", entry.message);
        self.record(entry);
    }

    /// Diagnostic note; informative only and not retained
    pub fn push_debug(&mut self, msg: impl Into<String>) {
        let entry = LogEntry::debug(msg);
        debug!("{}", entry.message);
        if let Some(f) = self.on_log.as_mut() {
            f(&entry);
        }
        self.debug_notes += 1;
    }

    /// Info and warning messages pushed so far, in order
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Number of debug notes pushed so far
    pub fn debug_count(&self) -> usize {
        self.debug_notes
    }

    /// Messages of exactly `level`
    pub fn messages(&self, level: LogLevel) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |e| e.level == level)
            .map(|e| e.message.as_str())
    }

    fn record(&mut self, entry: LogEntry) {
        if let Some(f) = self.on_log.as_mut() {
            f(&entry);
        }
        self.entries.push(entry);
    }
}

impl fmt::Debug for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feedback")
            .field("canceled", &self.is_canceled())
            .field("progress", &self.progress)
            .field("entries", &self.entries.len())
            .field("debug_notes", &self.debug_notes)
            .finish()
    }
}
