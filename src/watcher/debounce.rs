// src/watcher/debounce.rs

//! Duplicate-event suppression for the dispatch loop.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::event::{EventKind, FileChangeEvent, FileType};

/// Default width of the duplicate-suppression window.
pub(super) const DEFAULT_WINDOW: Duration = Duration::from_millis(100);

/// A single-slot debouncer.
///
/// The slot remembers the last dispatched event. A follow-up event is
/// suppressed iff it matches that event in path, entry type and kind, and
/// arrives within the window. The slot's timestamp is taken when the
/// dispatch returns, so time spent in the callback does not count against
/// the window.
pub(super) struct Debouncer {
    window: Duration,
    last: Option<LastDispatch>,
}

struct LastDispatch {
    filepath: PathBuf,
    file_type: FileType,
    event_type: EventKind,
    dispatched_at: Instant,
}

impl Debouncer {
    pub(super) fn new(window: Duration) -> Self {
        Debouncer { window, last: None }
    }

    /// Whether `event` is a duplicate of the last dispatched event.
    pub(super) fn suppress(&self, event: &FileChangeEvent) -> bool {
        self.suppress_at(event, Instant::now())
    }

    fn suppress_at(&self, event: &FileChangeEvent, now: Instant) -> bool {
        match &self.last {
            Some(last) => {
                last.filepath == event.filepath
                    && last.file_type == event.file_type
                    && last.event_type == event.event_type
                    && now.duration_since(last.dispatched_at) <= self.window
            }
            None => false,
        }
    }

    /// Record `event` as just dispatched.
    pub(super) fn mark_dispatched(&mut self, event: &FileChangeEvent) {
        self.last = Some(LastDispatch {
            filepath: event.filepath.clone(),
            file_type: event.file_type,
            event_type: event.event_type,
            dispatched_at: Instant::now(),
        });
    }
}
