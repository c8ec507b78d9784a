// src/watcher/event.rs

//! The event taxonomy of the watch engine, and the classifier that produces
//! it from raw kernel records.
//!
//! A single kernel read yields a batch of [`RawEvent`] records. [`classify`]
//! resolves each record to an absolute path through the watch registry and
//! maps the kernel's event bits onto the four-kind taxonomy the rest of the
//! engine (and the user callback) works with. Records the taxonomy does not
//! cover produce no event.

use std::ffi::OsString;
use std::fmt;
use std::fmt::Debug;
use std::path::PathBuf;
use std::time::Instant;

use inotify::EventMask;
use log::trace;

use super::registry::WatchRegistry;

/// A single decoded kernel event record.
///
/// This mirrors the wire-level record: the descriptor of the originating
/// watch, the raw event bits, the rename-correlation cookie, and the name of
/// the affected child entry when the event is about a child of the watched
/// path rather than the watched path itself.
#[derive(Clone, Debug)]
pub struct RawEvent<D> {
    /// Identifies the watch this record originates from.
    pub descriptor: D,

    /// Raw event bits as reported by the kernel.
    pub mask: EventMask,

    /// Connects the two halves of a rename; zero for everything else.
    pub cookie: u32,

    /// Name of the affected child entry, relative to the watched path.
    pub name: Option<OsString>,
}

/// The kinds of change the engine reports.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventKind {
    /// An entry was created inside a watched directory.
    Created,

    /// An entry was deleted from a watched directory.
    Deleted,

    /// File content changed.
    Changed,

    /// Metadata (permissions, timestamps, ownership) changed.
    ChangedAttribs,
}

impl EventKind {
    /// Map raw event bits onto the taxonomy.
    ///
    /// The first matching bit wins: create, then delete, then modify, then
    /// attrib. Records carrying none of the four produce no event.
    fn from_mask(mask: EventMask) -> Option<Self> {
        if mask.contains(EventMask::CREATE) {
            Some(EventKind::Created)
        } else if mask.contains(EventMask::DELETE) {
            Some(EventKind::Deleted)
        } else if mask.contains(EventMask::MODIFY) {
            Some(EventKind::Changed)
        } else if mask.contains(EventMask::ATTRIB) {
            Some(EventKind::ChangedAttribs)
        } else {
            None
        }
    }

    /// The kind's stable textual name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Created => "created",
            EventKind::Deleted => "deleted",
            EventKind::Changed => "changed",
            EventKind::ChangedAttribs => "changed-attribs",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an event concerns a directory or a file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FileType {
    /// The affected entry is a regular file (or anything non-directory).
    File,

    /// The affected entry is a directory.
    Dir,
}

impl FileType {
    /// The type's stable textual name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FileType::File => "file",
            FileType::Dir => "dir",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The refined change event handed to the user callback.
#[derive(Clone, Debug)]
pub struct FileChangeEvent {
    /// Monotonic capture time, taken when the record was classified.
    pub timestamp: Instant,

    /// The kind of change.
    pub event_type: EventKind,

    /// Whether the affected entry is a directory.
    pub file_type: FileType,

    /// Absolute path of the affected entry: the watched path joined with the
    /// record's name when the kernel provided one, else the watched path
    /// itself.
    pub filepath: PathBuf,
}

impl fmt::Display for FileChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.event_type,
            self.file_type,
            self.filepath.display()
        )
    }
}

/// Classify a raw record into a [`FileChangeEvent`].
///
/// Records whose descriptor is no longer in the registry are skipped: the
/// watch was removed between the kernel queueing the event and us decoding
/// it. Records outside the taxonomy are dropped.
pub(super) fn classify<D: Clone + Debug + PartialEq>(
    raw: &RawEvent<D>,
    registry: &WatchRegistry<D>,
) -> Option<FileChangeEvent> {
    let watched = match registry.lookup(&raw.descriptor) {
        Some(path) => path,
        None => {
            trace!("skipping event for unregistered watch descriptor: {:?}", raw);
            return None;
        }
    };

    let event_type = EventKind::from_mask(raw.mask)?;
    let file_type = if raw.mask.contains(EventMask::ISDIR) {
        FileType::Dir
    } else {
        FileType::File
    };
    let filepath = match &raw.name {
        Some(name) => watched.join(name),
        None => watched.to_path_buf(),
    };

    Some(FileChangeEvent {
        timestamp: Instant::now(),
        event_type,
        file_type,
        filepath,
    })
}
