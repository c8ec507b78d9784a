// src/watcher/kernel/mod.rs

//! Kernel-level filesystem notification bindings.
//!
//! The [`Kernel`] trait is the engine's seam to the operating system's
//! notification API: one instance handle, per-path watch registration and
//! removal, and a blocking read that yields decoded
//! [`RawEvent`](super::event::RawEvent) records.
//!
//! The [`inotify`] module contains the `Kernel` implementation for the
//! target platform; a scripted [`mock`] implementation exists for tests.

#[cfg(target_os = "linux")]
mod inotify;
#[cfg(test)]
pub(super) mod mock;

use std::fmt::Debug;
use std::hash::Hash;
use std::io;
use std::path::Path;

use ::inotify::WatchMask;

use super::event::RawEvent;

#[cfg(target_os = "linux")]
pub use self::inotify::InotifyKernel;

/// The full set of change notifications the engine subscribes to when it
/// registers a watch.
///
/// `DONT_FOLLOW` keeps a symlink given as the watch target from being
/// dereferenced at watch-setup time.
pub(super) fn watch_mask() -> WatchMask {
    WatchMask::MODIFY
        | WatchMask::ATTRIB
        | WatchMask::MOVE
        | WatchMask::CREATE
        | WatchMask::DELETE
        | WatchMask::DELETE_SELF
        | WatchMask::MOVE_SELF
        | WatchMask::DONT_FOLLOW
}

/// A binding to kernel filesystem notifications.
///
/// Each operation mirrors one of the underlying syscalls one-to-one. The
/// binding never retries and never interprets failures; policy lives with
/// the engine.
pub trait Kernel {
    /// Opaque handle identifying a single active watch.
    ///
    /// Descriptors are only meaningful to the instance that issued them.
    type Descriptor: Clone + Debug + Eq + Hash;

    /// Open a new notification instance.
    ///
    /// # Errors
    ///
    /// Propagates the `io::Error` from the underlying syscall.
    fn open() -> io::Result<Self>
    where
        Self: Sized;

    /// Register a watch on `path` for the events in `mask`, returning the
    /// descriptor the kernel issued for it.
    ///
    /// # Errors
    ///
    /// Propagates the `io::Error` from the underlying syscall.
    fn add_watch(&mut self, path: &Path, mask: WatchMask) -> io::Result<Self::Descriptor>;

    /// Remove the watch behind `descriptor`.
    ///
    /// # Errors
    ///
    /// Propagates the `io::Error` from the underlying syscall. Removing a
    /// descriptor the kernel has already dropped (the watched entry was
    /// deleted) fails like any other invalid descriptor.
    fn remove_watch(&mut self, descriptor: Self::Descriptor) -> io::Result<()>;

    /// Block until at least one event is available, then decode the packed
    /// records read into `buffer`.
    ///
    /// # Errors
    ///
    /// A zero-byte read is end-of-stream and surfaces as
    /// `ErrorKind::UnexpectedEof`; a read interrupted by a signal surfaces
    /// as `ErrorKind::Interrupted`. Both are the caller's to handle.
    fn read_events(&mut self, buffer: &mut [u8]) -> io::Result<Vec<RawEvent<Self::Descriptor>>>;

    /// Whether reads on this binding block in a syscall that a process
    /// signal can interrupt. When true, the engine installs its scoped
    /// SIGINT handler for the duration of the run loop.
    fn interruptible(&self) -> bool {
        true
    }

    /// Close the instance, releasing every watch still registered on it.
    /// Idempotent.
    ///
    /// # Errors
    ///
    /// Propagates the `io::Error` from the underlying syscall.
    fn close(&mut self) -> io::Result<()>;
}
