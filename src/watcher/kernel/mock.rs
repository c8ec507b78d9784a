// src/watcher/kernel/mock.rs

//! Scripted [`Kernel`](super::Kernel) implementation for tests.
//!
//! This watches no actual files. It records watch registrations and
//! removals, and replays batches of events queued through
//! [`MockKernel::script_batch`], one batch per read. When the script runs
//! out, the read fails with `UnexpectedEof` — the same shape as a real
//! end-of-stream — which deterministically terminates a watch loop under
//! test.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use inotify::{EventMask, WatchMask};

use super::super::event::RawEvent;
use super::Kernel;

/// Build a raw event record the way the kernel would report it.
pub(in crate::watcher) fn raw_event(
    descriptor: i32,
    mask: EventMask,
    name: Option<&str>,
) -> RawEvent<i32> {
    RawEvent {
        descriptor,
        mask,
        cookie: 0,
        name: name.map(OsString::from),
    }
}

/// A scripted kernel binding.
///
/// Clones share state, so a test can keep a handle for scripting and
/// assertions while the engine owns another.
#[derive(Clone)]
pub(in crate::watcher) struct MockKernel {
    state: Rc<RefCell<State>>,
}

struct State {
    next_descriptor: i32,
    watches: Vec<(i32, PathBuf)>,
    removed: Vec<i32>,
    batches: VecDeque<Vec<RawEvent<i32>>>,
    closed: bool,
}

impl MockKernel {
    pub(in crate::watcher) fn new() -> Self {
        MockKernel {
            state: Rc::new(RefCell::new(State {
                next_descriptor: 1,
                watches: Vec::new(),
                removed: Vec::new(),
                batches: VecDeque::new(),
                closed: false,
            })),
        }
    }

    /// Queue a batch of events for a single simulated kernel read.
    pub(in crate::watcher) fn script_batch(&self, events: Vec<RawEvent<i32>>) {
        self.state.borrow_mut().batches.push_back(events);
    }

    /// The paths with a live watch, in registration order.
    pub(in crate::watcher) fn watched_paths(&self) -> Vec<PathBuf> {
        self.state
            .borrow()
            .watches
            .iter()
            .map(|(_, path)| path.clone())
            .collect()
    }

    /// The descriptor currently watching `path`, if any.
    pub(in crate::watcher) fn descriptor_for(&self, path: &Path) -> Option<i32> {
        self.state
            .borrow()
            .watches
            .iter()
            .find(|(_, p)| p == path)
            .map(|(descriptor, _)| *descriptor)
    }

    /// Every descriptor passed to `remove_watch`, in call order.
    pub(in crate::watcher) fn removed(&self) -> Vec<i32> {
        self.state.borrow().removed.clone()
    }

    pub(in crate::watcher) fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }
}

impl Kernel for MockKernel {
    type Descriptor = i32;

    fn open() -> io::Result<Self> {
        Ok(MockKernel::new())
    }

    fn add_watch(&mut self, path: &Path, _mask: WatchMask) -> io::Result<Self::Descriptor> {
        let mut state = self.state.borrow_mut();
        let descriptor = state.next_descriptor;
        state.next_descriptor += 1;
        state.watches.push((descriptor, path.to_path_buf()));
        Ok(descriptor)
    }

    fn remove_watch(&mut self, descriptor: Self::Descriptor) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        state.watches.retain(|(d, _)| *d != descriptor);
        state.removed.push(descriptor);
        Ok(())
    }

    fn read_events(&mut self, _buffer: &mut [u8]) -> io::Result<Vec<RawEvent<Self::Descriptor>>> {
        self.state.borrow_mut().batches.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "no more scripted events")
        })
    }

    // The mock never blocks, and tests driving it must not disturb
    // process-global signal state.
    fn interruptible(&self) -> bool {
        false
    }

    fn close(&mut self) -> io::Result<()> {
        self.state.borrow_mut().closed = true;
        Ok(())
    }
}
