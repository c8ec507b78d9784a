// src/watcher/kernel/inotify.rs

//! [`Kernel`] implementation for Linux, based on `inotify`.

use std::ffi::OsStr;
use std::io;
use std::path::Path;

use inotify::{Inotify, WatchDescriptor, WatchMask};

use super::super::event::RawEvent;
use super::Kernel;

/// The Linux kernel binding, wrapping an [`Inotify`] instance.
pub struct InotifyKernel {
    inner: Option<Inotify>,
}

impl InotifyKernel {
    fn instance(&mut self) -> io::Result<&mut Inotify> {
        self.inner
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "notification instance is closed"))
    }
}

impl Kernel for InotifyKernel {
    type Descriptor = WatchDescriptor;

    fn open() -> io::Result<Self> {
        Ok(InotifyKernel {
            inner: Some(Inotify::init()?),
        })
    }

    fn add_watch(&mut self, path: &Path, mask: WatchMask) -> io::Result<Self::Descriptor> {
        self.instance()?.add_watch(path, mask)
    }

    fn remove_watch(&mut self, descriptor: Self::Descriptor) -> io::Result<()> {
        self.instance()?.rm_watch(descriptor)
    }

    fn read_events(&mut self, buffer: &mut [u8]) -> io::Result<Vec<RawEvent<Self::Descriptor>>> {
        let events = self.instance()?.read_events_blocking(buffer)?;
        Ok(events
            .map(|event| RawEvent {
                descriptor: event.wd,
                mask: event.mask,
                cookie: event.cookie,
                name: event.name.map(OsStr::to_os_string),
            })
            .collect())
    }

    fn close(&mut self) -> io::Result<()> {
        match self.inner.take() {
            Some(instance) => instance.close(),
            None => Ok(()),
        }
    }
}
