// src/watcher/mod.rs

//! The watch engine.
//!
//! [`FileWatcher`] maintains a dynamic set of kernel watches over files and
//! directory subtrees, consumes the kernel's raw change events, keeps the
//! watch set consistent as the tree mutates, and dispatches debounced
//! [`FileChangeEvent`]s to a user callback.
//!
//! The engine is strictly single-threaded: the callback runs on the loop
//! thread, and while it executes no events are read or dispatched. Slow
//! callbacks therefore back up into the kernel queue, not into user memory.
//!
//! # Example
//!
//! ```no_run
//! use fswatch::watcher::FileWatcher;
//!
//! # fn main() -> std::io::Result<()> {
//! let mut watcher = FileWatcher::new()?;
//! watcher.set_verbose(true).add_filepath("src", true)?;
//! watcher.run(|event| {
//!     println!("{}", event);
//!     Ok(())
//! })?;
//! # Ok(())
//! # }
//! ```

mod debounce;
pub mod event;
mod interrupt;
pub mod kernel;
mod registry;
mod status;

use std::env;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use inotify::EventMask;
use log::{debug, error, info, trace, warn};

use crate::console;

use self::debounce::Debouncer;
use self::event::{EventKind, FileType};
use self::kernel::Kernel;
use self::registry::WatchRegistry;
use self::status::{path_status, PathStatus};

pub use self::event::{FileChangeEvent, RawEvent};
pub use self::kernel::InotifyKernel;

/// Room for a batch of kernel event records per read: 256 record prefixes
/// of 16 bytes each, with names eating into the headroom.
const EVENT_BUFFER_SIZE: usize = 4096;

/// A watcher over a set of files and directory subtrees.
///
/// Created in an armed, empty state. Watches can be added or removed at any
/// time before or during [`run`](Self::run); [`dispose`](Self::dispose)
/// releases everything and is also invoked on drop.
pub struct FileWatcher<K: Kernel> {
    kernel: K,
    registry: WatchRegistry<K::Descriptor>,
    debounce_window: Duration,
    verbose: bool,
    disposed: bool,
}

impl FileWatcher<InotifyKernel> {
    /// Construct a watcher backed by the platform kernel binding.
    ///
    /// # Errors
    ///
    /// Propagates the `io::Error` from opening the notification instance.
    pub fn new() -> io::Result<Self> {
        Ok(Self::with_kernel(InotifyKernel::open()?))
    }
}

impl<K: Kernel> FileWatcher<K> {
    fn with_kernel(kernel: K) -> Self {
        FileWatcher {
            kernel,
            registry: WatchRegistry::new(),
            debounce_window: debounce::DEFAULT_WINDOW,
            verbose: false,
            disposed: false,
        }
    }

    /// Toggle per-event diagnostic lines on the console.
    pub fn set_verbose(&mut self, verbose: bool) -> &mut Self {
        self.verbose = verbose;
        self
    }

    /// Override the duplicate-suppression window (100 ms by default).
    pub fn set_debounce_window(&mut self, window: Duration) -> &mut Self {
        self.debounce_window = window;
        self
    }

    /// The paths with a live watch, in registration order.
    pub fn watched_paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.registry.iter().map(|(_, path)| path)
    }

    /// Start watching `path`.
    ///
    /// A regular file is covered through a watch on its parent directory; if
    /// the parent is already watched the call is a no-op. A directory gets a
    /// watch of its own and, with `recursive`, one per directory reachable
    /// beneath it (symlinks are not followed). Re-adding a path rebuilds its
    /// watches, leaving the watch set as a single call would have.
    ///
    /// # Errors
    ///
    /// Fails when the watcher is disposed, when `path` does not exist or is
    /// neither a regular file nor a directory, or when the kernel refuses a
    /// watch registration.
    pub fn add_filepath<P: AsRef<Path>>(&mut self, path: P, recursive: bool) -> io::Result<&mut Self> {
        self.ensure_armed()?;

        let path = absolute(path.as_ref())?;
        match path_status(&path) {
            PathStatus::NonExisting => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("watch target {} does not exist", path.display()),
            )),
            PathStatus::Other => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "watch target {} is neither a regular file nor a directory",
                    path.display()
                ),
            )),
            PathStatus::RegularFile => self.watch_file(&path),
            PathStatus::Directory => self.watch_directory(path, recursive),
        }?;

        Ok(self)
    }

    /// Call [`add_filepath`](Self::add_filepath) for each path in turn.
    ///
    /// # Errors
    ///
    /// Fails on the first path that fails; earlier paths stay watched.
    pub fn add_filepaths<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        recursive: bool,
    ) -> io::Result<&mut Self> {
        for path in paths {
            self.add_filepath(path, recursive)?;
        }
        Ok(self)
    }

    /// Stop watching `path` and everything beneath it. Paths that were never
    /// watched are silently ignored.
    pub fn remove_filepath<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        if let Ok(path) = absolute(path.as_ref()) {
            self.remove_watches(&path);
        }
        self
    }

    /// Block, dispatching change events to `callback` as they arrive.
    ///
    /// Returns when interrupted (SIGINT), when `callback` fails (the failure
    /// is logged), or when the kernel read fails fatally.
    ///
    /// # Errors
    ///
    /// Fails when the watcher is disposed, when the interrupt handler cannot
    /// be installed, or with the kernel read's error when the event stream
    /// dies under the loop.
    pub fn run<F>(&mut self, mut callback: F) -> io::Result<()>
    where
        F: FnMut(&FileChangeEvent) -> io::Result<()>,
    {
        self.ensure_armed()?;

        let _guard = if self.kernel.interruptible() {
            Some(interrupt::Guard::install()?)
        } else {
            None
        };
        let mut buffer = vec![0_u8; EVENT_BUFFER_SIZE];
        let mut debouncer = Debouncer::new(self.debounce_window);

        loop {
            buffer.iter_mut().for_each(|byte| *byte = 0);

            let records = match self.kernel.read_events(&mut buffer) {
                Ok(records) => records,
                Err(error) => {
                    if error.kind() == io::ErrorKind::Interrupted {
                        if interrupt::requested() {
                            self.report_warn("interrupted, stopping");
                            info!("watch loop interrupted");
                            break;
                        }
                        continue;
                    }
                    self.report_fail(format!("reading events failed: {}", error));
                    error!("fatal kernel read failure: {}", error);
                    return Err(error);
                }
            };

            for raw in records {
                if raw.mask.contains(EventMask::Q_OVERFLOW) {
                    warn!("kernel event queue overflowed, events were lost");
                    self.report_warn("event queue overflow, some changes may have been missed");
                    continue;
                }
                if raw.mask.contains(EventMask::UNMOUNT) {
                    warn!("filesystem backing a watched path was unmounted");
                    continue;
                }

                let event = match event::classify(&raw, &self.registry) {
                    Some(event) => event,
                    None => continue,
                };

                // Keep the watch set live across directory create/delete
                // before the event reaches the callback. A directory created
                // with contents already in place is only covered once those
                // contents generate events of their own.
                if event.file_type == FileType::Dir {
                    match event.event_type {
                        EventKind::Created => {
                            if let Err(error) = self.add_filepath(&event.filepath, false) {
                                warn!(
                                    "could not watch new directory {}: {}",
                                    event.filepath.display(),
                                    error
                                );
                                self.report_warn(format!(
                                    "could not watch new directory {}",
                                    event.filepath.display()
                                ));
                            }
                        }
                        EventKind::Deleted => {
                            self.remove_filepath(&event.filepath);
                        }
                        _ => {}
                    }
                }

                if debouncer.suppress(&event) {
                    trace!("debounced {}", event);
                    continue;
                }

                self.report_ok(&event);
                if let Err(error) = callback(&event) {
                    self.report_fail(format!("callback failed: {}", error));
                    error!("callback failed, stopping watch loop: {}", error);
                    return Ok(());
                }
                debouncer.mark_dispatched(&event);
            }
        }

        Ok(())
    }

    /// Release every watch and close the notification instance.
    ///
    /// Idempotent, and safe to call after [`run`](Self::run) has returned.
    /// Removal failures are logged and swallowed. Dropping the watcher calls
    /// this too.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        let entries: Vec<_> = self
            .registry
            .iter()
            .map(|(descriptor, path)| (descriptor.clone(), path.to_path_buf()))
            .collect();
        for (descriptor, path) in entries {
            match self.kernel.remove_watch(descriptor) {
                Ok(()) => debug!("released watch on {}", path.display()),
                Err(error) => warn!("failed to release watch on {}: {}", path.display(), error),
            }
        }
        self.registry.clear();

        if let Err(error) = self.kernel.close() {
            warn!("failed to close notification instance: {}", error);
        }
    }

    fn ensure_armed(&self) -> io::Result<()> {
        if self.disposed {
            Err(io::Error::new(
                io::ErrorKind::Other,
                "watcher has been disposed",
            ))
        } else {
            Ok(())
        }
    }

    fn watch_file(&mut self, path: &Path) -> io::Result<()> {
        let parent = path.parent().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("watch target {} has no parent directory", path.display()),
            )
        })?;

        // File-level events arrive through the watch on the containing
        // directory, so a second file under the same parent adds nothing.
        if self.registry.contains_path(parent) {
            debug!(
                "{} is already covered by the watch on {}",
                path.display(),
                parent.display()
            );
            return Ok(());
        }

        let parent = parent.to_path_buf();
        self.remove_watches(&parent);
        self.register(parent)
    }

    fn watch_directory(&mut self, path: PathBuf, recursive: bool) -> io::Result<()> {
        self.remove_watches(&path);
        self.register(path.clone())?;

        if recursive {
            for entry in fs::read_dir(&path)? {
                let entry = entry?;
                // DirEntry::file_type does not traverse symlinks, which is
                // exactly the coverage rule: linked directories stay out.
                if entry.file_type()?.is_dir() {
                    self.watch_directory(entry.path(), true)?;
                }
            }
        }

        Ok(())
    }

    fn register(&mut self, path: PathBuf) -> io::Result<()> {
        let descriptor = self.kernel.add_watch(&path, kernel::watch_mask())?;

        // The kernel hands back the existing descriptor when the path
        // aliases an inode that is already watched.
        self.registry.remove(&descriptor);

        debug!("registered watch {:?} on {}", descriptor, path.display());
        self.report_ok(format!("watching {}", path.display()));
        self.registry.insert(descriptor, path);
        Ok(())
    }

    fn remove_watches(&mut self, path: &Path) {
        for descriptor in self.registry.collect_subtree(path) {
            let removed = self.registry.remove(&descriptor);
            if let Err(error) = self.kernel.remove_watch(descriptor) {
                // The kernel drops descriptors on its own when a watched
                // entry is deleted, so failures here are routine.
                debug!("failed to remove watch: {}", error);
            }
            if let Some(removed_path) = removed {
                debug!("dropped watch on {}", removed_path.display());
                self.report_ok(format!("no longer watching {}", removed_path.display()));
            }
        }
    }

    fn report_ok(&self, message: impl std::fmt::Display) {
        if self.verbose {
            console::ok(message);
        }
    }

    fn report_warn(&self, message: impl std::fmt::Display) {
        if self.verbose {
            console::warn(message);
        }
    }

    fn report_fail(&self, message: impl std::fmt::Display) {
        if self.verbose {
            console::fail(message);
        }
    }
}

impl<K: Kernel> Drop for FileWatcher<K> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Absolutize `path` against the current directory and normalize it
/// lexically: no `.`/`..` components and no trailing separator. The
/// filesystem is never consulted, so paths that no longer exist normalize
/// the same way they did when they were added.
fn absolute(path: &Path) -> io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            component => normalized.push(component.as_os_str()),
        }
    }
    Ok(normalized)
}
