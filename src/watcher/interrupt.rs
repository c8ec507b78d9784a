// src/watcher/interrupt.rs

//! Scoped SIGINT handling for the watch loop.
//!
//! The loop spends its life blocked in the kernel read. The guard installs a
//! SIGINT handler without `SA_RESTART`, so an interrupt makes that read fail
//! with `EINTR`; the loop then consults [`requested`] to tell a deliberate
//! interrupt from an unrelated signal.

use std::io;
use std::mem;
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(test)]
use std::sync::{Mutex, PoisonError};

use log::debug;

static INTERRUPT_REQUESTED: AtomicBool = AtomicBool::new(false);

// The flag and the signal disposition are process-global; tests that write
// the flag serialize here.
#[cfg(test)]
static FLAG_LOCK: Mutex<()> = Mutex::new(());

/// Whether SIGINT arrived since the current [`Guard`] was installed.
pub(super) fn requested() -> bool {
    INTERRUPT_REQUESTED.load(Ordering::Relaxed)
}

extern "C" fn handle_sigint(_signal: libc::c_int) {
    INTERRUPT_REQUESTED.store(true, Ordering::Relaxed);
}

/// Installs the SIGINT handler on construction and restores whatever was
/// there before when dropped.
pub(super) struct Guard {
    previous: libc::sigaction,
}

impl Guard {
    /// Install the handler and reset the interrupt flag.
    ///
    /// # Errors
    ///
    /// Propagates the OS error if the handler cannot be installed.
    pub(super) fn install() -> io::Result<Guard> {
        #[cfg(test)]
        let _lock = FLAG_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

        INTERRUPT_REQUESTED.store(false, Ordering::Relaxed);

        let mut action: libc::sigaction = unsafe { mem::zeroed() };
        action.sa_sigaction = handle_sigint as libc::sighandler_t;
        unsafe {
            libc::sigemptyset(&mut action.sa_mask);
        }

        let mut previous: libc::sigaction = unsafe { mem::zeroed() };
        if unsafe { libc::sigaction(libc::SIGINT, &action, &mut previous) } != 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(Guard { previous })
    }
}

impl Drop for Guard {
    fn drop(&mut self) {
        if unsafe { libc::sigaction(libc::SIGINT, &self.previous, ptr::null_mut()) } != 0 {
            debug!(
                "failed to restore previous SIGINT handler: {}",
                io::Error::last_os_error()
            );
        }
    }
}
