// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// SIGINT / SIGTERM handling for the supervisor process.
//
// The handler's only effect is clearing the supervisor's keep-running flag.
// It reaches that flag through a single static pointer which is set while a
// SignalGuard is alive; nothing else crosses the signal boundary.

use std::io;
use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};
use std::sync::Arc;

use crate::platform::posix::{self, Disposition};

/// Signals the supervisor intercepts. Children get the default disposition back.
pub const INTERCEPTED: [libc::c_int; 2] = [libc::SIGINT, libc::SIGTERM];

static KEEP_RUNNING: AtomicPtr<AtomicBool> = AtomicPtr::new(ptr::null_mut());

extern "C" fn on_termination(_signal: libc::c_int) {
    let flag = KEEP_RUNNING.load(Ordering::Acquire);
    if !flag.is_null() {
        // Safety: the pointer is only published while the owning guard holds
        // the Arc, and it is cleared after the handlers are restored.
        unsafe { (*flag).store(false, Ordering::SeqCst) };
    }
}

/// Installed termination handlers. Restores the previous dispositions on
/// [`restore`](Self::restore) or drop.
pub(crate) struct SignalGuard {
    flag: Arc<AtomicBool>,
    saved: Vec<Disposition>,
}

impl SignalGuard {
    pub(crate) fn install(flag: Arc<AtomicBool>) -> io::Result<Self> {
        KEEP_RUNNING.store(Arc::as_ptr(&flag) as *mut AtomicBool, Ordering::Release);
        let mut guard = Self {
            flag,
            saved: Vec::with_capacity(INTERCEPTED.len()),
        };
        for signal in INTERCEPTED {
            // On error the guard drops here and undoes the partial install.
            guard
                .saved
                .push(posix::install_handler(signal, on_termination)?);
        }
        Ok(guard)
    }

    pub(crate) fn restore(mut self) -> io::Result<()> {
        self.restore_inner()
    }

    fn restore_inner(&mut self) -> io::Result<()> {
        let mut first_err = None;
        for saved in self.saved.drain(..) {
            if let Err(e) = posix::restore_disposition(&saved) {
                first_err.get_or_insert(e);
            }
        }
        let ours = Arc::as_ptr(&self.flag) as *mut AtomicBool;
        let _ = KEEP_RUNNING.compare_exchange(
            ours,
            ptr::null_mut(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        first_err.map_or(Ok(()), Err)
    }
}

impl Drop for SignalGuard {
    fn drop(&mut self) {
        let _ = self.restore_inner();
    }
}

/// Put the intercepted signals back to SIG_DFL in a freshly forked worker.
pub(crate) fn reset_in_child() {
    for signal in INTERCEPTED {
        let _ = posix::set_default(signal);
    }
}
