// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// POSIX process, signal and anonymous mapping primitives.
// Thin wrappers over libc that turn -1/errno into io::Error.

use std::fmt;
use std::io;
use std::ptr;

// ---------------------------------------------------------------------------
// Process identifiers
// ---------------------------------------------------------------------------

/// Process identifier of a forked worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pid(libc::pid_t);

impl Pid {
    pub fn from_raw(raw: libc::pid_t) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> libc::pid_t {
        self.0
    }

    /// Pid of the calling process.
    pub fn current() -> Self {
        Self(unsafe { libc::getpid() })
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// fork / wait / kill
// ---------------------------------------------------------------------------

/// Which side of a `fork()` the caller ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fork {
    Parent(Pid),
    Child,
}

pub fn fork() -> io::Result<Fork> {
    let pid = unsafe { libc::fork() };
    match pid {
        -1 => Err(io::Error::last_os_error()),
        0 => Ok(Fork::Child),
        pid => Ok(Fork::Parent(Pid(pid))),
    }
}

/// Block until any child changes state. Returns the pid and raw wait status.
///
/// `EINTR` and `ECHILD` are returned as errors; callers decide what they mean.
pub fn wait_any() -> io::Result<(Pid, libc::c_int)> {
    let mut status: libc::c_int = 0;
    let ret = unsafe { libc::waitpid(-1, &mut status, 0) };
    if ret == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok((Pid(ret), status))
}

/// Block until `pid` changes state, retrying on `EINTR`.
pub fn wait_pid(pid: Pid) -> io::Result<libc::c_int> {
    loop {
        let mut status: libc::c_int = 0;
        let ret = unsafe { libc::waitpid(pid.0, &mut status, 0) };
        if ret == pid.0 {
            return Ok(status);
        }
        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::EINTR) {
            return Err(err);
        }
    }
}

pub fn kill(pid: Pid, signal: libc::c_int) -> io::Result<()> {
    if unsafe { libc::kill(pid.0, signal) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Terminate a forked child without unwinding or running the parent's
/// atexit handlers. Callers flush std streams first.
pub fn exit_child(code: libc::c_int) -> ! {
    unsafe { libc::_exit(code) }
}

pub fn abort_child() -> ! {
    unsafe { libc::abort() }
}

// ---------------------------------------------------------------------------
// Signal dispositions
// ---------------------------------------------------------------------------

/// A saved signal disposition, restorable with [`restore_disposition`].
#[derive(Clone, Copy)]
pub struct Disposition {
    signal: libc::c_int,
    action: libc::sigaction,
}

impl fmt::Debug for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposition")
            .field("signal", &self.signal)
            .field("handler", &self.action.sa_sigaction)
            .finish()
    }
}

fn set_action(signal: libc::c_int, handler: libc::sighandler_t) -> io::Result<Disposition> {
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = handler;
        // No SA_RESTART: a blocking waitpid must come back with EINTR.
        action.sa_flags = 0;
        libc::sigemptyset(&mut action.sa_mask);

        let mut previous: libc::sigaction = std::mem::zeroed();
        if libc::sigaction(signal, &action, &mut previous) != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Disposition {
            signal,
            action: previous,
        })
    }
}

/// Install `handler` for `signal`, returning the disposition it replaced.
pub fn install_handler(
    signal: libc::c_int,
    handler: extern "C" fn(libc::c_int),
) -> io::Result<Disposition> {
    set_action(signal, handler as *const () as libc::sighandler_t)
}

pub fn set_default(signal: libc::c_int) -> io::Result<()> {
    set_action(signal, libc::SIG_DFL).map(|_| ())
}

pub fn restore_disposition(saved: &Disposition) -> io::Result<()> {
    if unsafe { libc::sigaction(saved.signal, &saved.action, ptr::null_mut()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Anonymous shared mappings
// ---------------------------------------------------------------------------

/// `mmap(MAP_SHARED | MAP_ANONYMOUS)` of `size` bytes, zero-filled by the kernel.
pub fn map_anonymous_shared(size: usize) -> io::Result<*mut u8> {
    if size == 0 {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "size is 0"));
    }
    let mem = unsafe {
        libc::mmap(
            ptr::null_mut(),
            size,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_SHARED | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };
    if mem == libc::MAP_FAILED {
        return Err(io::Error::last_os_error());
    }
    Ok(mem as *mut u8)
}

/// # Safety
/// `mem` must come from [`map_anonymous_shared`] with the same `size`, and
/// nothing may dereference it afterwards.
pub unsafe fn unmap(mem: *mut u8, size: usize) -> io::Result<()> {
    if libc::munmap(mem as *mut libc::c_void, size) != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
