// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Error types for the supervisor and the shared memory allocator.

use std::io;

use thiserror::Error;

/// Failures raised by the supervisor itself.
///
/// Registration rejections are not part of this type: they are reported to
/// the registrant as [`RegistrationRejected`] and never abort a run.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// `fork()` failed while launching or restarting a worker.
    #[error("failed to spawn worker '{worker}': {source}")]
    Spawn {
        worker: String,
        #[source]
        source: io::Error,
    },

    /// The reap primitive failed with something other than EINTR / ECHILD.
    #[error("waiting for workers failed: {0}")]
    Wait(#[source] io::Error),

    /// Installing or restoring the termination signal handlers failed.
    #[error("signal handler setup failed: {0}")]
    Signal(#[source] io::Error),

    #[error("shared memory {op} failed: {source}")]
    SharedMemory {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// [`Supervisor::run`](crate::Supervisor::run) was called on a
    /// supervisor that already ran.
    #[error("supervisor already ran")]
    AlreadyRan,
}

impl Error {
    /// Short snake_case label for log fields.
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::Spawn { .. } => "spawn_failed",
            Error::Wait(_) => "wait_failed",
            Error::Signal(_) => "signal_setup_failed",
            Error::SharedMemory { .. } => "shared_memory_failed",
            Error::AlreadyRan => "already_ran",
        }
    }
}

/// Why `Registry::try_register` refused a worker.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationRejected {
    #[error("registration phase is closed")]
    Closed,

    #[error("registry is full ({capacity} workers)")]
    Full { capacity: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_error_names_worker() {
        let err = Error::Spawn {
            worker: "indexer".into(),
            source: io::Error::from_raw_os_error(libc::EAGAIN),
        };
        let msg = err.to_string();
        assert!(msg.contains("indexer"));
        assert_eq!(err.as_label(), "spawn_failed");
    }

    #[test]
    fn full_rejection_reports_capacity() {
        let err = RegistrationRejected::Full { capacity: 3 };
        assert_eq!(err.to_string(), "registry is full (3 workers)");
    }

    #[test]
    fn shared_memory_error_keeps_source() {
        use std::error::Error as _;
        let err = Error::SharedMemory {
            op: "allocate",
            source: io::Error::new(io::ErrorKind::InvalidInput, "size is 0"),
        };
        assert!(err.to_string().starts_with("shared memory allocate failed"));
        assert!(err.source().is_some());
    }
}
