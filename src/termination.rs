// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Classification of raw wait statuses reported by the reap cycle.

use std::fmt;

/// How a reaped worker ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Returned normally from its entry point or called `exit`, with this code.
    Exited(i32),
    /// Killed by a signal.
    Signaled { signal: i32, core_dumped: bool },
    /// Any other reported state.
    Other(i32),
}

impl Termination {
    pub fn from_wait_status(status: libc::c_int) -> Self {
        if libc::WIFEXITED(status) {
            Self::Exited(libc::WEXITSTATUS(status))
        } else if libc::WIFSIGNALED(status) {
            Self::Signaled {
                signal: libc::WTERMSIG(status),
                core_dumped: libc::WCOREDUMP(status),
            }
        } else {
            Self::Other(status)
        }
    }

    /// Anything other than an unsignaled exit. A non-zero exit code is still
    /// a normal exit and never triggers a restart.
    pub fn is_abnormal(&self) -> bool {
        !matches!(self, Self::Exited(_))
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exited with code {code}"),
            Self::Signaled {
                signal,
                core_dumped: true,
            } => write!(f, "killed by signal {signal} (core dumped)"),
            Self::Signaled { signal, .. } => write!(f, "killed by signal {signal}"),
            Self::Other(status) => write!(f, "unrecognised wait status {status:#x}"),
        }
    }
}
