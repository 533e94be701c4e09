// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors

#[cfg(unix)]
pub mod posix;

#[cfg(not(unix))]
compile_error!("procvisor supervises forked processes and requires a POSIX platform");

#[cfg(unix)]
pub use posix::Pid;
