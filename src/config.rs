// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Supervisor configuration. Plain struct with defaults and optional
// environment overrides; there is no configuration file.

/// Default registry capacity.
pub const DEFAULT_MAX_WORKERS: usize = 100;

/// Environment variable overriding [`SupervisorConfig::max_workers`].
pub const MAX_WORKERS_ENV: &str = "PROCVISOR_MAX_WORKERS";

/// Configuration for a [`Supervisor`](crate::Supervisor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Registry capacity, fixed for the lifetime of the run.
    pub max_workers: usize,
    /// Signal sent to every known worker when shutdown begins.
    pub terminate_signal: i32,
    /// Signal used after the after-stop hook to make sure nothing survives.
    pub kill_signal: i32,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            terminate_signal: libc::SIGTERM,
            kill_signal: libc::SIGKILL,
        }
    }
}

impl SupervisorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Apply `PROCVISOR_MAX_WORKERS` if it is set and parses.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(MAX_WORKERS_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(n) => self.max_workers = n,
                Err(_) => tracing::warn!(
                    var = MAX_WORKERS_ENV,
                    value = %raw,
                    "ignoring invalid worker count override"
                ),
            }
        }
        self
    }
}
