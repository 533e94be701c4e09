// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Ordered, bounded table of worker descriptors.
// Writable only during the registration phase; a worker's index is its
// identity for the lifetime of the run.

use std::fmt;
use std::ops::Index;

use crate::error::RegistrationRejected;
use crate::platform::Pid;

type EntryPoint = Box<dyn Fn()>;

// ---------------------------------------------------------------------------
// WorkerDescriptor
// ---------------------------------------------------------------------------

/// One registered worker.
pub struct WorkerDescriptor {
    name: String,
    entry: EntryPoint,
    restart_on_abnormal_exit: bool,
    pid: Option<Pid>,
    running: bool,
    spawn_count: u64,
}

impl WorkerDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn restart_on_abnormal_exit(&self) -> bool {
        self.restart_on_abnormal_exit
    }

    /// Pid of the current instance, `None` until the worker is first spawned.
    pub fn pid(&self) -> Option<Pid> {
        self.pid
    }

    /// Whether the current instance has been spawned and not yet reaped.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// How many times the parent has forked this worker.
    pub fn spawn_count(&self) -> u64 {
        self.spawn_count
    }

    /// Run the entry point in the calling process.
    pub(crate) fn invoke(&self) {
        (self.entry)()
    }

    pub(crate) fn record_spawn(&mut self, pid: Pid) {
        self.pid = Some(pid);
        self.running = true;
        self.spawn_count += 1;
    }

    /// The current instance was reaped. The last pid is kept for diagnostics.
    pub(crate) fn mark_reaped(&mut self) {
        self.running = false;
    }
}

impl fmt::Debug for WorkerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerDescriptor")
            .field("name", &self.name)
            .field("restart_on_abnormal_exit", &self.restart_on_abnormal_exit)
            .field("pid", &self.pid)
            .field("running", &self.running)
            .field("spawn_count", &self.spawn_count)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Workers in registration order.
///
/// Handed to [`Host::before_start`](crate::Host::before_start) as `&mut`;
/// the supervisor closes it before the first fork and never reopens it.
#[derive(Debug)]
pub struct Registry {
    workers: Vec<WorkerDescriptor>,
    capacity: usize,
    open: bool,
}

impl Registry {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            workers: Vec::with_capacity(capacity),
            capacity,
            open: true,
        }
    }

    /// Register `entry(&param)` as a worker. Returns `false` without side
    /// effects if the registration phase is over or the registry is full.
    pub fn register<P, F>(&mut self, entry: F, param: P, restart_on_abnormal_exit: bool) -> bool
    where
        F: Fn(&P) + 'static,
        P: 'static,
    {
        self.try_register(entry, param, restart_on_abnormal_exit)
            .is_ok()
    }

    /// Like [`register`](Self::register) but reports the new index or why the
    /// worker was refused.
    pub fn try_register<P, F>(
        &mut self,
        entry: F,
        param: P,
        restart_on_abnormal_exit: bool,
    ) -> Result<usize, RegistrationRejected>
    where
        F: Fn(&P) + 'static,
        P: 'static,
    {
        let name = format!("worker-{}", self.workers.len());
        self.register_named(name, entry, param, restart_on_abnormal_exit)
    }

    pub fn register_named<P, F>(
        &mut self,
        name: impl Into<String>,
        entry: F,
        param: P,
        restart_on_abnormal_exit: bool,
    ) -> Result<usize, RegistrationRejected>
    where
        F: Fn(&P) + 'static,
        P: 'static,
    {
        if !self.open {
            return Err(RegistrationRejected::Closed);
        }
        if self.workers.len() >= self.capacity {
            return Err(RegistrationRejected::Full {
                capacity: self.capacity,
            });
        }

        let index = self.workers.len();
        self.workers.push(WorkerDescriptor {
            name: name.into(),
            entry: Box::new(move || entry(&param)),
            restart_on_abnormal_exit,
            pid: None,
            running: false,
            spawn_count: 0,
        });
        Ok(index)
    }

    /// End the registration phase. Irrevocable.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&WorkerDescriptor> {
        self.workers.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkerDescriptor> {
        self.workers.iter()
    }

    /// Index of the worker whose current, unreaped instance is `pid`.
    ///
    /// Reaped descriptors keep their last pid, which the kernel may hand to a
    /// later fork; those never match.
    pub fn index_of(&self, pid: Pid) -> Option<usize> {
        self.workers
            .iter()
            .position(|w| w.running && w.pid == Some(pid))
    }

    /// `(index, pid)` of instances that were spawned and not reaped yet.
    pub fn live_pids(&self) -> impl Iterator<Item = (usize, Pid)> + '_ {
        self.workers
            .iter()
            .enumerate()
            .filter(|(_, w)| w.running)
            .filter_map(|(i, w)| w.pid.map(|pid| (i, pid)))
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut WorkerDescriptor> {
        self.workers.get_mut(index)
    }
}

impl Index<usize> for Registry {
    type Output = WorkerDescriptor;

    fn index(&self, index: usize) -> &WorkerDescriptor {
        &self.workers[index]
    }
}
