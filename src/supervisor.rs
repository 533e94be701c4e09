// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Supervisor loop: forks every registered worker, reaps them, restarts the
// ones whose policy allows it, and coordinates shutdown.

use std::fmt;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::SupervisorConfig;
use crate::error::{Error, Result};
use crate::platform::posix::{self, Fork};
use crate::platform::Pid;
use crate::registry::{Registry, WorkerDescriptor};
use crate::signals::{self, SignalGuard};
use crate::termination::Termination;

// ---------------------------------------------------------------------------
// Host hooks
// ---------------------------------------------------------------------------

/// The program being supervised.
pub trait Host {
    /// Called once before anything is forked. Register workers here.
    /// A non-zero return aborts startup with that code.
    fn before_start(&mut self, args: &[String], workers: &mut Registry) -> i32;

    /// Called exactly once during shutdown, after every live worker was sent
    /// the terminate signal and before stragglers are killed.
    fn after_stop(&mut self) {}
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `before_start` returned this non-zero code; nothing was spawned.
    Aborted(i32),
    /// A termination signal (or the keep-running flag) stopped the run.
    Signaled,
    /// No children were left to wait for.
    Exhausted,
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Aborted(code) => *code,
            Outcome::Signaled | Outcome::Exhausted => 0,
        }
    }
}

enum Stop {
    Signaled,
    Exhausted,
    Failed(Error),
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stop::Signaled => f.write_str("termination requested"),
            Stop::Exhausted => f.write_str("no workers left"),
            Stop::Failed(err) => write!(f, "fatal: {err}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Supervisor
// ---------------------------------------------------------------------------

/// Supervisor context for one run. Replaces process-wide globals: the
/// registry and the keep-running flag live here, and the signal handler only
/// ever sees the flag.
pub struct Supervisor {
    config: SupervisorConfig,
    registry: Registry,
    keep_running: Arc<AtomicBool>,
    fork: fn() -> io::Result<Fork>,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        let registry = Registry::with_capacity(config.max_workers);
        Self {
            config,
            registry,
            keep_running: Arc::new(AtomicBool::new(true)),
            fork: posix::fork,
        }
    }

    #[cfg(test)]
    fn with_fork(mut self, fork: fn() -> io::Result<Fork>) -> Self {
        self.fork = fork;
        self
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// The workers registered by the last run, with their final pids and
    /// spawn counts. Empty before [`run`](Self::run).
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The flag the signal handler clears. Storing `false` from another
    /// thread requests shutdown; the reap cycle notices it at its next
    /// checkpoint.
    pub fn keep_running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.keep_running)
    }

    fn keep_running(&self) -> bool {
        self.keep_running.load(Ordering::SeqCst)
    }

    /// Run the whole lifecycle: hook, spawn, reap, shut down.
    ///
    /// Returns `Err` only for fatal supervisor failures (fork, waitpid or
    /// signal setup); on the fork and waitpid paths shutdown has already run.
    /// A supervisor runs once; later calls fail with [`Error::AlreadyRan`].
    pub fn run<H: Host>(&mut self, host: &mut H, args: &[String]) -> Result<Outcome> {
        if !self.registry.is_open() {
            return Err(Error::AlreadyRan);
        }

        let code = host.before_start(args, &mut self.registry);
        if code != 0 {
            self.registry.close();
            tracing::warn!(code, "before-start hook aborted startup");
            return Ok(Outcome::Aborted(code));
        }

        let guard =
            SignalGuard::install(Arc::clone(&self.keep_running)).map_err(Error::Signal)?;
        self.registry.close();
        tracing::info!(workers = self.registry.len(), "registration closed, spawning");

        let stop = match self.spawn_all() {
            Ok(()) => self.reap_cycle(),
            Err(err) => Stop::Failed(err),
        };
        tracing::info!(reason = %stop, "leaving reap cycle");

        self.shutdown(host);
        if let Err(err) = guard.restore() {
            tracing::warn!(error = %err, "failed to restore signal dispositions");
        }

        match stop {
            Stop::Signaled => Ok(Outcome::Signaled),
            Stop::Exhausted => Ok(Outcome::Exhausted),
            Stop::Failed(err) => Err(err),
        }
    }

    fn spawn_all(&mut self) -> Result<()> {
        for index in 0..self.registry.len() {
            self.spawn(index)?;
        }
        Ok(())
    }

    /// Fork worker `index`. Used for the first launch and for every restart.
    ///
    /// In the child this never returns: the entry point runs and the process
    /// exits. In the parent the new pid is recorded on the descriptor.
    fn spawn(&mut self, index: usize) -> Result<Pid> {
        match (self.fork)() {
            Ok(Fork::Child) => run_worker(&self.registry[index]),
            Ok(Fork::Parent(pid)) => {
                if let Some(worker) = self.registry.get_mut(index) {
                    worker.record_spawn(pid);
                    tracing::info!(
                        worker = worker.name(),
                        index,
                        %pid,
                        restarts = worker.spawn_count() - 1,
                        "spawned worker"
                    );
                }
                Ok(pid)
            }
            Err(source) => Err(Error::Spawn {
                worker: self.registry[index].name().to_owned(),
                source,
            }),
        }
    }

    fn reap_cycle(&mut self) -> Stop {
        loop {
            if !self.keep_running() {
                return Stop::Signaled;
            }

            let (pid, status) = match posix::wait_any() {
                Ok(reaped) => reaped,
                Err(err) => match err.raw_os_error() {
                    Some(libc::EINTR) => continue,
                    Some(libc::ECHILD) => return Stop::Exhausted,
                    _ => return Stop::Failed(Error::Wait(err)),
                },
            };

            let index = self.registry.index_of(pid);
            if let Some(worker) = index.and_then(|i| self.registry.get_mut(i)) {
                worker.mark_reaped();
            }

            // A pending crash report is dropped once shutdown was requested.
            if !self.keep_running() {
                return Stop::Signaled;
            }

            let Some(index) = index else {
                tracing::debug!(%pid, "reaped a child that is not a registered worker");
                continue;
            };

            let termination = Termination::from_wait_status(status);
            let worker = &self.registry[index];
            if !termination.is_abnormal() {
                tracing::debug!(worker = worker.name(), %pid, %termination, "worker finished");
                continue;
            }
            if !worker.restart_on_abnormal_exit() {
                tracing::warn!(worker = worker.name(), %pid, %termination, "worker died, not restarting");
                continue;
            }

            tracing::warn!(worker = worker.name(), %pid, %termination, "worker died, restarting");
            if let Err(err) = self.spawn(index) {
                return Stop::Failed(err);
            }
        }
    }

    /// Terminate, run the after-stop hook, then kill and reap whatever is left.
    fn shutdown<H: Host>(&mut self, host: &mut H) {
        let live: Vec<(usize, Pid)> = self.registry.live_pids().collect();

        for &(_, pid) in &live {
            if let Err(err) = posix::kill(pid, self.config.terminate_signal) {
                tracing::debug!(%pid, error = %err, "terminate signal not delivered");
            }
        }

        host.after_stop();

        for &(index, pid) in &live {
            if let Err(err) = posix::kill(pid, self.config.kill_signal) {
                tracing::debug!(%pid, error = %err, "kill signal not delivered");
            }
            match posix::wait_pid(pid) {
                Ok(_) => {}
                Err(err) if err.raw_os_error() == Some(libc::ECHILD) => {}
                Err(err) => tracing::warn!(%pid, error = %err, "failed to reap worker"),
            }
            if let Some(worker) = self.registry.get_mut(index) {
                worker.mark_reaped();
            }
        }
        tracing::info!(reaped = live.len(), "shutdown complete");
    }
}

/// Child side of a fork. Never returns.
fn run_worker(worker: &WorkerDescriptor) -> ! {
    signals::reset_in_child();
    // A panic must not unwind back into the supervisor's stack in this
    // process; report it to the parent as an abnormal termination.
    match panic::catch_unwind(AssertUnwindSafe(|| worker.invoke())) {
        Ok(()) => {
            // Partial lines are still sitting in the line buffers.
            let _ = io::stdout().flush();
            let _ = io::stderr().flush();
            posix::exit_child(0)
        }
        Err(_) => posix::abort_child(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;

    static FORKS: AtomicUsize = AtomicUsize::new(0);

    /// Real fork for the first call, EAGAIN afterwards.
    fn fork_once() -> io::Result<Fork> {
        if FORKS.fetch_add(1, Ordering::SeqCst) == 0 {
            posix::fork()
        } else {
            Err(io::Error::from_raw_os_error(libc::EAGAIN))
        }
    }

    struct Sleepers {
        after_stop_calls: u32,
    }

    impl Host for Sleepers {
        fn before_start(&mut self, _args: &[String], workers: &mut Registry) -> i32 {
            for _ in 0..2 {
                workers.register(
                    |_: &()| loop {
                        thread::sleep(Duration::from_secs(1));
                    },
                    (),
                    true,
                );
            }
            0
        }

        fn after_stop(&mut self) {
            self.after_stop_calls += 1;
        }
    }

    #[test]
    #[serial]
    fn failed_fork_shuts_down_and_reports_spawn_error() {
        FORKS.store(0, Ordering::SeqCst);
        let mut host = Sleepers { after_stop_calls: 0 };
        let mut supervisor = Supervisor::new(SupervisorConfig::default()).with_fork(fork_once);

        let err = supervisor.run(&mut host, &[]).unwrap_err();
        assert!(matches!(&err, Error::Spawn { worker, .. } if worker == "worker-1"));
        assert_eq!(err.as_label(), "spawn_failed");
        assert_eq!(host.after_stop_calls, 1);

        let workers = supervisor.registry();
        assert_eq!(workers[0].spawn_count(), 1);
        assert!(!workers[0].is_running());
        assert_eq!(workers[1].spawn_count(), 0);
        assert_eq!(workers[1].pid(), None);

        let mut status = 0;
        let ret = unsafe { libc::waitpid(-1, &mut status, libc::WNOHANG) };
        assert_eq!(ret, -1);
        assert_eq!(io::Error::last_os_error().raw_os_error(), Some(libc::ECHILD));
    }

    #[test]
    #[serial]
    fn second_run_is_rejected() {
        struct Empty;
        impl Host for Empty {
            fn before_start(&mut self, _args: &[String], _workers: &mut Registry) -> i32 {
                0
            }
        }

        let mut supervisor = Supervisor::new(SupervisorConfig::default());
        assert_eq!(supervisor.run(&mut Empty, &[]).unwrap(), Outcome::Exhausted);
        assert!(matches!(supervisor.run(&mut Empty, &[]), Err(Error::AlreadyRan)));
    }
}
