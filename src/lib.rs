// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Fork-based worker supervisor.
// A host registers workers before startup; each runs in its own forked
// process and is restarted or torn down according to its policy and the
// supervisor's termination signals. Anonymous shared memory carries state
// across the process boundary.

mod platform;
pub use platform::Pid;

mod error;
pub use error::{Error, RegistrationRejected, Result};

pub mod config;
pub use config::SupervisorConfig;

pub mod logging;

mod registry;
pub use registry::{Registry, WorkerDescriptor};

pub mod shared;
pub use shared::SharedRegion;

mod signals;

mod termination;
pub use termination::Termination;

mod supervisor;
pub use supervisor::{Host, Outcome, Supervisor};

/// Entry point for a supervised program: set up logging, run `host` under a
/// [`Supervisor`] configured from the environment, and exit the process with
/// the run's exit code (1 if the supervisor itself failed).
pub fn run_main<H: Host>(mut host: H) -> ! {
    logging::init(logging::LogConfig::default().with_env_overrides());

    let args: Vec<String> = std::env::args().collect();
    let mut supervisor = Supervisor::new(SupervisorConfig::default().with_env_overrides());
    let code = match supervisor.run(&mut host, &args) {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            tracing::error!(error = %err, label = err.as_label(), "supervisor failed");
            1
        }
    };
    std::process::exit(code)
}
