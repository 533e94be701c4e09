// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// tracing-subscriber setup for supervisor hosts.
//
// Environment:
//   PROCVISOR_LOG         filter directives (overrides RUST_LOG)
//   PROCVISOR_LOG_FORMAT  pretty | compact | json
//   RUST_LOG              fallback filter

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PROCVISOR_LOG";
pub const LOG_FORMAT_ENV: &str = "PROCVISOR_LOG_FORMAT";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "full" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown log format '{other}' (expected pretty, compact or json)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter used when neither PROCVISOR_LOG nor RUST_LOG is set.
    pub default_filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_filter: "procvisor=info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl LogConfig {
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(format) = std::env::var(LOG_FORMAT_ENV)
            .ok()
            .and_then(|raw| raw.parse().ok())
        {
            self.format = format;
        }
        self
    }

    fn filter(&self) -> EnvFilter {
        std::env::var(LOG_ENV)
            .ok()
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .or_else(|| EnvFilter::try_from_default_env().ok())
            .unwrap_or_else(|| EnvFilter::new(&self.default_filter))
    }
}

/// Install a global stderr subscriber. A second call is a no-op.
pub fn init(config: LogConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_writer(std::io::stderr);

    // try_init fails only if a global subscriber already exists.
    let _ = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
