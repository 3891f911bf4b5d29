//! Application context that holds resolved configuration
//!
//! The context is built following the precedence order:
//! 1. Default values
//! 2. Config file values
//! 3. `SUITE_*` environment variables
//! 4. `PORT` environment variable
//! 5. CLI flags
//!
//! Once built, the context is passed as read-only throughout the application.

use libsuite::config::{Config, Environment};
use libsuite::error::{Result, SuiteError};
use std::path::PathBuf;

/// Logging verbosity selected with repeated `-v` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbosityLevel {
    Normal,
    Verbose,
    Debug,
    Trace,
}

impl VerbosityLevel {
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Self::Normal,
            1 => Self::Verbose,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }

    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    pub fn filter_directive(self) -> &'static str {
        match self {
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Values given on the `serve` command line.
#[derive(Debug, Clone, Default)]
pub struct ServeOverrides {
    pub config_path: Option<PathBuf>,
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// Application context with resolved configuration
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: Config,
    pub verbosity: VerbosityLevel,
}

impl AppContext {
    /// Builds the context from the process environment.
    pub fn build(overrides: &ServeOverrides, verbosity: VerbosityLevel) -> Result<Self> {
        Self::build_with_env(
            overrides,
            verbosity,
            Config::environment(),
            std::env::var("PORT").ok(),
        )
    }

    /// Same as [`AppContext::build`] with explicit environment inputs.
    pub fn build_with_env(
        overrides: &ServeOverrides,
        verbosity: VerbosityLevel,
        env: Environment,
        port_env: Option<String>,
    ) -> Result<Self> {
        let mut config = Config::load_with_env(overrides.config_path.as_deref(), env)?;

        if let Some(port) = port_env {
            config.server.port = port.trim().parse().map_err(|_| {
                SuiteError::config(format!("Invalid PORT value: {}", port), None)
            })?;
        }

        if let Some(bind) = &overrides.bind {
            config.server.bind = bind.clone();
        }
        if let Some(port) = overrides.port {
            config.server.port = port;
        }

        Ok(Self { config, verbosity })
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
