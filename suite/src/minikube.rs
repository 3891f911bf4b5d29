//! Local cluster control through the `minikube` CLI.

use libsuite::error::{Result, SuiteError};
use serde_json::{Value, json};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Captured result of one `minikube` invocation.
#[derive(Debug, Default)]
struct CommandOutput {
    /// Set when the command could not be run or exited non-zero.
    failure: Option<String>,
    stdout: String,
    stderr: String,
}

/// Runs `minikube` subcommands.
#[derive(Debug, Clone)]
pub struct Minikube {
    binary: String,
}

impl Minikube {
    pub fn new<S: Into<String>>(binary: S) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    async fn run(&self, args: &[&str]) -> CommandOutput {
        debug!(binary = %self.binary, ?args, "running minikube");

        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await;

        match output {
            Ok(output) => {
                let failure = (!output.status.success()).then(|| {
                    format!(
                        "Command failed: {} {} ({})",
                        self.binary,
                        args.join(" "),
                        output.status
                    )
                });
                if let Some(failure) = &failure {
                    warn!(error = %failure, "minikube command failed");
                }
                CommandOutput {
                    failure,
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                }
            }
            Err(e) => {
                warn!(binary = %self.binary, error = %e, "failed to run minikube");
                CommandOutput {
                    failure: Some(format!("Failed to run {}: {}", self.binary, e)),
                    ..Default::default()
                }
            }
        }
    }

    /// Cluster status as reported by `minikube status -o json`.
    ///
    /// Never fails. `minikube status` exits non-zero for a stopped cluster,
    /// so JSON on stdout wins regardless of the exit code. Without JSON, a
    /// failed command means the cluster is stopped.
    pub async fn status(&self) -> Value {
        let output = self.run(&["status", "-o", "json"]).await;

        if !output.stdout.trim().is_empty() {
            match serde_json::from_str::<Value>(&output.stdout) {
                Ok(status) => return status,
                Err(e) => warn!(error = %e, "minikube status is not JSON"),
            }
        }

        if output.failure.is_some() {
            return json!({
                "host": "Stopped",
                "kubelet": "Stopped",
                "apiserver": "Stopped",
            });
        }
        json!({ "status": "Unknown", "details": output.stderr })
    }

    /// Starts the cluster and returns the command's stdout.
    pub async fn start(&self) -> Result<String> {
        self.run_checked("start").await
    }

    /// Stops the cluster and returns the command's stdout.
    pub async fn stop(&self) -> Result<String> {
        self.run_checked("stop").await
    }

    /// Fails with stderr (or the failure itself when stderr is empty).
    async fn run_checked(&self, subcommand: &str) -> Result<String> {
        let output = self.run(&[subcommand]).await;
        match output.failure {
            None => Ok(output.stdout),
            Some(failure) if output.stderr.trim().is_empty() => Err(SuiteError::process(failure)),
            Some(_) => Err(SuiteError::process(output.stderr)),
        }
    }
}

impl Default for Minikube {
    fn default() -> Self {
        Self::new("minikube")
    }
}

#[cfg(test)]
#[path = "minikube_tests.rs"]
mod tests;
