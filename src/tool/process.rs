//! Process-backed `ToolInvoker`.
//!
//! Each call spawns the tool via `tokio::process`, bounded by a timeout.
//! On expiry the child is killed (kill_on_drop) and the call fails with
//! `ToolUnresponsive` instead of hanging the wizard.

use anyhow::{Context, Result};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, trace};

use super::{ToolInvoker, ToolOutput, ToolSpec};
use crate::error::{WizardError, WizardResult};
use crate::utils::Progress;

pub struct ProcessInvoker {
    spec: ToolSpec,
    timeout: Duration,
    exec_timeout: Duration,
    runtime: tokio::runtime::Runtime,
}

impl ProcessInvoker {
    pub fn new(spec: ToolSpec, timeout: Duration, exec_timeout: Duration) -> Result<Self> {
        let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
        Ok(Self {
            spec,
            timeout,
            exec_timeout,
            runtime,
        })
    }

    fn run(&self, args: &[String], limit: Duration) -> WizardResult<ToolOutput> {
        let argv = self.spec.argv(args);
        let rendered = self.spec.render(args);
        debug!(command = %rendered, timeout_secs = limit.as_secs(), "spawning tool");

        let mut cmd = Command::new(&self.spec.program);
        cmd.args(&argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let outcome = self
            .runtime
            .block_on(async { tokio::time::timeout(limit, cmd.output()).await });

        let output = match outcome {
            Ok(res) => res?,
            Err(_) => {
                return Err(WizardError::ToolUnresponsive {
                    command: rendered,
                    timeout_secs: limit.as_secs(),
                });
            }
        };

        let out = ToolOutput {
            // Signal-terminated processes have no code.
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        trace!(code = out.code, stdout_len = out.stdout.len(), "tool finished");
        Ok(out)
    }
}

impl ToolInvoker for ProcessInvoker {
    fn tool(&self) -> &ToolSpec {
        &self.spec
    }

    fn invoke(&self, args: &[String], progress: &Progress) -> WizardResult<ToolOutput> {
        progress.note(self.spec.render(args));
        self.run(args, self.timeout)
    }

    fn execute(&self, args: &[String], progress: &Progress) -> WizardResult<ToolOutput> {
        progress.note(self.spec.render(args));
        self.run(args, self.exec_timeout)
    }
}
