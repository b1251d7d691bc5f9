//! External tool invocation.
//!
//! parse_tool -> ToolSpec { program, leading args }
//! ToolInvoker: the seam every discovery / execution call goes through
//!   (ProcessInvoker in production, a canned fake in tests).
//! call_json: run `<tool> ... --json`, unwrap the `result` envelope,
//!   surface non-zero exits as `WizardError::Discovery`.
//!
pub mod process;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use shell_words::split as shell_split;
use std::fmt;

use crate::error::{WizardError, WizardResult};
use crate::utils::Progress;

pub use process::ProcessInvoker;

/// Parsed tool command line (e.g. "sfdx" or "npx sfdx-cli").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub original: String,
    pub program: String,
    pub args: Vec<String>,
}

impl ToolSpec {
    /// Full argv for a call: leading tool args followed by `extra`.
    pub fn argv(&self, extra: &[String]) -> Vec<String> {
        self.args.iter().chain(extra.iter()).cloned().collect()
    }

    /// Human-readable invocation, for logs and error messages.
    pub fn render(&self, extra: &[String]) -> String {
        let mut parts = vec![self.original.trim().to_string()];
        parts.extend(extra.iter().cloned());
        parts.join(" ")
    }
}

impl fmt::Display for ToolSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.original.trim())
    }
}

/// Split a tool string with shell rules. Rejects empty input.
pub fn parse_tool(raw: &str) -> Result<ToolSpec> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("Tool string is empty");
    }
    let parts = shell_split(trimmed).context("Failed to parse tool command line (shell splitting)")?;
    let Some((program, args)) = parts.split_first() else {
        bail!("No tokens produced when parsing tool command line");
    };
    if program.is_empty() {
        bail!("Empty program name in tool command line");
    }
    Ok(ToolSpec {
        original: raw.to_string(),
        program: program.clone(),
        args: args.to_vec(),
    })
}

/// Captured result of one tool process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Runs the wrapped tool. `args` excludes the tool itself.
pub trait ToolInvoker {
    fn tool(&self) -> &ToolSpec;

    fn invoke(&self, args: &[String], progress: &Progress) -> WizardResult<ToolOutput>;

    /// Like `invoke`, but with the long timeout used for the final command.
    fn execute(&self, args: &[String], progress: &Progress) -> WizardResult<ToolOutput> {
        self.invoke(args, progress)
    }
}

/// Run a `--json` introspection call and return its `result` payload.
pub fn call_json(invoker: &dyn ToolInvoker, args: &[String], progress: &Progress) -> WizardResult<Value> {
    let out = invoker.invoke(args, progress)?;
    if !out.success() {
        return Err(WizardError::Discovery {
            command: invoker.tool().render(args),
            message: error_message(&out),
        });
    }
    let parsed: Value = serde_json::from_str(out.stdout.trim()).map_err(|e| WizardError::Discovery {
        command: invoker.tool().render(args),
        message: format!("output is not JSON: {e}"),
    })?;
    Ok(match parsed {
        Value::Object(mut map) if map.contains_key("result") => map.remove("result").unwrap_or(Value::Null),
        other => other,
    })
}

/// Best-effort message from a failed call: stderr JSON `message`, else raw text.
pub fn error_message(out: &ToolOutput) -> String {
    let raw = if out.stderr.trim().is_empty() {
        out.stdout.trim()
    } else {
        out.stderr.trim()
    };
    if let Ok(v) = serde_json::from_str::<Value>(raw)
        && let Some(msg) = v.get("message").and_then(|m| m.as_str())
    {
        return msg.to_string();
    }
    if raw.is_empty() {
        format!("exit code {}", out.code)
    } else {
        raw.to_string()
    }
}

/// Final command stdout: JSON when it parses, plain text otherwise.
pub fn parse_stdout(stdout: &str) -> Value {
    serde_json::from_str(stdout.trim()).unwrap_or_else(|_| Value::String(stdout.to_string()))
}
