//! Error taxonomy for the wizard core.
//!
//! Command modules (`cmd::*`) work in `anyhow::Result` like the rest of the
//! CLI surface; everything underneath returns `WizardResult` so callers can
//! match on the failure kind (fatal discovery vs. degradable lookup vs.
//! user cancellation).

use thiserror::Error;

/// Every failure the wizard core can surface.
#[derive(Debug, Error)]
pub enum WizardError {
    /// A tool introspection call (commands, org list, schema list/describe)
    /// exited non-zero.
    #[error("discovery failed for `{command}`: {message}")]
    Discovery {
        /// The invocation that failed, rendered for display
        command: String,
        /// Message extracted from the tool's stderr payload
        message: String,
    },

    /// The requested subcommand id is not in the discovered catalog.
    #[error("command '{0}' was not found in the discovered catalog")]
    NotFound(String),

    /// An answer was rejected by its question's validator.
    #[error("invalid answer for {key}: {reason}")]
    Validation { key: String, reason: String },

    /// A required flag reached the assembler without an answer.
    #[error("required flag {0} has no collected answer")]
    MissingRequiredFlag(String),

    /// The assembled command exited non-zero.
    #[error("command exited with code {code}: {stderr}")]
    Execution { code: i32, stderr: String },

    /// A tool call exceeded its timeout and was killed.
    #[error("`{command}` did not respond within {timeout_secs}s")]
    ToolUnresponsive { command: String, timeout_secs: u64 },

    /// A question plan contains a guard that looks forward.
    #[error("invalid question plan: {0}")]
    InvalidPlan(String),

    /// The operator picked `Cancel` (or pressed Esc).
    #[error("cancelled by user")]
    Cancelled,

    /// Terminal interaction failed.
    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl WizardError {
    /// Org/schema lookup failures that degrade to free text instead of
    /// aborting the session. A payload of the wrong shape counts too.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            WizardError::Discovery { .. } | WizardError::ToolUnresponsive { .. } | WizardError::Json(_)
        )
    }
}

impl From<dialoguer::Error> for WizardError {
    fn from(e: dialoguer::Error) -> Self {
        WizardError::Prompt(e.to_string())
    }
}

pub type WizardResult<T> = Result<T, WizardError>;
