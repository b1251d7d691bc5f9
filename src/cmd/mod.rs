/*!
Command dispatcher module.

Layout:
  src/cmd/
    mod.rs        (this file: declarations, re-exports, shared helpers)
    wizard.rs     (WizardArgs   + execute_wizard)
    list.rs       (ListArgs     + execute_list)
    describe.rs   (DescribeArgs + execute_describe)
    replay.rs     (ReplayArgs   + execute_replay)
    format.rs     (boxes / tables / colors for human output)

Conventions:
  - Each subcommand module exposes one public `execute_*` function that takes
    its args plus the resolved `WizardConfig` and returns `anyhow::Result<()>`.
  - Argument structs derive `clap::Args`.
  - `--json` output is printed as a single JSON document and never passes
    through `format`.
*/

pub mod describe;
pub mod format;
pub mod list;
pub mod replay;
pub mod wizard;

pub use describe::{DescribeArgs, execute_describe};
pub use list::{ListArgs, execute_list};
pub use replay::{ReplayArgs, execute_replay};
pub use wizard::{WizardArgs, execute_wizard};

use anyhow::{Context, Result};

use crate::config::WizardConfig;
use crate::error::{WizardError, WizardResult};
use crate::tool::{ProcessInvoker, parse_tool};

/// Process invoker for the configured tool and timeouts.
pub(crate) fn build_invoker(config: &WizardConfig) -> Result<ProcessInvoker> {
    let spec = parse_tool(&config.tool).with_context(|| format!("Invalid tool command line: '{}'", config.tool))?;
    ProcessInvoker::new(spec, config.timeout(), config.exec_timeout())
}

/// `Cancelled` becomes `Ok(None)`; other errors pass through.
pub(crate) fn unless_cancelled<T>(result: WizardResult<T>) -> Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(WizardError::Cancelled) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_not_an_error() {
        assert!(matches!(unless_cancelled::<()>(Err(WizardError::Cancelled)), Ok(None)));
        assert!(matches!(unless_cancelled(Ok(3)), Ok(Some(3))));
        assert!(unless_cancelled::<()>(Err(WizardError::NotFound("x".into()))).is_err());
    }

    #[test]
    fn invoker_rejects_blank_tool() {
        let cfg = WizardConfig {
            tool: "   ".into(),
            ..WizardConfig::default()
        };
        assert!(build_invoker(&cfg).is_err());
    }
}
