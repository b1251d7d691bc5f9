use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod config;
mod error;
mod history;
mod tool;
mod utils;
mod wizard;

#[cfg(test)]
mod testing;

use cmd::{DescribeArgs, ListArgs, ReplayArgs, WizardArgs};
use config::WizardConfig;

/// Flag Wizard - build `sfdx`-style commands interactively
///
/// Command layout:
///   flag-wizard [wizard] [SKIP_INTRO] [COMMAND_SO_FAR] [--dry-run]
///   flag-wizard list [--filter P] [--json]
///   flag-wizard describe <ID> [--json]
///   flag-wizard replay [--file F] [--run]
///
/// Global flags / env:
///   -v / -vv / -vvv   Increase verbosity (RUST_LOG overrides)
///   -q / --quiet      Errors only, no spinners
///   --tool            Tool command line (or WIZARD_TOOL env; default "sfdx")
///   --config          YAML / JSON config file
///   --timeout         Seconds before a discovery call is abandoned
///
/// Examples:
///   flag-wizard
///   flag-wizard wizard true force:org:open
///   flag-wizard list --filter soql
///   flag-wizard describe force:data:record:create --json
///   flag-wizard --tool "npx sfdx-cli" wizard --dry-run
#[derive(Parser, Debug)]
#[command(
    name = "flag-wizard",
    version,
    author,
    about = "Flag Wizard - interactive command builder for sfdx-style CLIs",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Tool command line to wrap (e.g. "sfdx" or "npx sfdx-cli")
    #[arg(long, global = true, value_name = "TOOL")]
    tool: Option<String>,

    /// Config file (YAML when .yaml/.yml, JSON otherwise)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Timeout in seconds for discovery calls
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a command interactively (default)
    Wizard(WizardArgs),

    /// List the tool's subcommands
    List(ListArgs),

    /// Show one subcommand's flags as the wizard sees them
    Describe(DescribeArgs),

    /// Chain or re-run saved commands
    Replay(ReplayArgs),
}

/// Resolve config: defaults -> file -> env -> CLI.
fn resolve_config(cli: &Cli) -> Result<WizardConfig> {
    let mut config = WizardConfig::load(cli.config.as_deref())?;
    if let Some(tool) = cli.tool.as_ref().filter(|t| !t.trim().is_empty()) {
        config.tool = tool.clone();
    }
    if let Some(secs) = cli.timeout {
        config.timeout_secs = secs;
    }
    config.show_progress = !cli.quiet;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let config = resolve_config(&cli)?;
    tracing::debug!(tool = %config.tool, timeout_secs = config.timeout_secs, "configuration resolved");

    match cli.command {
        None => cmd::execute_wizard(WizardArgs::default(), &config),
        Some(Commands::Wizard(args)) => cmd::execute_wizard(args, &config),
        Some(Commands::List(args)) => cmd::execute_list(args, &config),
        Some(Commands::Describe(args)) => cmd::execute_describe(args, &config),
        Some(Commands::Replay(args)) => cmd::execute_replay(args, &config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_wizard() {
        let cli = Cli::try_parse_from(["flag-wizard", "-vv"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_overrides_config() {
        let cli = Cli::try_parse_from(["flag-wizard", "--tool", "npx sfdx-cli", "--timeout", "5", "-q", "list"]).unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.tool, "npx sfdx-cli");
        assert_eq!(config.timeout_secs, 5);
        assert!(!config.show_progress);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["flag-wizard", "describe", "force:org:open", "--json", "-v"]).unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, Some(Commands::Describe(ref a)) if a.id == "force:org:open" && a.json));
    }
}
