/*!
`replay.rs`

Pick saved commands from the command log and chain them with ` && `.

  (default)   print the chained line
  --run       execute the picked commands in order, stopping at the first
              failure (same semantics as the chained shell line)
*/

use anyhow::{Context, Result, bail};
use clap::Args;
use shell_words::split as shell_split;
use std::path::PathBuf;

use crate::cmd::format::{Role, StyleOptions, color, emoji};
use crate::cmd::{build_invoker, unless_cancelled};
use crate::config::WizardConfig;
use crate::error::WizardError;
use crate::history::{self, SavedCommand};
use crate::tool::{ToolInvoker, ToolSpec, error_message, parse_stdout};
use crate::utils::Progress;
use crate::wizard::answers::{Answer, QuestionKey};
use crate::wizard::plan::{Choice, QuestionKind, QuestionSpec, Validator};
use crate::wizard::prompt::require_terminal;
use crate::wizard::{Session, TerminalPrompter};

const REPLAY_KEY: QuestionKey = QuestionKey::Step("replay");

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Command log to read (defaults to the configured history file)
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Execute the picked commands instead of printing them
    #[arg(long)]
    pub run: bool,
}

pub fn execute_replay(args: ReplayArgs, config: &WizardConfig) -> Result<()> {
    let style = StyleOptions::detect();
    let path = args.file.clone().unwrap_or_else(|| config.history_file.clone());
    let log = history::load(&path)?;
    if log.is_empty() {
        println!(
            "{} {}",
            emoji("info", &style),
            color(Role::Dim, format!("no saved commands in {}", path.display()), &style)
        );
        return Ok(());
    }
    require_terminal()?;

    let invoker = build_invoker(config)?;
    let mut prompter = TerminalPrompter::new();
    let mut session = Session::new(&mut prompter, &invoker, config);
    if unless_cancelled(session.ask_batch(&[replay_question(&log)]))?.is_none() {
        return Ok(());
    }
    let picked = picked_commands(&log, session.answers().get(&REPLAY_KEY));

    if !args.run {
        println!("{}", history::chain(picked.iter().copied()));
        return Ok(());
    }

    for cmd in picked {
        let tool_args = replay_args(invoker.tool(), cmd)?;
        println!("{} {}", emoji("rocket", &style), color(Role::Bold, &cmd.value, &style));
        let progress = Progress::start(format!("running {}...", cmd.name), config.show_progress);
        let out = invoker.execute(&tool_args, &progress)?;
        if !out.success() {
            progress.fail(format!("{} failed", cmd.name));
            return Err(WizardError::Execution {
                code: out.code,
                stderr: error_message(&out),
            })
            .with_context(|| format!("saved command '{}' failed", cmd.name));
        }
        progress.succeed(format!("{} finished", cmd.name));
        let output = parse_stdout(&out.stdout);
        match output {
            serde_json::Value::String(s) => println!("{}", s.trim_end()),
            other => println!("{}", serde_json::to_string_pretty(&other)?),
        }
    }
    Ok(())
}

fn replay_question(log: &[SavedCommand]) -> QuestionSpec {
    let choices = log
        .iter()
        .enumerate()
        .map(|(i, c)| Choice::new(format!("{}: {}", c.name, c.value), i.to_string()))
        .collect();
    QuestionSpec::new(REPLAY_KEY, QuestionKind::MultiSelect, "Commands to chain")
        .with_choices(choices)
        .validated(Validator::AtLeastOne)
}

/// Picked entries in log order.
fn picked_commands<'a>(log: &'a [SavedCommand], answer: Option<&Answer>) -> Vec<&'a SavedCommand> {
    let picked = answer.and_then(Answer::as_many).unwrap_or(&[]);
    log.iter()
        .enumerate()
        .filter(|(i, _)| picked.iter().any(|p| *p == i.to_string()))
        .map(|(_, c)| c)
        .collect()
}

/// Recorded arguments when the entry has them, else the re-split display line.
fn replay_args(tool: &ToolSpec, cmd: &SavedCommand) -> Result<Vec<String>> {
    if cmd.args.is_empty() {
        strip_tool(tool, &cmd.value)
    } else {
        Ok(cmd.args.clone())
    }
}

/// Arguments after the configured tool prefix of a saved command line.
fn strip_tool(tool: &ToolSpec, line: &str) -> Result<Vec<String>> {
    let words = shell_split(line).with_context(|| format!("Cannot parse saved command: {line}"))?;
    let prefix: Vec<String> = std::iter::once(tool.program.clone()).chain(tool.args.iter().cloned()).collect();
    if words.len() < prefix.len() || words[..prefix.len()] != prefix[..] {
        bail!("saved command does not start with `{tool}`: {line}");
    }
    Ok(words[prefix.len()..].to_vec())
}
