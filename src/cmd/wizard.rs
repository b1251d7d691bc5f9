/*!
`wizard.rs`

Interactive flow (the default subcommand):

  intro banner (unless SKIP_INTRO is true)
  discover `<tool> commands --json`            fatal on failure
  subcommand -> flags -> org -> values -> fields
  print the assembled command                  stop here with --dry-run
  optionally save it to the command log
  execute it (long timeout)                    non-zero exit -> error with stderr
  print the output, optionally store it as JSON

Picking `Cancel` (or Esc) at any prompt before execution ends the run
without executing anything.
*/

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji};
use crate::cmd::{build_invoker, unless_cancelled};
use crate::config::WizardConfig;
use crate::error::WizardError;
use crate::history::{self, SavedCommand};
use crate::tool::{ToolInvoker, error_message, parse_stdout};
use crate::utils::Progress;
use crate::wizard::prompt::require_terminal;
use crate::wizard::{CommandDescriptor, Session, TerminalPrompter, discover_commands};

#[derive(Args, Debug, Default)]
pub struct WizardArgs {
    /// Skip the intro banner (true|false)
    #[arg(value_name = "SKIP_INTRO")]
    pub skip_intro: Option<bool>,

    /// Command typed so far; an exact id skips the command question
    #[arg(value_name = "COMMAND_SO_FAR")]
    pub command_so_far: Option<String>,

    /// Print the assembled command without running it
    #[arg(long)]
    pub dry_run: bool,
}

pub fn execute_wizard(args: WizardArgs, config: &WizardConfig) -> Result<()> {
    let style = StyleOptions::detect();
    let invoker = build_invoker(config)?;

    if !args.skip_intro.unwrap_or(false) {
        println!("{}", intro(&invoker.tool().to_string(), &style));
    }
    require_terminal()?;

    let catalog = discover_commands(&invoker, config).context("Could not load the command catalog")?;

    let mut prompter = TerminalPrompter::new();
    let mut session = Session::new(&mut prompter, &invoker, config);
    let run = session.run(&catalog, args.command_so_far.as_deref(), |desc| {
        print_details(desc, &style)
    });
    let Some(props) = unless_cancelled(run)? else {
        println!("{}", cancelled_line(&style));
        return Ok(());
    };

    println!(
        "\n{} {}",
        emoji("wand", &style),
        color(Role::Bold, &props.command, &style)
    );
    if args.dry_run {
        return Ok(());
    }

    match unless_cancelled(session.ask_save_name())? {
        Some(Some(name)) => {
            let entry = SavedCommand {
                value: props.command.clone(),
                name,
                args: props.argv.clone(),
            };
            let count = history::append(&config.history_file, entry)?;
            println!(
                "{} {}",
                emoji("save", &style),
                color(
                    Role::Dim,
                    format!("saved to {} ({count} commands)", config.history_file.display()),
                    &style
                )
            );
        }
        Some(None) => {}
        None => {
            println!("{}", cancelled_line(&style));
            return Ok(());
        }
    }

    let progress = Progress::start(format!("running {}...", props.subcommand), config.show_progress);
    let out = invoker.execute(&props.argv, &progress)?;
    if !out.success() {
        progress.fail(format!("{} failed", props.subcommand));
        return Err(WizardError::Execution {
            code: out.code,
            stderr: error_message(&out),
        }
        .into());
    }
    progress.succeed(format!("{} finished", props.subcommand));

    let output = parse_stdout(&out.stdout);
    println!("{}", render_output(&output));

    if let Some(Some(file)) = unless_cancelled(session.ask_output_file())? {
        let dir = std::env::current_dir().context("Failed to resolve the current directory")?;
        let path = history::write_output(&dir, &file, &output)?;
        println!(
            "{} {}",
            emoji("success", &style),
            color(Role::Success, format!("output stored in {}", path.display()), &style)
        );
    }
    Ok(())
}

fn intro(tool: &str, style: &StyleOptions) -> String {
    let subtitle = format!("Build a `{tool}` command step by step.\nPick Cancel (or press Esc) at any menu to stop.");
    box_header(
        format!("{} Flag Wizard", emoji("rocket", style)),
        Some(subtitle.as_str()),
        style,
    )
}

fn print_details(desc: &CommandDescriptor, style: &StyleOptions) {
    if let Some(text) = &desc.details.description {
        println!("{} {}", emoji("info", style), color(Role::Secondary, text, style));
    }
    if !desc.details.examples.is_empty() {
        println!("{}", color(Role::Accent, "Examples:", style));
        for ex in &desc.details.examples {
            println!("  {}", color(Role::Dim, ex, style));
        }
    }
}

fn cancelled_line(style: &StyleOptions) -> String {
    format!(
        "{} {}",
        emoji("warn", style),
        color(Role::Warning, "cancelled; nothing was executed", style)
    )
}

/// Pretty JSON for structured output, raw text otherwise.
fn render_output(output: &Value) -> String {
    match output {
        Value::String(s) => s.trim_end().to_string(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
