/*!
`describe.rs`

Shows the normalized flag catalog for one subcommand: switch, kind, whether
it is required, the special role the wizard gives it, and which switches
would be pre-selected.

JSON shape:
{
  "status": "ok",
  "id": "force:data:record:create",
  "description": "...",
  "examples": ["..."],
  "defaults": ["-s", "-v", "--json"],
  "flags": [
    { "switch": "-s", "name": "sobjecttype", "kind": "option", "required": true,
      "role": "sobject", "default": null, "options": [], "description": "..." }
  ]
}
*/

use anyhow::{Context, Result, anyhow};
use clap::Args;
use serde_json::{Value, json};

use crate::cmd::build_invoker;
use crate::cmd::format::{Role, StyleOptions, TableOpts, box_header, color, emoji, table};
use crate::config::WizardConfig;
use crate::error::WizardError;
use crate::wizard::search::best_match;
use crate::wizard::{CommandDescriptor, RawCommand, discover_commands};

#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Subcommand id (e.g. force:org:open)
    pub id: String,

    /// Output JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn execute_describe(args: DescribeArgs, config: &WizardConfig) -> Result<()> {
    let invoker = build_invoker(config)?;
    let catalog = discover_commands(&invoker, config).context("Could not load the command catalog")?;
    let desc = lookup(&args.id, &catalog, config)?;

    if args.json {
        println!("{}", describe_json(&desc));
        return Ok(());
    }

    let style = StyleOptions::detect();
    let subtitle = format!(
        "{} flags • {} pre-selected",
        desc.flags.len(),
        desc.default_switches.len()
    );
    println!("{}", box_header(&desc.id, Some(subtitle.as_str()), &style));
    if let Some(text) = &desc.details.description {
        println!("{}\n", color(Role::Secondary, text, &style));
    }
    if desc.flags.is_empty() {
        println!("{}", color(Role::Dim, format!("{} (no flags)", emoji("info", &style)), &style));
    } else {
        println!(
            "{}",
            table(
                &["SWITCH", "KIND", "REQ", "ROLE", "DESCRIPTION"],
                &flag_rows(&desc),
                TableOpts::default(),
                &style
            )
        );
    }
    if !desc.default_switches.is_empty() {
        println!(
            "\n{} {}",
            color(Role::Accent, "Pre-selected:", &style),
            desc.default_switches.join(" ")
        );
    }
    for ex in &desc.details.examples {
        println!("  {}", color(Role::Dim, ex, &style));
    }
    Ok(())
}

/// Exact lookup; a miss suggests the closest id.
fn lookup(id: &str, catalog: &[RawCommand], config: &WizardConfig) -> Result<CommandDescriptor> {
    match CommandDescriptor::describe(id, catalog, config) {
        Ok(desc) => Ok(desc),
        Err(e @ WizardError::NotFound(_)) => {
            let ids: Vec<&str> = catalog.iter().map(|c| c.id.as_str()).collect();
            match best_match(id, &ids) {
                Some(closest) => Err(anyhow!("{e} (did you mean '{closest}'?)")),
                None => Err(e.into()),
            }
        }
        Err(e) => Err(e.into()),
    }
}

pub fn describe_json(desc: &CommandDescriptor) -> Value {
    let flags: Vec<Value> = desc
        .flags
        .iter()
        .map(|f| {
            json!({
                "switch": f.switch,
                "name": f.long_key,
                "kind": f.kind.to_string(),
                "required": f.required,
                "role": f.role.to_string(),
                "default": f.default,
                "options": f.options,
                "description": f.description,
            })
        })
        .collect();
    json!({
        "status": "ok",
        "id": desc.id,
        "description": desc.details.description,
        "examples": desc.details.examples,
        "defaults": desc.default_switches,
        "flags": flags,
    })
}

fn flag_rows(desc: &CommandDescriptor) -> Vec<Vec<String>> {
    desc.flags
        .iter()
        .map(|f| {
            vec![
                f.switch.clone(),
                f.kind.to_string(),
                if f.required { "yes".into() } else { String::new() },
                f.role.to_string(),
                f.description.replace('\n', " "),
            ]
        })
        .collect()
}
