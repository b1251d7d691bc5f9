/*!
`list.rs`

Lists the subcommands the wrapped tool reports through `<tool> commands --json`.

  --filter P   fuzzy filter over command ids (best match first)
  --json       machine output

JSON shape:
{
  "status": "ok",
  "tool": "sfdx",
  "filter": "org" | null,
  "count": 2,
  "commands": [ { "id": "force:org:open", "flags": 3, "description": "..." } ]
}
*/

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use crate::cmd::build_invoker;
use crate::cmd::format::{Role, StyleOptions, TableOpts, box_header, color, emoji, table, truncate_ellipsis};
use crate::config::WizardConfig;
use crate::tool::ToolInvoker;
use crate::wizard::search::rank;
use crate::wizard::{RawCommand, discover_commands};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Fuzzy filter over command ids
    #[arg(short, long, value_name = "PATTERN")]
    pub filter: Option<String>,

    /// Output JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn execute_list(args: ListArgs, config: &WizardConfig) -> Result<()> {
    let invoker = build_invoker(config)?;
    let catalog = discover_commands(&invoker, config).context("Could not load the command catalog")?;
    let shown = filter_catalog(&catalog, args.filter.as_deref());
    let tool = invoker.tool().to_string();

    if args.json {
        let items: Vec<_> = shown
            .iter()
            .map(|c| {
                json!({
                    "id": c.id,
                    "flags": c.flags.len(),
                    "description": c.description.clone().unwrap_or_default(),
                })
            })
            .collect();
        println!(
            "{}",
            json!({
                "status": "ok",
                "tool": tool,
                "filter": args.filter,
                "count": items.len(),
                "commands": items,
            })
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    let subtitle = match &args.filter {
        Some(f) => format!("tool={tool} • filter={f}"),
        None => format!("tool={tool}"),
    };
    println!(
        "{}",
        box_header(
            format!("{} Commands ({})", emoji("list", &style), shown.len()),
            Some(subtitle.as_str()),
            &style
        )
    );
    if shown.is_empty() {
        println!("{}", color(Role::Dim, format!("{} (none)", emoji("info", &style)), &style));
        return Ok(());
    }

    println!("{}", table(&["#", "ID", "FLAGS", "DESCRIPTION"], &rows(&shown), TableOpts::default(), &style));
    println!(
        "\n{} {}",
        emoji("info", &style),
        color(Role::Dim, "Use `flag-wizard describe <ID>` to see a command's flags", &style)
    );
    Ok(())
}

/// Catalog entries matching `filter`, best first; everything when absent.
pub fn filter_catalog<'a>(catalog: &'a [RawCommand], filter: Option<&str>) -> Vec<&'a RawCommand> {
    let Some(pattern) = filter else {
        return catalog.iter().collect();
    };
    let ids: Vec<&str> = catalog.iter().map(|c| c.id.as_str()).collect();
    rank(pattern, &ids)
        .into_iter()
        .filter_map(|id| catalog.iter().find(|c| c.id == *id))
        .collect()
}

fn rows(commands: &[&RawCommand]) -> Vec<Vec<String>> {
    commands
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let desc = c.description.as_deref().unwrap_or("").replace('\n', " ");
            vec![
                (i + 1).to_string(),
                c.id.clone(),
                c.flags.len().to_string(),
                truncate_ellipsis(desc.trim(), 90),
            ]
        })
        .collect()
}
