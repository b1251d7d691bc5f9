/*!
history.rs - saved commands and stored output.

Command log: a JSON array of `{ "value": <command>, "name": <alias> }`,
appended to (never rewritten in place: the new array goes to a sibling temp
file that is renamed over the old one). Entries written by the wizard also
carry `args`, the exact arguments after the tool, since the display `value`
quotes values without escaping them.

Output files: pretty JSON; names are forced to a `.json` extension
(`a.txt` -> `a.json`, `a` -> `a.json`).
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCommand {
    pub value: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

/// Load the log. A missing or empty file is an empty log.
pub fn load(path: &Path) -> Result<Vec<SavedCommand>> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).with_context(|| format!("Failed to read command log {}", path.display())),
    };
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&text).with_context(|| format!("Command log {} is not a JSON array of commands", path.display()))
}

/// Append one entry and return the new log length.
pub fn append(path: &Path, entry: SavedCommand) -> Result<usize> {
    let mut log = load(path)?;
    log.push(entry);
    let body = serde_json::to_string_pretty(&log)?;

    let tmp = sibling_tmp(path);
    fs::write(&tmp, body).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {}", path.display()))?;
    debug!(path = %path.display(), entries = log.len(), "command saved");
    Ok(log.len())
}

fn sibling_tmp(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "commands.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Join commands for one shell line.
pub fn chain<'a>(commands: impl IntoIterator<Item = &'a SavedCommand>) -> String {
    commands
        .into_iter()
        .map(|c| c.value.as_str())
        .collect::<Vec<_>>()
        .join(" && ")
}

pub fn normalize_json_file_name(name: &str) -> String {
    let trimmed = name.trim();
    let stem = Path::new(trimmed)
        .extension()
        .and_then(|_| trimmed.rsplit_once('.'))
        .map(|(stem, _)| stem)
        .unwrap_or(trimmed);
    format!("{stem}.json")
}

/// Write `output` as pretty JSON under the normalized name. Returns the path written.
pub fn write_output(dir: &Path, name: &str, output: &Value) -> Result<PathBuf> {
    let path = dir.join(normalize_json_file_name(name));
    let body = serde_json::to_string_pretty(output)?;
    fs::write(&path, body).with_context(|| format!("Failed to write output to {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn append_creates_and_grows_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("commands.json");
        assert!(load(&path).unwrap().is_empty());

        let first = SavedCommand {
            value: r#"sfdx force:org:open -u "me@example.com""#.into(),
            name: "open".into(),
            args: vec!["force:org:open".into(), "-u".into(), "me@example.com".into()],
        };
        assert_eq!(append(&path, first.clone()).unwrap(), 1);
        let second = SavedCommand {
            value: "sfdx force:org:list --json".into(),
            name: "orgs".into(),
            args: Vec::new(),
        };
        assert_eq!(append(&path, second.clone()).unwrap(), 2);

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[0]["name"], "open");
        assert_eq!(raw[0]["args"][2], "me@example.com");
        assert!(raw[1].get("args").is_none(), "empty args are not written");
        assert_eq!(load(&path).unwrap(), vec![first, second]);
        assert!(!dir.path().join("commands.json.tmp").exists());
    }

    #[test]
    fn entries_without_args_still_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("commands.json");
        fs::write(&path, r#"[{"value": "sfdx force:org:list", "name": "orgs"}]"#).unwrap();
        let log = load(&path).unwrap();
        assert_eq!(log[0].name, "orgs");
        assert!(log[0].args.is_empty());
    }

    #[test]
    fn corrupt_log_is_an_error() {
        let mut f = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        std::io::Write::write_all(&mut f, b"{not json").unwrap();
        assert!(load(f.path()).is_err());
    }

    #[test]
    fn chain_joins_with_and() {
        let log = vec![
            SavedCommand {
                value: "sfdx a".into(),
                name: "a".into(),
                args: Vec::new(),
            },
            SavedCommand {
                value: "sfdx b --json".into(),
                name: "b".into(),
                args: Vec::new(),
            },
        ];
        assert_eq!(chain(&log), "sfdx a && sfdx b --json");
        assert_eq!(chain(&Vec::<SavedCommand>::new()), "");
    }

    #[test]
    fn file_names_forced_to_json() {
        assert_eq!(normalize_json_file_name("a.txt"), "a.json");
        assert_eq!(normalize_json_file_name("a"), "a.json");
        assert_eq!(normalize_json_file_name("log.json"), "log.json");
        assert_eq!(normalize_json_file_name(" out.v1.csv "), "out.v1.json");
    }

    #[test]
    fn output_is_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_output(dir.path(), "result.txt", &json!({"status": 0, "result": {"id": "001"}})).unwrap();
        assert_eq!(path.file_name().unwrap(), "result.json");
        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("\n  \"result\""));
    }
}
