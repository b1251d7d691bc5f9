/*!
config.rs - wizard configuration.

Sources (lowest to highest precedence):
  1. built-in defaults (sfdx command names, `json` always pre-selected)
  2. `--config <file>`  (YAML when the extension is .yaml/.yml, JSON otherwise)
  3. `WIZARD_TOOL` environment variable
  4. CLI overrides applied by `main.rs` (--tool / --timeout)

Role hints decide which flags get special-cased questions. A hint matches a
flag when it equals the flag's long name or its switch.
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::wizard::flags::{FlagKind, FlagRole};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Tool command line (shell-split; e.g. "sfdx" or "npx sfdx-cli")
    pub tool: String,
    pub org_list_command: String,
    pub schema_list_command: String,
    pub schema_describe_command: String,
    /// Switches or long names that are always pre-selected
    pub always_default: Vec<String>,
    /// Timeout for discovery calls
    pub timeout_secs: u64,
    /// Timeout for the final assembled command
    pub exec_timeout_secs: u64,
    /// Persisted command log
    pub history_file: PathBuf,
    /// Substrings of a subcommand id that make the field picker offer
    /// updateable instead of createable fields
    pub update_markers: Vec<String>,
    pub roles: RoleHints,
    /// Spinners on stderr; turned off by --quiet
    #[serde(skip)]
    pub show_progress: bool,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            tool: "sfdx".into(),
            org_list_command: "force:org:list".into(),
            schema_list_command: "force:schema:sobject:list".into(),
            schema_describe_command: "force:schema:sobject:describe".into(),
            always_default: vec!["json".into()],
            timeout_secs: 120,
            exec_timeout_secs: 600,
            history_file: PathBuf::from("commands.json"),
            update_markers: vec!["update".into()],
            roles: RoleHints::default(),
            show_progress: true,
        }
    }
}

impl WizardConfig {
    /// Defaults, optionally overlaid with a config file, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let lower = path.to_string_lossy().to_ascii_lowercase();
        let mut cfg: WizardConfig = if lower.ends_with(".yaml") || lower.ends_with(".yml") {
            serde_yaml::from_str(&raw).context("failed to parse YAML config file")?
        } else {
            serde_json::from_str(&raw).context("failed to parse JSON config file")?
        };
        cfg.show_progress = true;
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Ok(tool) = std::env::var("WIZARD_TOOL")
            && !tool.trim().is_empty()
        {
            self.tool = tool.trim().to_string();
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn exec_timeout(&self) -> Duration {
        Duration::from_secs(self.exec_timeout_secs.max(1))
    }

    /// True when `id` names a record-update style subcommand.
    pub fn is_update_command(&self, id: &str) -> bool {
        let lower = id.to_ascii_lowercase();
        self.update_markers
            .iter()
            .any(|m| !m.is_empty() && lower.contains(&m.to_ascii_lowercase()))
    }
}

/// Name/switch lists per special-cased flag role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleHints {
    pub org_target: Vec<String>,
    pub composite_fields: Vec<String>,
    pub schema_object: Vec<String>,
    pub directory_target: Vec<String>,
    pub file_target: Vec<String>,
    /// Boolean flags that switch schema describe to the tooling API
    pub tooling_api: Vec<String>,
}

impl Default for RoleHints {
    fn default() -> Self {
        let v = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            org_target: v(&["targetusername", "-u"]),
            composite_fields: v(&["values"]),
            schema_object: v(&["sobjecttype"]),
            directory_target: v(&[
                "outputdir",
                "directory",
                "targetdir",
                "rootdir",
                "outputfolder",
            ]),
            file_target: v(&["file", "csvfile", "definitionfile", "configfile"]),
            tooling_api: v(&["usetoolingapi"]),
        }
    }
}

impl RoleHints {
    /// Classify a flag. Boolean flags are never special-cased.
    pub fn role_for(&self, name: &str, switch: &str, kind: FlagKind) -> FlagRole {
        if kind == FlagKind::Boolean {
            return FlagRole::Plain;
        }
        let hit = |hints: &[String]| hints.iter().any(|h| h == name || h == switch);
        if hit(&self.org_target) {
            FlagRole::OrgTarget
        } else if hit(&self.composite_fields) {
            FlagRole::CompositeFieldSelector
        } else if hit(&self.schema_object) {
            FlagRole::SchemaObjectSelector
        } else if hit(&self.directory_target) {
            FlagRole::DirectoryTarget
        } else if hit(&self.file_target) {
            FlagRole::FileTarget
        } else {
            FlagRole::Plain
        }
    }

    pub fn is_tooling_flag(&self, name: &str, switch: &str) -> bool {
        self.tooling_api.iter().any(|h| h == name || h == switch)
    }
}
