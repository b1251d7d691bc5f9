/*!
flags.rs - flag catalog normalization.

Turns the tool's raw `commands --json` entries into `CommandDescriptor`s:

  raw flag map (key -> {name, char?, type, description, required, default, options})
      -> Vec<FlagDescriptor> in discovery order
      -> default switches (see `defaults.rs`)

Switch rules:
  - `char` present  -> "-<char>"
  - `char` absent   -> "--<name>"
Unknown `type` values are treated as `option` so the flag stays answerable.
*/

use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

use crate::config::WizardConfig;
use crate::error::{WizardError, WizardResult};
use crate::wizard::defaults::select_defaults;

/* ---- Raw payload ---- */

/// One entry of `<tool> commands --json`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCommand {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Usually a list of strings; some plugins emit a single string.
    #[serde(default)]
    pub examples: Option<Value>,
    /// Key order is discovery order (serde_json `preserve_order`).
    #[serde(default)]
    pub flags: serde_json::Map<String, Value>,
}

impl RawCommand {
    pub fn examples(&self) -> Vec<String> {
        match &self.examples {
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawFlag {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "char")]
    short: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    required: Option<bool>,
    #[serde(default)]
    default: Option<Value>,
    #[serde(default)]
    options: Option<Vec<Value>>,
}

/* ---- Normalized model ---- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Option,
    Boolean,
}

impl FlagKind {
    fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("boolean") => FlagKind::Boolean,
            _ => FlagKind::Option,
        }
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlagKind::Option => "option",
            FlagKind::Boolean => "boolean",
        })
    }
}

/// Decides which question a flag turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagRole {
    Plain,
    FileTarget,
    DirectoryTarget,
    SchemaObjectSelector,
    CompositeFieldSelector,
    OrgTarget,
}

impl fmt::Display for FlagRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlagRole::Plain => "plain",
            FlagRole::FileTarget => "file",
            FlagRole::DirectoryTarget => "directory",
            FlagRole::SchemaObjectSelector => "sobject",
            FlagRole::CompositeFieldSelector => "fields",
            FlagRole::OrgTarget => "org",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlagDescriptor {
    /// Flag name as reported by the tool (e.g. `targetusername`)
    pub long_key: String,
    /// Rendered switch (`-u`, `--json`)
    pub switch: String,
    pub kind: FlagKind,
    pub description: String,
    pub required: bool,
    pub default: Option<Value>,
    pub options: Vec<String>,
    /// Required flags cannot be deselected
    pub disabled: bool,
    pub role: FlagRole,
}

impl FlagDescriptor {
    pub fn is_boolean(&self) -> bool {
        self.kind == FlagKind::Boolean
    }

    /// Declared default rendered as text (for choice / free-text defaults).
    pub fn default_text(&self) -> Option<String> {
        match self.default.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    pub fn defaults_true(&self) -> bool {
        matches!(self.default, Some(Value::Bool(true)))
    }
}

/// Display details shown after a subcommand is chosen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandDetails {
    pub description: Option<String>,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CommandDescriptor {
    pub id: String,
    pub details: CommandDetails,
    pub flags: Vec<FlagDescriptor>,
    pub default_switches: Vec<String>,
}

impl CommandDescriptor {
    /// Look up `id` in the discovered catalog and normalize its flags.
    pub fn describe(id: &str, catalog: &[RawCommand], cfg: &WizardConfig) -> WizardResult<Self> {
        let raw = catalog
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| WizardError::NotFound(id.to_string()))?;
        Ok(Self::from_raw(raw, cfg))
    }

    pub fn from_raw(raw: &RawCommand, cfg: &WizardConfig) -> Self {
        let flags = normalize_flags(&raw.flags, cfg);
        let default_switches = select_defaults(&flags, &cfg.always_default);
        debug!(
            command = %raw.id,
            flags = flags.len(),
            defaults = default_switches.len(),
            "normalized flag catalog"
        );
        Self {
            id: raw.id.clone(),
            details: CommandDetails {
                description: raw.description.clone().filter(|d| !d.trim().is_empty()),
                examples: raw.examples(),
            },
            flags,
            default_switches,
        }
    }

    #[cfg(test)]
    pub fn flag(&self, switch: &str) -> Option<&FlagDescriptor> {
        self.flags.iter().find(|f| f.switch == switch)
    }

    pub fn flag_with_role(&self, role: FlagRole) -> Option<&FlagDescriptor> {
        self.flags.iter().find(|f| f.role == role)
    }

    pub fn required_switches(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|f| f.required)
            .map(|f| f.switch.as_str())
    }
}

/// Normalize a raw flag map. Deterministic: same input, same output.
pub fn normalize_flags(raw: &serde_json::Map<String, Value>, cfg: &WizardConfig) -> Vec<FlagDescriptor> {
    let mut out: Vec<FlagDescriptor> = Vec::with_capacity(raw.len());
    for (key, value) in raw {
        let parsed: RawFlag = match serde_json::from_value(value.clone()) {
            Ok(f) => f,
            Err(e) => {
                warn!(flag = %key, error = %e, "skipping malformed flag metadata");
                continue;
            }
        };
        let flag = normalize_one(key, parsed, cfg);
        if out.iter().any(|f| f.switch == flag.switch) {
            warn!(flag = %key, switch = %flag.switch, "duplicate switch; keeping first");
            continue;
        }
        out.push(flag);
    }
    out
}

fn normalize_one(key: &str, raw: RawFlag, cfg: &WizardConfig) -> FlagDescriptor {
    let name = raw
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| key.to_string());
    let switch = match raw.short.as_deref().map(str::trim) {
        Some(c) if !c.is_empty() => format!("-{c}"),
        _ => format!("--{name}"),
    };
    let kind = FlagKind::from_raw(raw.kind.as_deref());
    let required = raw.required.unwrap_or(false);
    let options = raw
        .options
        .unwrap_or_default()
        .into_iter()
        .map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect();
    let role = cfg.roles.role_for(&name, &switch, kind);
    FlagDescriptor {
        description: raw.description.unwrap_or_else(|| name.clone()),
        long_key: name,
        switch,
        kind,
        required,
        default: raw.default,
        options,
        disabled: required,
        role,
    }
}

/// Parse the `result` array of `<tool> commands --json`.
pub fn parse_catalog(result: Value) -> WizardResult<Vec<RawCommand>> {
    Ok(serde_json::from_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cfg() -> WizardConfig {
        WizardConfig::default()
    }

    fn raw_create() -> RawCommand {
        serde_json::from_value(json!({
            "id": "force:data:record:create",
            "description": "create a record",
            "examples": ["sfdx force:data:record:create -s Account -v \"Name=Acme\""],
            "flags": {
                "json": {"name": "json", "type": "boolean", "description": "format output as json", "default": true},
                "sobjecttype": {"name": "sobjecttype", "char": "s", "type": "option", "description": "object", "required": true},
                "values": {"name": "values", "char": "v", "type": "option", "description": "field values"},
                "targetusername": {"name": "targetusername", "char": "u", "type": "option", "description": "org"},
                "loglevel": {"name": "loglevel", "type": "enum", "options": ["trace", "debug", "info"], "default": "warn"}
            }
        }))
        .unwrap()
    }

    #[test]
    fn switch_synthesis_and_order() {
        let d = CommandDescriptor::from_raw(&raw_create(), &cfg());
        let switches: Vec<&str> = d.flags.iter().map(|f| f.switch.as_str()).collect();
        assert_eq!(switches, vec!["--json", "-s", "-v", "-u", "--loglevel"]);
    }

    #[test]
    fn unknown_type_fails_open_to_option() {
        let d = CommandDescriptor::from_raw(&raw_create(), &cfg());
        let lvl = d.flag("--loglevel").unwrap();
        assert_eq!(lvl.kind, FlagKind::Option);
        assert_eq!(lvl.options, vec!["trace", "debug", "info"]);
        assert_eq!(lvl.default_text().as_deref(), Some("warn"));
    }

    #[test]
    fn roles_and_disabled_mirror_metadata() {
        let d = CommandDescriptor::from_raw(&raw_create(), &cfg());
        let s = d.flag("-s").unwrap();
        assert!(s.required && s.disabled);
        assert_eq!(s.role, FlagRole::SchemaObjectSelector);
        assert_eq!(d.flag("-v").unwrap().role, FlagRole::CompositeFieldSelector);
        assert_eq!(d.flag("-u").unwrap().role, FlagRole::OrgTarget);
        assert_eq!(d.flag("--json").unwrap().role, FlagRole::Plain);
        assert!(!d.flag("--json").unwrap().disabled);
    }

    #[test]
    fn missing_name_uses_map_key() {
        let raw = json!({"apiversion": {"type": "option", "description": "api"}});
        let flags = normalize_flags(raw.as_object().unwrap(), &cfg());
        assert_eq!(flags[0].long_key, "apiversion");
        assert_eq!(flags[0].switch, "--apiversion");
    }

    #[test]
    fn duplicate_switch_keeps_first() {
        let raw = json!({
            "a": {"name": "alpha", "char": "x", "type": "option"},
            "b": {"name": "beta", "char": "x", "type": "boolean"}
        });
        let flags = normalize_flags(raw.as_object().unwrap(), &cfg());
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].long_key, "alpha");
    }

    #[test]
    fn malformed_flag_is_skipped() {
        let raw = json!({"bad": "not an object", "ok": {"name": "ok", "type": "boolean"}});
        let flags = normalize_flags(raw.as_object().unwrap(), &cfg());
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].switch, "--ok");
    }

    #[test]
    fn normalization_is_deterministic() {
        let raw = raw_create();
        let a = normalize_flags(&raw.flags, &cfg());
        let b = normalize_flags(&raw.flags, &cfg());
        assert_eq!(a, b);
        assert_eq!(format!("{a:?}"), format!("{b:?}"));
    }

    #[test]
    fn describe_unknown_id_is_not_found() {
        let catalog = vec![raw_create()];
        let err = CommandDescriptor::describe("force:org:open", &catalog, &cfg()).unwrap_err();
        assert!(matches!(err, WizardError::NotFound(ref id) if id == "force:org:open"));
    }

    #[test]
    fn details_and_examples() {
        let d = CommandDescriptor::describe("force:data:record:create", &[raw_create()], &cfg()).unwrap();
        assert_eq!(d.details.description.as_deref(), Some("create a record"));
        assert_eq!(d.details.examples.len(), 1);
    }

    #[test]
    fn string_examples_are_accepted() {
        let raw: RawCommand = serde_json::from_value(json!({"id": "x", "examples": "sfdx x"})).unwrap();
        assert_eq!(raw.examples(), vec!["sfdx x".to_string()]);
    }

    #[test]
    fn parse_catalog_reads_result_list() {
        let cat = parse_catalog(json!([{"id": "a"}, {"id": "b", "flags": {}}])).unwrap();
        assert_eq!(cat.len(), 2);
        assert!(cat[0].flags.is_empty());
    }
}
