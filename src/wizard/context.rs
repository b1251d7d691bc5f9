/*!
context.rs - org and schema lookups feeding context-sensitive questions.

Two halves:
  - shaping (pure): raw `result` payloads -> OrgCatalog / SObjectField lists
  - `ContextResolver`: issues the tool calls and shapes their output

A missing default org is the `NONE` sentinel entry, never an absent value,
so question defaults built from it are always safe to read.
*/

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use tracing::debug;

use crate::config::WizardConfig;
use crate::error::WizardResult;
use crate::tool::{ToolInvoker, call_json};
use crate::utils::Progress;

pub const NONE_SENTINEL: &str = "NONE";

/* ---- Orgs ---- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrgRole {
    Scratch,
    Connected,
    Sentinel,
}

impl fmt::Display for OrgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrgRole::Scratch => "scratch",
            OrgRole::Connected => "connected",
            OrgRole::Sentinel => "none",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgEntry {
    pub alias: String,
    /// Username passed to `-u`
    pub value: String,
    pub role: OrgRole,
    pub is_default_username: bool,
    pub is_default_dev_hub: bool,
}

impl OrgEntry {
    pub fn none() -> Self {
        Self {
            alias: NONE_SENTINEL.into(),
            value: NONE_SENTINEL.into(),
            role: OrgRole::Sentinel,
            is_default_username: false,
            is_default_dev_hub: false,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.role == OrgRole::Sentinel
    }

    pub fn label(&self) -> String {
        if self.alias == self.value {
            format!("{} [{}]", self.value, self.role)
        } else {
            format!("{} ({}) [{}]", self.alias, self.value, self.role)
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOrg {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    alias: Option<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    is_default_dev_hub_username: bool,
    #[serde(default, deserialize_with = "null_as_false")]
    is_default_username: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOrgList {
    #[serde(default)]
    non_scratch_orgs: Vec<RawOrg>,
    #[serde(default)]
    scratch_orgs: Vec<RawOrg>,
}

#[derive(Debug, Clone)]
pub struct OrgCatalog {
    pub scratch_orgs: Vec<OrgEntry>,
    pub connected_orgs: Vec<OrgEntry>,
    pub default_scratch_org: OrgEntry,
    pub default_dev_hub: OrgEntry,
}

impl OrgCatalog {
    /// Shape the `result` object of the org-list call.
    pub fn shape(result: &Value) -> WizardResult<Self> {
        let raw: RawOrgList = if result.is_null() {
            RawOrgList::default()
        } else {
            serde_json::from_value(result.clone())?
        };
        let scratch_orgs = to_entries(raw.scratch_orgs, OrgRole::Scratch);
        let connected_orgs = to_entries(raw.non_scratch_orgs, OrgRole::Connected);

        let default_scratch_org = scratch_orgs
            .iter()
            .chain(connected_orgs.iter())
            .find(|o| o.is_default_username)
            .cloned()
            .unwrap_or_else(OrgEntry::none);
        let default_dev_hub = connected_orgs
            .iter()
            .find(|o| o.is_default_dev_hub)
            .cloned()
            .unwrap_or_else(OrgEntry::none);

        Ok(Self {
            scratch_orgs,
            connected_orgs,
            default_scratch_org,
            default_dev_hub,
        })
    }

    /// Scratch orgs first, then connected orgs.
    pub fn all(&self) -> impl Iterator<Item = &OrgEntry> {
        self.scratch_orgs.iter().chain(self.connected_orgs.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.scratch_orgs.is_empty() && self.connected_orgs.is_empty()
    }
}

fn to_entries(raw: Vec<RawOrg>, role: OrgRole) -> Vec<OrgEntry> {
    raw.into_iter()
        .filter_map(|o| {
            let username = o.username.filter(|u| !u.trim().is_empty())?;
            let alias = o
                .alias
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| username.clone());
            Some(OrgEntry {
                alias,
                value: username,
                role,
                is_default_username: o.is_default_username,
                is_default_dev_hub: o.is_default_dev_hub_username,
            })
        })
        .collect()
}

/// The tool reports unset indicators as `null`.
fn null_as_false<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(d)?.unwrap_or(false))
}

/* ---- Schema ---- */

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SObjectField {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_false")]
    pub createable: bool,
    #[serde(default, deserialize_with = "null_as_false")]
    pub updateable: bool,
    #[serde(default, deserialize_with = "null_as_false")]
    pub external_id: bool,
    #[serde(default, deserialize_with = "null_as_false")]
    pub name_field: bool,
}

impl SObjectField {
    pub fn display(&self) -> String {
        if self.label.is_empty() || self.label == self.name {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.label)
        }
    }
}

/// Which fields the composite picker offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    Create,
    Update,
}

impl FieldMode {
    pub fn for_command(id: &str, cfg: &WizardConfig) -> Self {
        if cfg.is_update_command(id) {
            FieldMode::Update
        } else {
            FieldMode::Create
        }
    }

    pub fn accepts(&self, field: &SObjectField) -> bool {
        match self {
            FieldMode::Create => field.createable,
            FieldMode::Update => field.updateable,
        }
    }
}

/// Shape `result.fields` of the describe call, keeping only fields `mode` accepts.
pub fn shape_fields(result: &Value, mode: FieldMode) -> WizardResult<Vec<SObjectField>> {
    let fields = match result.get("fields") {
        Some(v) => serde_json::from_value::<Vec<SObjectField>>(v.clone())?,
        None => Vec::new(),
    };
    Ok(fields.into_iter().filter(|f| mode.accepts(f)).collect())
}

/// Shape the object-list `result` (a list of names).
pub fn shape_object_names(result: &Value) -> Vec<String> {
    result
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/* ---- Resolver ---- */

pub struct ContextResolver<'a> {
    invoker: &'a dyn ToolInvoker,
    config: &'a WizardConfig,
}

impl<'a> ContextResolver<'a> {
    pub fn new(invoker: &'a dyn ToolInvoker, config: &'a WizardConfig) -> Self {
        Self { invoker, config }
    }

    pub fn list_orgs(&self) -> WizardResult<OrgCatalog> {
        let args = vec![self.config.org_list_command.clone(), "--json".into()];
        let progress = Progress::start("listing orgs...", self.config.show_progress);
        let result = call_json(self.invoker, &args, &progress);
        let catalog = match result {
            Ok(v) => {
                progress.succeed("orgs listed");
                OrgCatalog::shape(&v)?
            }
            Err(e) => {
                progress.fail("failed listing orgs");
                return Err(e);
            }
        };
        debug!(
            scratch = catalog.scratch_orgs.len(),
            connected = catalog.connected_orgs.len(),
            "org catalog shaped"
        );
        Ok(catalog)
    }

    pub fn list_objects(&self, org: Option<&str>) -> WizardResult<Vec<String>> {
        let mut args = vec![self.config.schema_list_command.clone(), "--json".into()];
        if let Some(u) = org {
            args.push("-u".into());
            args.push(u.to_string());
        }
        let progress = Progress::start("listing objects...", self.config.show_progress);
        match call_json(self.invoker, &args, &progress) {
            Ok(v) => {
                progress.succeed("objects listed");
                Ok(shape_object_names(&v))
            }
            Err(e) => {
                progress.fail("failed listing objects");
                Err(e)
            }
        }
    }

    pub fn describe_object(
        &self,
        object: &str,
        org: Option<&str>,
        tooling: bool,
        mode: FieldMode,
    ) -> WizardResult<Vec<SObjectField>> {
        let mut args = vec![self.config.schema_describe_command.clone(), "--json".into()];
        if let Some(u) = org {
            args.push("-u".into());
            args.push(u.to_string());
        }
        args.push("-s".into());
        args.push(object.to_string());
        if tooling {
            args.push("-t".into());
        }
        let progress = Progress::start(format!("describing {object}..."), self.config.show_progress);
        match call_json(self.invoker, &args, &progress) {
            Ok(v) => {
                progress.succeed(format!("{object} described"));
                shape_fields(&v, mode)
            }
            Err(e) => {
                progress.fail(format!("failed describing {object}"));
                Err(e)
            }
        }
    }
}
