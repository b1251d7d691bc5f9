/*!
plan.rs - question specifications and the plan builders.

Batches, in the order a session runs them:
  1. subcommand_question       autocomplete over discovered ids
  2. flag_selection_question   multi-select, pre-checked defaults
  3. org_question              guarded on the org switch being selected
  4. build_plan                one question per remaining selected flag
  5. field_plan                composite field picker + one value per field

Per-flag dispatch (build_plan), in catalog order:
  boolean                 -> ConfirmBoolean
  option with options     -> SingleChoice
  DirectoryTarget         -> DirectoryPicker (cwd)
  FileTarget              -> FilePicker (cwd)
  SchemaObjectSelector    -> AutocompleteList (object names, default "Account")
  otherwise               -> FreeText (non-empty)
OrgTarget and CompositeFieldSelector flags never get a question here.

Guards may only look backwards: `validate_ordering` rejects a batch whose
guard references a key that is neither answered already nor asked earlier
in the same batch.
*/

use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::{WizardError, WizardResult};
use crate::wizard::answers::{Answer, Answers, QuestionKey};
use crate::wizard::context::{OrgCatalog, SObjectField};
use crate::wizard::flags::{CommandDescriptor, FlagDescriptor, FlagRole, RawCommand};

pub const DEFAULT_SOBJECT: &str = "Account";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    FreeText,
    SingleChoice,
    ConfirmBoolean,
    FilePicker,
    DirectoryPicker,
    AutocompleteList,
    MultiSelect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub value: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn plain(value: impl Into<String>) -> Self {
        let v = value.into();
        Self {
            label: v.clone(),
            value: v,
        }
    }
}

/// Predicate over earlier answers deciding whether a question is asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    Always,
    /// The switch is among the selected flags
    FlagSelected(String),
    /// A multi-select (or text) answer contains `value`
    Contains { key: QuestionKey, value: String },
    /// A confirm answer is true
    Confirmed(QuestionKey),
}

impl Guard {
    pub fn allows(&self, answers: &Answers) -> bool {
        match self {
            Guard::Always => true,
            Guard::FlagSelected(switch) => answers.is_selected(switch),
            Guard::Contains { key, value } => answers.get(key).is_some_and(|a| a.contains(value)),
            Guard::Confirmed(key) => answers.get(key).is_some_and(Answer::is_truthy),
        }
    }

    /// The earlier answer this guard reads, if any.
    pub fn references(&self) -> Option<QuestionKey> {
        match self {
            Guard::Always => None,
            Guard::FlagSelected(_) => Some(QuestionKey::FlagSelection),
            Guard::Contains { key, .. } | Guard::Confirmed(key) => Some(key.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    None,
    /// Reject empty / whitespace-only text
    NonEmpty,
    /// Value must be one of the question's choices
    OneOf,
    /// Multi-select must pick something
    AtLeastOne,
}

#[derive(Debug, Clone)]
pub struct QuestionSpec {
    pub key: QuestionKey,
    pub kind: QuestionKind,
    pub prompt: String,
    pub default: Option<Answer>,
    pub choices: Vec<Choice>,
    /// Root directory for file / directory pickers
    pub root: Option<PathBuf>,
    pub guard: Guard,
    pub validator: Validator,
}

impl QuestionSpec {
    pub fn new(key: QuestionKey, kind: QuestionKind, prompt: impl Into<String>) -> Self {
        Self {
            key,
            kind,
            prompt: prompt.into(),
            default: None,
            choices: Vec::new(),
            root: None,
            guard: Guard::Always,
            validator: Validator::None,
        }
    }

    pub fn with_default(mut self, default: Option<Answer>) -> Self {
        self.default = default;
        self
    }

    pub fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = choices;
        self
    }

    pub fn with_root(mut self, root: PathBuf) -> Self {
        self.root = Some(root);
        self
    }

    pub fn guarded(mut self, guard: Guard) -> Self {
        self.guard = guard;
        self
    }

    pub fn validated(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Check a candidate answer; `Err` carries the message shown before re-asking.
    pub fn validate(&self, answer: &Answer) -> Result<(), String> {
        match self.validator {
            Validator::None => Ok(()),
            Validator::NonEmpty => {
                if answer.is_blank() {
                    Err("Must enter a value".into())
                } else {
                    Ok(())
                }
            }
            Validator::OneOf => {
                let Some(v) = answer.as_text() else {
                    return Err("expected a single value".into());
                };
                if self.choices.iter().any(|c| c.value == v) {
                    Ok(())
                } else {
                    Err(format!("{v} was not found in the list"))
                }
            }
            Validator::AtLeastOne => {
                if answer.is_blank() {
                    Err("You must choose at least one option.".into())
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Position of the default among `choices` (pickers start there).
    pub fn default_index(&self) -> Option<usize> {
        let value = self.default.as_ref()?.as_text()?;
        self.choices.iter().position(|c| c.value == value)
    }
}

/// Inputs for `build_plan` that are not flags.
#[derive(Debug, Clone, Default)]
pub struct PlanContext {
    pub cwd: PathBuf,
    /// Object names for the schema-object selector; `None` when unavailable
    pub schema_objects: Option<Vec<String>>,
}

/* ---- Batch builders ---- */

pub fn subcommand_question(catalog: &[RawCommand], default: Option<&str>) -> QuestionSpec {
    let choices = catalog.iter().map(|c| Choice::plain(c.id.clone())).collect();
    QuestionSpec::new(QuestionKey::Subcommand, QuestionKind::AutocompleteList, "Choose a Command :")
        .with_choices(choices)
        .with_default(default.map(Answer::text))
        .validated(Validator::OneOf)
}

pub fn flag_selection_question(desc: &CommandDescriptor) -> QuestionSpec {
    let choices = desc
        .flags
        .iter()
        .map(|f| {
            let lock = if f.disabled { " (required)" } else { "" };
            Choice::new(format!("{} {}{lock}", f.switch, f.description), f.switch.clone())
        })
        .collect();
    QuestionSpec::new(QuestionKey::FlagSelection, QuestionKind::MultiSelect, "Select flags")
        .with_choices(choices)
        .with_default(Some(Answer::Many(desc.default_switches.clone())))
        .validated(Validator::AtLeastOne)
}

/// Org picker for the target-org flag; asked only when that flag was selected.
pub fn org_question(flag: &FlagDescriptor, orgs: Option<&OrgCatalog>) -> QuestionSpec {
    let guard = Guard::FlagSelected(flag.switch.clone());
    let key = QuestionKey::Flag(flag.switch.clone());
    match orgs {
        Some(cat) if !cat.is_empty() => {
            let choices = cat.all().map(|o| Choice::new(o.label(), o.value.clone())).collect();
            let default = (!cat.default_scratch_org.is_sentinel())
                .then(|| Answer::text(cat.default_scratch_org.value.clone()));
            QuestionSpec::new(key, QuestionKind::AutocompleteList, &flag.description)
                .with_choices(choices)
                .with_default(default)
                .guarded(guard)
                .validated(Validator::OneOf)
        }
        // No catalog (lookup failed or empty): ask for the username directly.
        _ => QuestionSpec::new(key, QuestionKind::FreeText, &flag.description)
            .guarded(guard)
            .validated(Validator::NonEmpty),
    }
}

/// One question per selected flag, in catalog order.
pub fn build_plan(selected: &[&FlagDescriptor], ctx: &PlanContext) -> Vec<QuestionSpec> {
    selected
        .iter()
        .filter(|f| !matches!(f.role, FlagRole::OrgTarget | FlagRole::CompositeFieldSelector))
        .map(|f| flag_question(f, ctx))
        .collect()
}

fn flag_question(flag: &FlagDescriptor, ctx: &PlanContext) -> QuestionSpec {
    let key = QuestionKey::Flag(flag.switch.clone());
    let prompt = flag.description.as_str();

    if flag.is_boolean() {
        let default = flag.default.as_ref().and_then(|v| v.as_bool()).unwrap_or(false);
        return QuestionSpec::new(key, QuestionKind::ConfirmBoolean, prompt)
            .with_default(Some(Answer::Bool(default)));
    }

    if !flag.options.is_empty() {
        let choices = flag.options.iter().cloned().map(Choice::plain).collect();
        return QuestionSpec::new(key, QuestionKind::SingleChoice, prompt)
            .with_choices(choices)
            .with_default(flag.default_text().map(Answer::Text))
            .validated(Validator::OneOf);
    }

    match flag.role {
        FlagRole::DirectoryTarget => QuestionSpec::new(key, QuestionKind::DirectoryPicker, prompt)
            .with_root(ctx.cwd.clone())
            .with_default(flag.default_text().map(Answer::Text))
            .validated(Validator::NonEmpty),
        FlagRole::FileTarget => QuestionSpec::new(key, QuestionKind::FilePicker, prompt)
            .with_root(ctx.cwd.clone())
            .with_default(flag.default_text().map(Answer::Text))
            .validated(Validator::NonEmpty),
        FlagRole::SchemaObjectSelector => match &ctx.schema_objects {
            Some(names) if !names.is_empty() => {
                QuestionSpec::new(key, QuestionKind::AutocompleteList, prompt)
                    .with_choices(names.iter().cloned().map(Choice::plain).collect())
                    .with_default(Some(Answer::text(DEFAULT_SOBJECT)))
                    .validated(Validator::OneOf)
            }
            _ => QuestionSpec::new(key, QuestionKind::FreeText, prompt)
                .with_default(Some(Answer::text(DEFAULT_SOBJECT)))
                .validated(Validator::NonEmpty),
        },
        _ => QuestionSpec::new(key, QuestionKind::FreeText, prompt)
            .with_default(flag.default_text().map(Answer::Text))
            .validated(Validator::NonEmpty),
    }
}

/// Field picker plus one guarded value question per offered field.
pub fn field_plan(values_flag: &FlagDescriptor, fields: &[SObjectField]) -> Vec<QuestionSpec> {
    let picker_validator = if values_flag.required {
        Validator::AtLeastOne
    } else {
        Validator::None
    };
    let mut plan = Vec::with_capacity(fields.len() + 1);
    plan.push(
        QuestionSpec::new(QuestionKey::FieldPicker, QuestionKind::MultiSelect, &values_flag.description)
            .with_choices(fields.iter().map(|f| Choice::new(f.display(), f.name.clone())).collect())
            .validated(picker_validator),
    );
    for field in fields {
        plan.push(
            QuestionSpec::new(
                QuestionKey::Field(field.name.clone()),
                QuestionKind::FreeText,
                format!("{} value", field.display()),
            )
            .guarded(Guard::Contains {
                key: QuestionKey::FieldPicker,
                value: field.name.clone(),
            }),
        );
    }
    plan
}

/// Fallback when the object's fields cannot be fetched: ask for the raw value.
pub fn raw_values_question(values_flag: &FlagDescriptor) -> QuestionSpec {
    let validator = if values_flag.required {
        Validator::NonEmpty
    } else {
        Validator::None
    };
    QuestionSpec::new(
        QuestionKey::Flag(values_flag.switch.clone()),
        QuestionKind::FreeText,
        format!("{} (field='value' pairs)", values_flag.description),
    )
    .validated(validator)
}

/* ---- Session steps ---- */

pub const STEP_SAVE: QuestionKey = QuestionKey::Step("saveCommand");
pub const STEP_SAVE_NAME: QuestionKey = QuestionKey::Step("commandName");
pub const STEP_STORE: QuestionKey = QuestionKey::Step("storeOutput");
pub const STEP_STORE_FILE: QuestionKey = QuestionKey::Step("outputFile");
pub const DEFAULT_OUTPUT_FILE: &str = "log.json";

/// "Save this command?" then an alias name, asked only on yes.
pub fn save_command_plan() -> Vec<QuestionSpec> {
    vec![
        QuestionSpec::new(STEP_SAVE, QuestionKind::ConfirmBoolean, "Save this command to the command log?")
            .with_default(Some(Answer::Bool(false))),
        QuestionSpec::new(STEP_SAVE_NAME, QuestionKind::FreeText, "Name for the saved command")
            .guarded(Guard::Confirmed(STEP_SAVE))
            .validated(Validator::NonEmpty),
    ]
}

/// "Store the output?" then a file name (default `log.json`).
pub fn store_output_plan() -> Vec<QuestionSpec> {
    vec![
        QuestionSpec::new(STEP_STORE, QuestionKind::ConfirmBoolean, "Store the output in a file?")
            .with_default(Some(Answer::Bool(false))),
        QuestionSpec::new(STEP_STORE_FILE, QuestionKind::FreeText, "Output file name")
            .with_default(Some(Answer::text(DEFAULT_OUTPUT_FILE)))
            .guarded(Guard::Confirmed(STEP_STORE))
            .validated(Validator::NonEmpty),
    ]
}

/// Reject guards that reference answers not available before the question.
pub fn validate_ordering(questions: &[QuestionSpec], answered: &Answers) -> WizardResult<()> {
    let mut known: HashSet<QuestionKey> = answered.keys().cloned().collect();
    for q in questions {
        if let Some(r) = q.guard.references()
            && !known.contains(&r)
        {
            return Err(WizardError::InvalidPlan(format!(
                "guard on '{}' references '{}' which is not asked before it",
                q.key, r
            )));
        }
        known.insert(q.key.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WizardConfig;
    use crate::wizard::context::OrgCatalog;
    use crate::wizard::flags::normalize_flags;
    use serde_json::json;

    fn flags() -> Vec<FlagDescriptor> {
        let raw = json!({
            "json": {"name": "json", "type": "boolean", "description": "format output as json", "default": true},
            "targetusername": {"name": "targetusername", "char": "u", "type": "option", "description": "username or alias for the target org"},
            "sobjecttype": {"name": "sobjecttype", "char": "s", "type": "option", "description": "object", "required": true},
            "values": {"name": "values", "char": "v", "type": "option", "description": "field values", "required": true},
            "resultformat": {"name": "resultformat", "char": "r", "type": "option", "description": "format", "options": ["human", "csv", "json"], "default": "human"},
            "outputdir": {"name": "outputdir", "char": "d", "type": "option", "description": "output directory"},
            "csvfile": {"name": "csvfile", "char": "f", "type": "option", "description": "csv file"},
            "query": {"name": "query", "char": "q", "type": "option", "description": "SOQL query"}
        });
        normalize_flags(raw.as_object().unwrap(), &WizardConfig::default())
    }

    fn ctx(objects: Option<Vec<&str>>) -> PlanContext {
        PlanContext {
            cwd: PathBuf::from("/work"),
            schema_objects: objects.map(|v| v.into_iter().map(String::from).collect()),
        }
    }

    #[test]
    fn dispatch_by_kind_and_role() {
        let fs = flags();
        let selected: Vec<&FlagDescriptor> = fs.iter().collect();
        let plan = build_plan(&selected, &ctx(Some(vec!["Account", "Contact"])));
        let kinds: Vec<(String, QuestionKind)> = plan.iter().map(|q| (q.key.to_string(), q.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("--json".to_string(), QuestionKind::ConfirmBoolean),
                ("-s".to_string(), QuestionKind::AutocompleteList),
                ("-r".to_string(), QuestionKind::SingleChoice),
                ("-d".to_string(), QuestionKind::DirectoryPicker),
                ("-f".to_string(), QuestionKind::FilePicker),
                ("-q".to_string(), QuestionKind::FreeText),
            ],
            "org target and composite flags are handled elsewhere"
        );
    }

    #[test]
    fn defaults_per_kind() {
        let fs = flags();
        let selected: Vec<&FlagDescriptor> = fs.iter().collect();
        let plan = build_plan(&selected, &ctx(Some(vec!["Account"])));
        assert_eq!(plan[0].default, Some(Answer::Bool(true)));
        assert_eq!(plan[1].default, Some(Answer::text("Account")));
        assert_eq!(plan[2].default, Some(Answer::text("human")));
        assert_eq!(plan[2].default_index(), Some(0));
        assert_eq!(plan[3].root.as_deref(), Some(std::path::Path::new("/work")));
    }

    #[test]
    fn free_text_rejects_empty() {
        let fs = flags();
        let q = build_plan(&[fs.iter().find(|f| f.switch == "-q").unwrap()], &ctx(None)).remove(0);
        assert!(q.validate(&Answer::text("")).is_err());
        assert!(q.validate(&Answer::text("   ")).is_err());
        assert!(q.validate(&Answer::text("SELECT Id FROM Account")).is_ok());
    }

    #[test]
    fn schema_selector_without_catalog_falls_back_to_text() {
        let fs = flags();
        let q = build_plan(&[fs.iter().find(|f| f.switch == "-s").unwrap()], &ctx(None)).remove(0);
        assert_eq!(q.kind, QuestionKind::FreeText);
        assert_eq!(q.default, Some(Answer::text("Account")));
    }

    #[test]
    fn autocomplete_rejects_values_outside_source() {
        let fs = flags();
        let q = build_plan(&[fs.iter().find(|f| f.switch == "-s").unwrap()], &ctx(Some(vec!["Account"]))).remove(0);
        assert!(q.validate(&Answer::text("Account")).is_ok());
        assert!(q.validate(&Answer::text("Nope")).is_err());
    }

    #[test]
    fn org_question_guarded_on_selection() {
        let fs = flags();
        let u = fs.iter().find(|f| f.switch == "-u").unwrap();
        let cat = OrgCatalog::shape(&json!({
            "scratchOrgs": [{"username": "s@example.com", "alias": "s", "isDefaultUsername": true}],
            "nonScratchOrgs": [{"username": "hub@example.com"}]
        }))
        .unwrap();
        let q = org_question(u, Some(&cat));
        assert_eq!(q.kind, QuestionKind::AutocompleteList);
        assert_eq!(q.choices.len(), 2);
        assert_eq!(q.default, Some(Answer::text("s@example.com")));

        let mut answers = Answers::new();
        answers.insert(QuestionKey::FlagSelection, Answer::Many(vec!["--json".into()]));
        assert!(!q.guard.allows(&answers));
        answers.insert(QuestionKey::FlagSelection, Answer::Many(vec!["-u".into()]));
        assert!(q.guard.allows(&answers));
    }

    #[test]
    fn org_question_with_sentinel_default_has_no_default() {
        let fs = flags();
        let u = fs.iter().find(|f| f.switch == "-u").unwrap();
        let cat = OrgCatalog::shape(&json!({"nonScratchOrgs": [{"username": "prod@example.com"}]})).unwrap();
        assert!(cat.default_dev_hub.is_sentinel());
        let q = org_question(u, Some(&cat));
        assert_eq!(q.default, None);
        assert_eq!(q.default_index(), None);
    }

    #[test]
    fn org_question_without_catalog_is_free_text() {
        let fs = flags();
        let u = fs.iter().find(|f| f.switch == "-u").unwrap();
        let q = org_question(u, None);
        assert_eq!(q.kind, QuestionKind::FreeText);
        assert_eq!(q.guard, Guard::FlagSelected("-u".into()));
    }

    #[test]
    fn field_plan_guards_each_field_on_picker() {
        let fs = flags();
        let v = fs.iter().find(|f| f.switch == "-v").unwrap();
        let fields: Vec<SObjectField> = serde_json::from_value(json!([
            {"name": "Name", "label": "Account Name", "createable": true},
            {"name": "Phone", "label": "Phone", "createable": true}
        ]))
        .unwrap();
        let plan = field_plan(v, &fields);
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].kind, QuestionKind::MultiSelect);
        assert_eq!(plan[0].validator, Validator::AtLeastOne);
        assert_eq!(plan[0].choices[0].label, "Name (Account Name)");

        let mut answers = Answers::new();
        answers.insert(QuestionKey::FieldPicker, Answer::Many(vec!["Phone".into()]));
        assert!(!plan[1].guard.allows(&answers));
        assert!(plan[2].guard.allows(&answers));
        assert!(validate_ordering(&plan, &Answers::new()).is_ok());
    }

    #[test]
    fn forward_guard_is_rejected() {
        let fs = flags();
        let v = fs.iter().find(|f| f.switch == "-v").unwrap();
        let fields: Vec<SObjectField> =
            serde_json::from_value(json!([{"name": "Name", "createable": true}])).unwrap();
        let mut plan = field_plan(v, &fields);
        plan.reverse();
        let err = validate_ordering(&plan, &Answers::new()).unwrap_err();
        assert!(matches!(err, WizardError::InvalidPlan(_)));
    }

    #[test]
    fn selection_question_marks_required_flags() {
        let raw: RawCommand = serde_json::from_value(json!({
            "id": "force:data:record:create",
            "flags": {
                "sobjecttype": {"name": "sobjecttype", "char": "s", "type": "option", "description": "object", "required": true},
                "json": {"name": "json", "type": "boolean", "description": "json"}
            }
        }))
        .unwrap();
        let desc = CommandDescriptor::from_raw(&raw, &WizardConfig::default());
        let q = flag_selection_question(&desc);
        assert_eq!(q.choices[0].label, "-s object (required)");
        assert_eq!(q.default, Some(Answer::Many(vec!["-s".into(), "--json".into()])));
        assert!(q.validate(&Answer::Many(vec![])).is_err());
    }

    #[test]
    fn step_plans_guard_follow_up_on_confirm() {
        for plan in [save_command_plan(), store_output_plan()] {
            assert!(validate_ordering(&plan, &Answers::new()).is_ok());
            let mut answers = Answers::new();
            answers.insert(plan[0].key.clone(), Answer::Bool(false));
            assert!(!plan[1].guard.allows(&answers));
            answers.insert(plan[0].key.clone(), Answer::Bool(true));
            assert!(plan[1].guard.allows(&answers));
        }
        assert_eq!(store_output_plan()[1].default, Some(Answer::text("log.json")));
    }

    #[test]
    fn subcommand_question_validates_membership() {
        let catalog: Vec<RawCommand> =
            serde_json::from_value(json!([{"id": "force:org:list"}, {"id": "force:org:open"}])).unwrap();
        let q = subcommand_question(&catalog, Some("force:org:open"));
        assert_eq!(q.default_index(), Some(1));
        assert!(q.validate(&Answer::text("force:org:delete")).is_err());
    }
}
