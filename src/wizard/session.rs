/*!
session.rs - drives one wizard run.

Pipeline (each batch is built from every answer collected before it):
  choose_subcommand   catalog -> descriptor (an exact hint skips the question)
  choose_flags        multi-select; required flags forced back in
  resolve_org         org list fetched only when the org switch is selected
  answer_flags        object list fetched only when a schema selector is selected
  answer_fields       describe the object, pick fields, one value per field
  finish              RunProps with the rendered command

Org / schema lookup failures degrade the affected question to free text.
`Cancel` anywhere ends the run with `WizardError::Cancelled`.
*/

use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::WizardConfig;
use crate::error::{WizardError, WizardResult};
use crate::tool::{ToolInvoker, call_json};
use crate::utils::Progress;
use crate::wizard::answers::{Answer, Answers, QuestionKey, Reply};
use crate::wizard::assemble::{RunProps, composite_value};
use crate::wizard::context::{ContextResolver, FieldMode};
use crate::wizard::flags::{CommandDescriptor, FlagDescriptor, FlagKind, FlagRole, RawCommand, parse_catalog};
use crate::wizard::plan::{
    self, PlanContext, QuestionSpec, build_plan, field_plan, flag_selection_question, org_question,
    raw_values_question, subcommand_question, validate_ordering,
};
use crate::wizard::prompt::Prompter;
use crate::wizard::search::best_match;

/// `<tool> commands --json`, parsed. An empty catalog is a discovery failure.
pub fn discover_commands(invoker: &dyn ToolInvoker, config: &WizardConfig) -> WizardResult<Vec<RawCommand>> {
    let args = vec!["commands".to_string(), "--json".to_string()];
    let progress = Progress::start("loading commands...", config.show_progress);
    let result = match call_json(invoker, &args, &progress) {
        Ok(v) => v,
        Err(e) => {
            progress.fail("failed loading commands");
            return Err(e);
        }
    };
    let catalog = parse_catalog(result)?;
    if catalog.is_empty() {
        progress.fail("no commands");
        return Err(WizardError::Discovery {
            command: invoker.tool().render(&args),
            message: "the tool reported no commands".into(),
        });
    }
    progress.succeed(format!("{} commands loaded", catalog.len()));
    debug!(count = catalog.len(), "command catalog discovered");
    Ok(catalog)
}

pub struct Session<'a> {
    prompter: &'a mut dyn Prompter,
    invoker: &'a dyn ToolInvoker,
    config: &'a WizardConfig,
    cwd: PathBuf,
    answers: Answers,
    props: RunProps,
}

impl<'a> Session<'a> {
    pub fn new(prompter: &'a mut dyn Prompter, invoker: &'a dyn ToolInvoker, config: &'a WizardConfig) -> Self {
        Self {
            prompter,
            invoker,
            config,
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            answers: Answers::new(),
            props: RunProps::default(),
        }
    }

    /// Root for file and directory pickers.
    #[cfg(test)]
    pub fn with_cwd(mut self, cwd: PathBuf) -> Self {
        self.cwd = cwd;
        self
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    /// Full pipeline. `on_selected` runs once the subcommand is known.
    pub fn run(
        &mut self,
        catalog: &[RawCommand],
        hint: Option<&str>,
        mut on_selected: impl FnMut(&CommandDescriptor),
    ) -> WizardResult<RunProps> {
        let desc = self.choose_subcommand(catalog, hint)?;
        on_selected(&desc);
        self.choose_flags(&desc)?;
        self.resolve_org(&desc)?;
        self.answer_flags(&desc)?;
        self.answer_fields(&desc)?;
        self.finish(&desc)
    }

    /// Ask every question whose guard passes, in order. Skipped questions
    /// drop any earlier answer under the same key.
    pub fn ask_batch(&mut self, batch: &[QuestionSpec]) -> WizardResult<()> {
        validate_ordering(batch, &self.answers)?;
        for q in batch {
            if !q.guard.allows(&self.answers) {
                debug!(question = %q.key, "guard not met; skipping");
                self.answers.remove(&q.key);
                continue;
            }
            let answer = self.ask_one(q)?;
            self.answers.insert(q.key.clone(), answer);
        }
        Ok(())
    }

    fn ask_one(&mut self, q: &QuestionSpec) -> WizardResult<Answer> {
        loop {
            let answer = match self.prompter.ask(q)? {
                Reply::Cancel => return Err(WizardError::Cancelled),
                Reply::Answer(a) => a,
            };
            match q.validate(&answer) {
                Ok(()) => return Ok(answer),
                Err(reason) => {
                    let err = WizardError::Validation {
                        key: q.key.to_string(),
                        reason: reason.clone(),
                    };
                    warn!("{err}; asking again");
                    self.prompter.reject(q, &reason);
                }
            }
        }
    }

    pub fn choose_subcommand(&mut self, catalog: &[RawCommand], hint: Option<&str>) -> WizardResult<CommandDescriptor> {
        let hint = hint.map(str::trim).filter(|h| !h.is_empty());
        if let Some(h) = hint {
            match CommandDescriptor::describe(h, catalog, self.config) {
                Ok(desc) => {
                    info!(command = %desc.id, "command given; skipping selection");
                    self.answers.insert(QuestionKey::Subcommand, Answer::text(h));
                    self.props = RunProps::new(desc.id.clone());
                    return Ok(desc);
                }
                Err(WizardError::NotFound(id)) => warn!(command = %id, "not an exact command id; offering closest match"),
                Err(e) => return Err(e),
            }
        }

        let ids: Vec<&str> = catalog.iter().map(|c| c.id.as_str()).collect();
        let default = hint.and_then(|h| best_match(h, &ids)).copied();
        let q = subcommand_question(catalog, default);
        self.ask_batch(std::slice::from_ref(&q))?;

        let id = self
            .answers
            .get(&QuestionKey::Subcommand)
            .and_then(Answer::as_text)
            .unwrap_or_default()
            .to_string();
        let desc = CommandDescriptor::describe(&id, catalog, self.config)?;
        self.props = RunProps::new(desc.id.clone());
        Ok(desc)
    }

    pub fn choose_flags(&mut self, desc: &CommandDescriptor) -> WizardResult<()> {
        let q = flag_selection_question(desc);
        self.ask_batch(std::slice::from_ref(&q))?;

        let mut picked = self.answers.selected_flags().to_vec();
        for switch in desc.required_switches() {
            if !picked.iter().any(|s| s == switch) {
                warn!(flag = %switch, "required flag cannot be deselected");
                picked.push(switch.to_string());
            }
        }
        let ordered: Vec<String> = desc
            .flags
            .iter()
            .filter(|f| picked.contains(&f.switch))
            .map(|f| f.switch.clone())
            .collect();
        debug!(selected = ?ordered, "flags selected");
        self.answers.insert(QuestionKey::FlagSelection, Answer::Many(ordered));
        Ok(())
    }

    pub fn resolve_org(&mut self, desc: &CommandDescriptor) -> WizardResult<()> {
        let Some(flag) = desc.flag_with_role(FlagRole::OrgTarget) else {
            return Ok(());
        };
        let orgs = if self.answers.is_selected(&flag.switch) {
            degrade("org lookup", self.resolver().list_orgs())?
        } else {
            None
        };
        let q = org_question(flag, orgs.as_ref());
        self.ask_batch(std::slice::from_ref(&q))?;
        self.props.target_org = self.text_answer(flag);
        Ok(())
    }

    pub fn answer_flags(&mut self, desc: &CommandDescriptor) -> WizardResult<()> {
        let selected: Vec<&FlagDescriptor> = desc
            .flags
            .iter()
            .filter(|f| self.answers.is_selected(&f.switch))
            .collect();

        let needs_objects = selected.iter().any(|f| {
            f.role == FlagRole::SchemaObjectSelector && f.kind == FlagKind::Option && f.options.is_empty()
        });
        let schema_objects = if needs_objects {
            let org = self.props.target_org.clone();
            degrade("object lookup", self.resolver().list_objects(org.as_deref()))?
        } else {
            None
        };

        let ctx = PlanContext {
            cwd: self.cwd.clone(),
            schema_objects,
        };
        let plan = build_plan(&selected, &ctx);
        debug!(questions = plan.len(), "flag plan built");
        self.ask_batch(&plan)?;

        self.props.target_object = selected
            .iter()
            .find(|f| f.role == FlagRole::SchemaObjectSelector)
            .and_then(|f| self.text_answer(f));
        Ok(())
    }

    pub fn answer_fields(&mut self, desc: &CommandDescriptor) -> WizardResult<()> {
        let Some(values) = desc.flag_with_role(FlagRole::CompositeFieldSelector) else {
            return Ok(());
        };
        if !self.answers.is_selected(&values.switch) {
            return Ok(());
        }

        let fields = match self.props.target_object.clone() {
            Some(object) => {
                let tooling = self.tooling_selected(desc);
                let mode = FieldMode::for_command(&desc.id, self.config);
                let org = self.props.target_org.clone();
                let described = self
                    .resolver()
                    .describe_object(&object, org.as_deref(), tooling, mode);
                degrade("field lookup", described)?.filter(|f| !f.is_empty())
            }
            None => None,
        };

        let Some(fields) = fields else {
            return self.ask_batch(&[raw_values_question(values)]);
        };
        let plan = field_plan(values, &fields);
        self.ask_batch(&plan)?;

        // Picked fields may all be left blank; a required flag still needs one value.
        while values.required && composite_value(&self.answers).is_none() {
            let reason = "at least one picked field needs a value";
            warn!(flag = %values.switch, "{reason}; asking again");
            let value_questions = &plan[1..];
            let retry = match value_questions.iter().find(|q| q.guard.allows(&self.answers)) {
                Some(first) => {
                    self.prompter.reject(first, reason);
                    value_questions
                }
                None => &plan[..],
            };
            self.ask_batch(retry)?;
        }
        Ok(())
    }

    pub fn finish(&mut self, desc: &CommandDescriptor) -> WizardResult<RunProps> {
        self.props.finalize(self.invoker.tool(), desc, &self.answers)?;
        info!(command = %self.props.command, "command assembled");
        Ok(self.props.clone())
    }

    /// Alias for the command log, or `None` if the operator declined.
    pub fn ask_save_name(&mut self) -> WizardResult<Option<String>> {
        self.ask_batch(&plan::save_command_plan())?;
        Ok(self.step_text(&plan::STEP_SAVE_NAME))
    }

    /// Output file name, or `None` if the operator declined.
    pub fn ask_output_file(&mut self) -> WizardResult<Option<String>> {
        self.ask_batch(&plan::store_output_plan())?;
        Ok(self.step_text(&plan::STEP_STORE_FILE))
    }

    fn resolver(&self) -> ContextResolver<'_> {
        ContextResolver::new(self.invoker, self.config)
    }

    fn text_answer(&self, flag: &FlagDescriptor) -> Option<String> {
        self.answers
            .flag(&flag.switch)
            .and_then(Answer::as_text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    }

    fn step_text(&self, key: &QuestionKey) -> Option<String> {
        self.answers
            .get(key)
            .and_then(Answer::as_text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    }

    /// A selected tooling-API flag answered yes.
    fn tooling_selected(&self, desc: &CommandDescriptor) -> bool {
        desc.flags.iter().any(|f| {
            self.config.roles.is_tooling_flag(&f.long_key, &f.switch)
                && self.answers.is_selected(&f.switch)
                && self.answers.flag(&f.switch).is_some_and(Answer::is_truthy)
        })
    }
}

fn degrade<T>(what: &str, result: WizardResult<T>) -> WizardResult<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.is_degradable() => {
            warn!(error = %e, "{what} failed; falling back to free text");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
