/*!
assemble.rs - answers -> final invocation.

Rendering, per selected flag in catalog order:
  boolean    switch alone iff the answer is truthy
  option     switch "value"  (omitted when blank)
  composite  switch "f1='v1' f2='v2'"  (picked fields, blanks skipped)

The output order follows the flag catalog, never answer-arrival order, and
unselected flags are dropped even if an answer was recorded for them.
*/

use crate::error::{WizardError, WizardResult};
use crate::tool::ToolSpec;
use crate::wizard::answers::{Answer, Answers, QuestionKey};
use crate::wizard::flags::{CommandDescriptor, FlagDescriptor, FlagRole};

/// One rendered flag. `value` is `None` for boolean switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagValue {
    pub switch: String,
    pub value: Option<String>,
}

/// State of one wizard run, filled in round by round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunProps {
    pub subcommand: String,
    pub flags: Vec<FlagValue>,
    pub target_org: Option<String>,
    pub target_object: Option<String>,
    /// Display form: `<tool> <id> -s "Account" --json`
    pub command: String,
    /// Arguments after the tool, ready for execution without re-parsing
    pub argv: Vec<String>,
}

impl RunProps {
    pub fn new(subcommand: impl Into<String>) -> Self {
        Self {
            subcommand: subcommand.into(),
            ..Self::default()
        }
    }

    /// Render the collected answers into `flags`, `command` and `argv`.
    pub fn finalize(&mut self, tool: &ToolSpec, desc: &CommandDescriptor, answers: &Answers) -> WizardResult<()> {
        let flags = collect_flags(desc, answers)?;

        let mut parts = vec![tool.to_string(), desc.id.clone()];
        let mut argv = vec![desc.id.clone()];
        for fv in &flags {
            argv.push(fv.switch.clone());
            match &fv.value {
                Some(v) => {
                    parts.push(format!("{} \"{}\"", fv.switch, v));
                    argv.push(v.clone());
                }
                None => parts.push(fv.switch.clone()),
            }
        }

        self.subcommand = desc.id.clone();
        self.flags = flags;
        self.command = parts.join(" ");
        self.argv = argv;
        Ok(())
    }
}

/// Selected, answered flags in catalog order.
pub fn collect_flags(desc: &CommandDescriptor, answers: &Answers) -> WizardResult<Vec<FlagValue>> {
    let mut out = Vec::new();
    for flag in &desc.flags {
        let selected = answers.is_selected(&flag.switch);
        let rendered = if selected { render_flag(flag, answers) } else { None };

        if flag.required && rendered.is_none() && !has_answer(flag, answers, selected) {
            return Err(WizardError::MissingRequiredFlag(flag.switch.clone()));
        }
        if let Some(fv) = rendered {
            out.push(fv);
        }
    }
    Ok(out)
}

fn render_flag(flag: &FlagDescriptor, answers: &Answers) -> Option<FlagValue> {
    if flag.is_boolean() {
        return answers
            .flag(&flag.switch)
            .filter(|a| a.is_truthy())
            .map(|_| FlagValue {
                switch: flag.switch.clone(),
                value: None,
            });
    }

    let direct = text_value(answers.flag(&flag.switch));
    let value = match flag.role {
        FlagRole::CompositeFieldSelector => composite_value(answers).or(direct),
        _ => direct,
    }?;

    Some(FlagValue {
        switch: flag.switch.clone(),
        value: Some(value),
    })
}

/// A boolean answered `false` still counts as answered.
fn has_answer(flag: &FlagDescriptor, answers: &Answers, selected: bool) -> bool {
    selected && flag.is_boolean() && answers.flag(&flag.switch).is_some()
}

fn text_value(answer: Option<&Answer>) -> Option<String> {
    match answer? {
        Answer::Text(s) if !s.trim().is_empty() => Some(s.clone()),
        Answer::Many(v) if !v.is_empty() => Some(v.join(",")),
        _ => None,
    }
}

/// `field='value'` pairs for every picked field with a non-blank value.
pub fn composite_value(answers: &Answers) -> Option<String> {
    let picked = answers.get(&QuestionKey::FieldPicker)?.as_many()?;
    let pairs: Vec<String> = picked
        .iter()
        .filter_map(|field| {
            let v = answers.get(&QuestionKey::Field(field.clone()))?.as_text()?;
            (!v.trim().is_empty()).then(|| format!("{field}='{v}'"))
        })
        .collect();
    (!pairs.is_empty()).then(|| pairs.join(" "))
}
