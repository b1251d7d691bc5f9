//! Prompt capability.
//!
//! `Prompter` shows one `QuestionSpec` and returns a typed `Reply`. The
//! terminal implementation uses dialoguer; every list-style menu gets a
//! trailing `Cancel` entry, and Esc maps to the same `Reply::Cancel`.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, FuzzySelect, Input, MultiSelect, Select};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{WizardError, WizardResult};
use crate::wizard::answers::{Answer, Reply};
use crate::wizard::plan::{QuestionKind, QuestionSpec};

const CANCEL_LABEL: &str = "Cancel";
const MANUAL_PATH_LABEL: &str = "(type a path)";
const PAGE_SIZE: usize = 10;
const PICKER_DEPTH: usize = 4;
const PICKER_LIMIT: usize = 500;

pub trait Prompter {
    fn ask(&mut self, question: &QuestionSpec) -> WizardResult<Reply>;

    /// Called when an answer fails validation, before the question is re-asked.
    fn reject(&mut self, _question: &QuestionSpec, _reason: &str) {}
}

pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    fn free_text(&self, q: &QuestionSpec) -> WizardResult<Reply> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(q.prompt.clone())
            .allow_empty(true);
        if let Some(Answer::Text(d)) = &q.default {
            input = input.default(d.clone());
        }
        let value = input.interact_text()?;
        Ok(Reply::Answer(Answer::Text(value)))
    }

    fn confirm(&self, q: &QuestionSpec) -> WizardResult<Reply> {
        let default = q.default.as_ref().is_some_and(Answer::is_truthy);
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(q.prompt.clone())
            .default(default)
            .interact_opt()?;
        Ok(match answer {
            Some(b) => Reply::Answer(Answer::Bool(b)),
            None => Reply::Cancel,
        })
    }

    /// Single pick from `choices` (+ Cancel). `fuzzy` enables type-to-filter.
    fn pick_one(&self, q: &QuestionSpec, fuzzy: bool) -> WizardResult<Reply> {
        let mut items: Vec<String> = q.choices.iter().map(|c| c.label.clone()).collect();
        items.push(CANCEL_LABEL.to_string());
        let default = q.default_index().unwrap_or(0);

        let picked = if fuzzy {
            FuzzySelect::with_theme(&self.theme)
                .with_prompt(q.prompt.clone())
                .items(&items)
                .default(default)
                .max_length(PAGE_SIZE)
                .interact_opt()?
        } else {
            Select::with_theme(&self.theme)
                .with_prompt(q.prompt.clone())
                .items(&items)
                .default(default)
                .max_length(PAGE_SIZE)
                .interact_opt()?
        };
        Ok(match picked {
            Some(i) if i < q.choices.len() => Reply::Answer(Answer::Text(q.choices[i].value.clone())),
            _ => Reply::Cancel,
        })
    }

    fn pick_many(&self, q: &QuestionSpec) -> WizardResult<Reply> {
        let items: Vec<String> = q.choices.iter().map(|c| c.label.clone()).collect();
        let checked: Vec<bool> = q
            .choices
            .iter()
            .map(|c| q.default.as_ref().is_some_and(|d| d.contains(&c.value)))
            .collect();
        let picked = MultiSelect::with_theme(&self.theme)
            .with_prompt(q.prompt.clone())
            .items(&items)
            .defaults(&checked)
            .max_length(PAGE_SIZE)
            .interact_opt()?;
        Ok(match picked {
            Some(idxs) => Reply::Answer(Answer::Many(
                idxs.into_iter().map(|i| q.choices[i].value.clone()).collect(),
            )),
            None => Reply::Cancel,
        })
    }

    fn pick_path(&self, q: &QuestionSpec, dirs: bool) -> WizardResult<Reply> {
        let root = q.root.clone().unwrap_or_else(|| PathBuf::from("."));
        let candidates = list_paths(&root, dirs);
        let mut items = vec![MANUAL_PATH_LABEL.to_string()];
        items.extend(candidates.iter().cloned());
        items.push(CANCEL_LABEL.to_string());

        let picked = FuzzySelect::with_theme(&self.theme)
            .with_prompt(q.prompt.clone())
            .items(&items)
            .default(0)
            .max_length(PAGE_SIZE)
            .interact_opt()?;
        match picked {
            Some(0) => self.free_text(q),
            Some(i) if i <= candidates.len() => Ok(Reply::Answer(Answer::Text(candidates[i - 1].clone()))),
            _ => Ok(Reply::Cancel),
        }
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, q: &QuestionSpec) -> WizardResult<Reply> {
        match q.kind {
            QuestionKind::FreeText => self.free_text(q),
            QuestionKind::ConfirmBoolean => self.confirm(q),
            QuestionKind::SingleChoice => self.pick_one(q, false),
            QuestionKind::AutocompleteList => self.pick_one(q, true),
            QuestionKind::MultiSelect => self.pick_many(q),
            QuestionKind::FilePicker => self.pick_path(q, false),
            QuestionKind::DirectoryPicker => self.pick_path(q, true),
        }
    }

    fn reject(&mut self, _question: &QuestionSpec, reason: &str) {
        eprintln!("  {reason}");
    }
}

/// Relative paths under `root` (files or directories), hidden entries skipped.
pub fn list_paths(root: &Path, dirs: bool) -> Vec<String> {
    let mut out: Vec<String> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(PICKER_DEPTH)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        .filter_map(Result::ok)
        .filter(|e| if dirs { e.file_type().is_dir() } else { e.file_type().is_file() })
        .filter_map(|e| e.path().strip_prefix(root).ok().map(|p| p.to_string_lossy().into_owned()))
        .take(PICKER_LIMIT)
        .collect();
    out.sort();
    out
}

/// Fail early instead of letting dialoguer error on a non-interactive stdin.
pub fn require_terminal() -> WizardResult<()> {
    use std::io::IsTerminal;
    if std::io::stdin().is_terminal() {
        Ok(())
    } else {
        Err(WizardError::Prompt("an interactive terminal is required".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_paths_splits_files_and_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("force-app/main")).unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join("data.csv"), "Name\nAcme\n").unwrap();
        std::fs::write(dir.path().join(".git/config"), "").unwrap();
        std::fs::write(dir.path().join("force-app/main/x.cls"), "").unwrap();

        let files = list_paths(dir.path(), false);
        assert_eq!(
            files,
            vec![
                "data.csv".to_string(),
                std::path::Path::new("force-app/main/x.cls").to_string_lossy().into_owned()
            ]
        );

        let dirs = list_paths(dir.path(), true);
        assert_eq!(dirs.len(), 2, "hidden .git skipped: {dirs:?}");
        assert_eq!(dirs[0], "force-app");
    }
}
