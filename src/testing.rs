//! Test doubles: a canned tool invoker and a scripted prompter.

use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;

use crate::error::{WizardError, WizardResult};
use crate::tool::{ToolInvoker, ToolOutput, ToolSpec, parse_tool};
use crate::utils::Progress;
use crate::wizard::answers::{Answer, QuestionKey, Reply};
use crate::wizard::plan::QuestionSpec;
use crate::wizard::prompt::Prompter;

enum Canned {
    Output(ToolOutput),
    Timeout,
}

/// Responds to calls keyed by their space-joined arguments.
/// Unknown calls exit with code 1.
pub struct FakeInvoker {
    spec: ToolSpec,
    responses: Vec<(String, Canned)>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeInvoker {
    pub fn new() -> Self {
        Self {
            spec: parse_tool("sfdx").unwrap(),
            responses: Vec::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn ok(mut self, args: &str, body: Value) -> Self {
        self.responses.push((
            args.to_string(),
            Canned::Output(ToolOutput {
                code: 0,
                stdout: body.to_string(),
                stderr: String::new(),
            }),
        ));
        self
    }

    pub fn fail(mut self, args: &str, stderr: Value) -> Self {
        self.responses.push((
            args.to_string(),
            Canned::Output(ToolOutput {
                code: 1,
                stdout: String::new(),
                stderr: stderr.to_string(),
            }),
        ));
        self
    }

    pub fn hang(mut self, args: &str) -> Self {
        self.responses.push((args.to_string(), Canned::Timeout));
        self
    }

    pub fn called(&self, args: &str) -> bool {
        self.calls.borrow().iter().any(|c| c == args)
    }
}

impl ToolInvoker for FakeInvoker {
    fn tool(&self) -> &ToolSpec {
        &self.spec
    }

    fn invoke(&self, args: &[String], _progress: &Progress) -> WizardResult<ToolOutput> {
        let joined = args.join(" ");
        self.calls.borrow_mut().push(joined.clone());
        match self.responses.iter().find(|(k, _)| *k == joined) {
            Some((_, Canned::Output(out))) => Ok(out.clone()),
            Some((_, Canned::Timeout)) => Err(WizardError::ToolUnresponsive {
                command: self.spec.render(args),
                timeout_secs: 1,
            }),
            None => Ok(ToolOutput {
                code: 1,
                stdout: String::new(),
                stderr: format!("{{\"message\":\"no canned response for '{joined}'\"}}"),
            }),
        }
    }
}

/// Replays a fixed queue of replies and records what was asked.
#[derive(Default)]
pub struct ScriptedPrompter {
    replies: VecDeque<Reply>,
    pub asked: Vec<QuestionKey>,
    pub questions: Vec<QuestionSpec>,
    pub rejected: Vec<(QuestionKey, String)>,
}

impl ScriptedPrompter {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: replies.into(),
            ..Self::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }

    pub fn question(&self, key: &QuestionKey) -> Option<&QuestionSpec> {
        self.questions.iter().rev().find(|q| &q.key == key)
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &QuestionSpec) -> WizardResult<Reply> {
        self.asked.push(question.key.clone());
        self.questions.push(question.clone());
        self.replies
            .pop_front()
            .ok_or_else(|| WizardError::Prompt(format!("script exhausted at '{}'", question.key)))
    }

    fn reject(&mut self, question: &QuestionSpec, reason: &str) {
        self.rejected.push((question.key.clone(), reason.to_string()));
    }
}

pub fn text(s: &str) -> Reply {
    Reply::Answer(Answer::text(s))
}

pub fn many(items: &[&str]) -> Reply {
    Reply::Answer(Answer::Many(items.iter().map(|s| s.to_string()).collect()))
}

pub fn yes() -> Reply {
    Reply::Answer(Answer::Bool(true))
}

pub fn no() -> Reply {
    Reply::Answer(Answer::Bool(false))
}
