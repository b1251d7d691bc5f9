/*!
answers.rs - typed answer store for one wizard session.

Keys are explicit (`QuestionKey`) instead of bare switch strings so a flag
answer, a composite field answer and the field picker can never collide.
Entries keep arrival order; lookups are linear (plans are small).
*/

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QuestionKey {
    /// Subcommand picker
    Subcommand,
    /// Flag multi-select; answer is the list of chosen switches
    FlagSelection,
    /// A flag's value, keyed by switch
    Flag(String),
    /// Composite field picker (record fields to fill)
    FieldPicker,
    /// One composite field value, keyed by field name
    Field(String),
    /// Session-level steps outside the flag plan (save command, store output)
    Step(&'static str),
}

impl fmt::Display for QuestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKey::Subcommand => f.write_str("command"),
            QuestionKey::FlagSelection => f.write_str("selectedFlags"),
            QuestionKey::Flag(s) => f.write_str(s),
            QuestionKey::FieldPicker => f.write_str("fields"),
            QuestionKey::Field(name) => write!(f, "field:{name}"),
            QuestionKey::Step(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Bool(bool),
    Text(String),
    Many(Vec<String>),
}

impl Answer {
    pub fn text(s: impl Into<String>) -> Self {
        Answer::Text(s.into())
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Answer::Bool(b) => *b,
            Answer::Text(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "y" | "1"),
            Answer::Many(v) => !v.is_empty(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Answer::Bool(_) => false,
            Answer::Text(s) => s.trim().is_empty(),
            Answer::Many(v) => v.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_many(&self) -> Option<&[String]> {
        match self {
            Answer::Many(v) => Some(v),
            _ => None,
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        match self {
            Answer::Many(v) => v.iter().any(|x| x == value),
            Answer::Text(s) => s == value,
            Answer::Bool(_) => false,
        }
    }
}

/// What a prompt hands back: an answer, or the synthetic `Cancel` choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Answer(Answer),
    Cancel,
}

#[derive(Debug, Clone, Default)]
pub struct Answers {
    entries: Vec<(QuestionKey, Answer)>,
}

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace.
    pub fn insert(&mut self, key: QuestionKey, answer: Answer) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = answer;
        } else {
            self.entries.push((key, answer));
        }
    }

    pub fn get(&self, key: &QuestionKey) -> Option<&Answer> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, a)| a)
    }

    pub fn remove(&mut self, key: &QuestionKey) -> Option<Answer> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn flag(&self, switch: &str) -> Option<&Answer> {
        self.get(&QuestionKey::Flag(switch.to_string()))
    }

    /// Switches chosen in the flag-selection step (empty before it).
    pub fn selected_flags(&self) -> &[String] {
        self.get(&QuestionKey::FlagSelection)
            .and_then(Answer::as_many)
            .unwrap_or(&[])
    }

    pub fn is_selected(&self, switch: &str) -> bool {
        self.selected_flags().iter().any(|s| s == switch)
    }

    pub fn keys(&self) -> impl Iterator<Item = &QuestionKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let mut a = Answers::new();
        a.insert(QuestionKey::Flag("-s".into()), Answer::text("Account"));
        a.insert(QuestionKey::Flag("-u".into()), Answer::text("me"));
        a.insert(QuestionKey::Flag("-s".into()), Answer::text("Contact"));
        assert_eq!(a.len(), 2);
        assert_eq!(a.flag("-s"), Some(&Answer::text("Contact")));
        let keys: Vec<String> = a.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["-s", "-u"]);
    }

    #[test]
    fn selection_helpers() {
        let mut a = Answers::new();
        assert!(a.selected_flags().is_empty());
        a.insert(
            QuestionKey::FlagSelection,
            Answer::Many(vec!["-u".into(), "--json".into()]),
        );
        assert!(a.is_selected("-u"));
        assert!(!a.is_selected("-s"));
    }

    #[test]
    fn truthiness_and_blankness() {
        assert!(Answer::Bool(true).is_truthy());
        assert!(!Answer::Bool(false).is_truthy());
        assert!(Answer::text("yes").is_truthy());
        assert!(!Answer::text("").is_truthy());
        assert!(Answer::text("  ").is_blank());
        assert!(!Answer::Bool(false).is_blank());
        assert!(Answer::Many(vec![]).is_blank());
    }

    #[test]
    fn remove_returns_previous() {
        let mut a = Answers::new();
        a.insert(QuestionKey::Flag("-u".into()), Answer::text("me"));
        assert_eq!(a.remove(&QuestionKey::Flag("-u".into())), Some(Answer::text("me")));
        assert!(a.is_empty());
    }
}
