//! Fuzzy ranking over candidate strings (subcommand ids, object names).

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

/// Candidates matching `input`, best first. Empty input keeps the original order.
pub fn rank<'a, S: AsRef<str>>(input: &str, candidates: &'a [S]) -> Vec<&'a S> {
    let needle = input.trim();
    if needle.is_empty() {
        return candidates.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, usize, &S)> = candidates
        .iter()
        .enumerate()
        .filter_map(|(i, c)| matcher.fuzzy_match(c.as_ref(), needle).map(|s| (s, i, c)))
        .collect();
    // stable on ties: earlier candidates first
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    scored.into_iter().map(|(_, _, c)| c).collect()
}

pub fn best_match<'a, S: AsRef<str>>(input: &str, candidates: &'a [S]) -> Option<&'a S> {
    if input.trim().is_empty() {
        return None;
    }
    rank(input, candidates).into_iter().next()
}
