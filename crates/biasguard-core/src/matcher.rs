//! Pattern matching of bias terms against feedback text.
//!
//! Term patterns are user-authored and may be malformed. A pattern that fails
//! to compile is logged and matches nothing; it never aborts an analysis.

use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::types::{BiasTerm, MatchSpan};

/// A bias term together with its compiled, case-insensitive pattern.
///
/// `regex` is `None` when the pattern failed to compile.
#[derive(Debug, Clone)]
pub struct CompiledTerm {
    pub term: BiasTerm,
    regex: Option<Regex>,
}

impl CompiledTerm {
    pub fn compile(term: BiasTerm) -> Self {
        let regex = compile_pattern(&term);
        Self { term, regex }
    }

    /// Whether the pattern compiled.
    pub fn is_valid(&self) -> bool {
        self.regex.is_some()
    }

    pub fn find_matches(&self, text: &str) -> Vec<MatchSpan> {
        match &self.regex {
            Some(re) => scan(re, text),
            None => Vec::new(),
        }
    }
}

/// Find every non-overlapping match of `term` in `text`, compiling its pattern ad hoc.
///
/// Prefer [`CompiledTerm`] on hot paths; this recompiles on every call.
pub fn find_matches(text: &str, term: &BiasTerm) -> Vec<MatchSpan> {
    match compile_pattern(term) {
        Some(re) => scan(&re, text),
        None => Vec::new(),
    }
}

fn compile_pattern(term: &BiasTerm) -> Option<Regex> {
    match RegexBuilder::new(&term.pattern)
        .case_insensitive(true)
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(
                term_id = term.id,
                term = %term.term,
                pattern = %term.pattern,
                error = %e,
                "invalid bias term pattern, skipping"
            );
            None
        }
    }
}

/// Leftmost-first scan, converting byte offsets to character offsets.
fn scan(re: &Regex, text: &str) -> Vec<MatchSpan> {
    let mut spans = Vec::new();
    // Matches arrive in increasing byte order, so char offsets can be
    // counted incrementally from the previous position.
    let mut byte_pos = 0;
    let mut char_pos = 0;

    for m in re.find_iter(text) {
        if m.start() == m.end() {
            continue;
        }
        char_pos += text[byte_pos..m.start()].chars().count();
        let start = char_pos;
        let len = m.as_str().chars().count();
        char_pos += len;
        byte_pos = m.end();

        spans.push(MatchSpan {
            matched_text: m.as_str().to_string(),
            start,
            end: start + len,
        });
    }

    spans
}
