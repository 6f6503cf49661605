//! Composite bias score.
//!
//! Three additive signals, no interaction terms:
//!
//! | signal   | formula                                              |
//! |----------|------------------------------------------------------|
//! | breadth  | distinct flagged terms × [`BREADTH_WEIGHT`]          |
//! | severity | Σ(severity weight × match count) × [`SEVERITY_WEIGHT`] |
//! | density  | (matches / words) × 100 × [`DENSITY_WEIGHT`]          |
//!
//! The sum is capped at 1.0 and rounded to three decimals. The weights are a
//! stable contract: changing them changes every stored score.

use crate::types::FlaggedTerm;

pub const BREADTH_WEIGHT: f64 = 0.2;
pub const SEVERITY_WEIGHT: f64 = 0.1;
pub const DENSITY_WEIGHT: f64 = 0.05;

/// Score a set of flagged terms against the text they were found in.
///
/// Returns exactly `0.0` when nothing was flagged or the text has no
/// whitespace-delimited words.
pub fn compute_score(flagged_terms: &[FlaggedTerm], original_text: &str) -> f64 {
    if flagged_terms.is_empty() {
        return 0.0;
    }
    let word_count = original_text.split_whitespace().count();
    if word_count == 0 {
        return 0.0;
    }

    let breadth = flagged_terms.len() as f64 * BREADTH_WEIGHT;

    let weighted_matches: u64 = flagged_terms
        .iter()
        .map(|f| u64::from(f.severity.weight()) * f.match_count as u64)
        .sum();
    let severity = weighted_matches as f64 * SEVERITY_WEIGHT;

    let total_matches: usize = flagged_terms.iter().map(|f| f.match_count).sum();
    let density = (total_matches as f64 / word_count as f64) * 100.0 * DENSITY_WEIGHT;

    round3((breadth + severity + density).min(1.0))
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, MatchSpan, Severity};

    fn flagged(severity: Severity, matches: usize) -> FlaggedTerm {
        let spans: Vec<MatchSpan> = (0..matches)
            .map(|i| MatchSpan {
                matched_text: "x".into(),
                start: i,
                end: i + 1,
            })
            .collect();
        FlaggedTerm {
            matched_text: "x".into(),
            term_id: 1,
            term: "x".into(),
            category: Category::Other,
            severity,
            explanation: String::new(),
            suggestions: Vec::new(),
            pattern: "x".into(),
            match_count: spans.len(),
            spans,
        }
    }

    #[test]
    fn nothing_flagged_scores_zero() {
        assert_eq!(compute_score(&[], "some words here"), 0.0);
    }

    #[test]
    fn no_words_scores_zero() {
        assert_eq!(compute_score(&[flagged(Severity::Blocking, 1)], "   \n\t"), 0.0);
    }

    #[test]
    fn signals_add_up() {
        // 200 words, one warning term matched once:
        // breadth 0.2 + severity 0.1 + density (1/200)*100*0.05 = 0.025
        let text = "word ".repeat(200);
        let score = compute_score(&[flagged(Severity::Warning, 1)], &text);
        assert_eq!(score, 0.325);
    }

    #[test]
    fn blocking_weighs_double() {
        let text = "word ".repeat(1000);
        let warning = compute_score(&[flagged(Severity::Warning, 1)], &text);
        let blocking = compute_score(&[flagged(Severity::Blocking, 1)], &text);
        // 0.2 + 0.1 + 0.005 vs 0.2 + 0.2 + 0.005
        assert_eq!(warning, 0.305);
        assert_eq!(blocking, 0.405);
    }

    #[test]
    fn capped_at_one() {
        let terms = vec![
            flagged(Severity::Blocking, 3),
            flagged(Severity::Blocking, 2),
            flagged(Severity::Warning, 4),
        ];
        assert_eq!(compute_score(&terms, "short text"), 1.0);
    }

    #[test]
    fn rounded_to_three_decimals() {
        // 300 words: density = (1/300)*5 = 0.016666...
        let text = "word ".repeat(300);
        let score = compute_score(&[flagged(Severity::Warning, 1)], &text);
        assert_eq!(score, 0.317);
    }
}
