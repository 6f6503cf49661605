//! Plain-text cards for analyses and term listings.
//!
//! Each `render_*` builds the full text so it can be checked in tests; the
//! `print_*` wrappers write it to stdout.

use std::fmt::Write;

use biasguard_core::{AnalysisResult, BiasTerm, FlaggedTerm, SaveGate, StoredAnalysis};

const MAX_SPANS: usize = 10;

// ── Public API ──

pub fn print_analysis(result: &AnalysisResult) {
    print!("{}", render_analysis(result));
}

pub fn print_stored(stored: &StoredAnalysis) {
    print!("{}", render_stored(stored));
}

pub fn print_terms(terms: &[BiasTerm]) {
    print!("{}", render_terms(terms));
}

// ── Rendering ──

pub fn render_analysis(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", result.severity_level);
    let _ = writeln!(out, "  {:<16} {:.3}", "score", result.bias_score);
    let _ = writeln!(
        out,
        "  {:<16} {} ({} blocking, {} warning)",
        "flags", result.total_flags, result.blocking_flags, result.warning_flags
    );
    if !result.text_hash.is_empty() {
        let _ = writeln!(out, "  {:<16} {}", "text_hash", result.text_hash);
    }
    let _ = writeln!(out, "  {:<16} {}", "save", gate_label(result.gate()));

    for flagged in &result.flagged_terms {
        out.push('\n');
        render_flagged(&mut out, flagged);
    }
    out
}

pub fn render_stored(stored: &StoredAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", stored.subject);
    let _ = writeln!(out, "  {:<16} {}", "created_at", stored.created_at.to_rfc3339());
    let _ = writeln!(out, "  {:<16} {}", "updated_at", stored.updated_at.to_rfc3339());
    let _ = writeln!(out, "  {:<16} {}", "with_warnings", yes_no(stored.saved_with_warnings));
    let _ = writeln!(out, "  {:<16} {}", "acknowledged", yes_no(stored.user_acknowledged));
    out.push('\n');
    out.push_str(&render_analysis(&stored.result));
    out
}

pub fn render_terms(terms: &[BiasTerm]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<9} {:<12} {:<7} {:>8}  {}",
        "id", "severity", "category", "active", "detected", "term"
    );
    for term in terms {
        let _ = writeln!(
            out,
            "{:>5}  {:<9} {:<12} {:<7} {:>8}  {}",
            term.id,
            term.severity.as_str(),
            term.category.as_str(),
            yes_no(term.is_active),
            term.detection_count,
            term.term
        );
    }
    let _ = writeln!(out, "\n{} term(s)", terms.len());
    out
}

// ── Helpers ──

fn render_flagged(out: &mut String, flagged: &FlaggedTerm) {
    let _ = writeln!(
        out,
        "[{}] {} ({}) x{}",
        flagged.severity.as_str().to_uppercase(),
        flagged.term,
        flagged.category,
        flagged.match_count
    );
    for span in flagged.spans.iter().take(MAX_SPANS) {
        let _ = writeln!(out, "    {:?} at {}..{}", span.matched_text, span.start, span.end);
    }
    if flagged.spans.len() > MAX_SPANS {
        let _ = writeln!(out, "    ... and {} more", flagged.spans.len() - MAX_SPANS);
    }
    if !flagged.explanation.is_empty() {
        let _ = writeln!(out, "  {}", flagged.explanation);
    }
    if !flagged.suggestions.is_empty() {
        let _ = writeln!(out, "  try: {}", flagged.suggestions.join(", "));
    }
}

fn gate_label(gate: SaveGate) -> &'static str {
    match gate {
        SaveGate::Allowed => "allowed",
        SaveGate::RequiresAcknowledgement => "allowed after acknowledging warnings",
        SaveGate::Blocked => "blocked",
    }
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}
