//! Data model shared by the detector, the stores, and the CLI.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity tier of a bias term.
///
/// Declaration order is library order: blocking terms are evaluated first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Prevents the feedback from being saved until the term is removed.
    Blocking,
    /// Allows saving but requires acknowledgement before further workflow actions.
    Warning,
}

impl Severity {
    /// Numeric rank used by the severity signal of the bias score.
    pub fn weight(&self) -> u32 {
        match self {
            Self::Blocking => 2,
            Self::Warning => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blocking => "blocking",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blocking" => Ok(Self::Blocking),
            "warning" => Ok(Self::Warning),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// Kind of bias a term signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Age,
    Gender,
    Family,
    Race,
    Religion,
    Disability,
    Appearance,
    Nationality,
    Personality,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Gender => "gender",
            Self::Family => "family",
            Self::Race => "race",
            Self::Religion => "religion",
            Self::Disability => "disability",
            Self::Appearance => "appearance",
            Self::Nationality => "nationality",
            Self::Personality => "personality",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let category = match s.trim().to_ascii_lowercase().as_str() {
            "age" => Self::Age,
            "gender" => Self::Gender,
            "family" => Self::Family,
            "race" => Self::Race,
            "religion" => Self::Religion,
            "disability" => Self::Disability,
            "appearance" => Self::Appearance,
            "nationality" => Self::Nationality,
            "personality" => Self::Personality,
            "other" => Self::Other,
            other => return Err(format!("unknown category: {other}")),
        };
        Ok(category)
    }
}

fn default_true() -> bool {
    true
}

/// A curated phrase or pattern flagged as potentially discriminatory language.
///
/// Created and edited by administrators through a store. Terms are deactivated
/// rather than deleted so that historical analyses keep their meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasTerm {
    pub id: i64,
    /// Display string, e.g. "too old".
    pub term: String,
    /// Case-insensitive regular expression.
    pub pattern: String,
    pub category: Category,
    pub severity: Severity,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub neutral_alternatives: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub detection_count: u64,
}

impl BiasTerm {
    /// Library order: severity (blocking first), then category name, then id.
    pub fn library_cmp(&self, other: &Self) -> Ordering {
        self.severity
            .cmp(&other.severity)
            .then_with(|| self.category.as_str().cmp(other.category.as_str()))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// One occurrence of a term inside a text.
///
/// `start`/`end` are 0-based, half-open character offsets into the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub matched_text: String,
    pub start: usize,
    pub end: usize,
}

/// All matches of one term within one analysed text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedTerm {
    /// Text of the first occurrence.
    pub matched_text: String,
    pub term_id: i64,
    pub term: String,
    pub category: Category,
    pub severity: Severity,
    pub explanation: String,
    pub suggestions: Vec<String>,
    pub pattern: String,
    pub spans: Vec<MatchSpan>,
    pub match_count: usize,
}

impl FlaggedTerm {
    /// Build from a term and its spans. Returns `None` when there are no spans,
    /// so a flagged term always carries at least one match.
    pub fn from_matches(term: &BiasTerm, spans: Vec<MatchSpan>) -> Option<Self> {
        let first = spans.first()?;
        Some(Self {
            matched_text: first.matched_text.clone(),
            term_id: term.id,
            term: term.term.clone(),
            category: term.category,
            severity: term.severity,
            explanation: term.explanation.clone(),
            suggestions: term.neutral_alternatives.clone(),
            pattern: term.pattern.clone(),
            match_count: spans.len(),
            spans,
        })
    }
}

/// Four-tier summary of one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityLevel {
    Clean,
    Low,
    Medium,
    High,
}

impl SeverityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clean => "CLEAN",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a host application should allow for a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveGate {
    /// No flags.
    Allowed,
    /// Warnings only: saving is fine, notify/finalize needs acknowledgement.
    RequiresAcknowledgement,
    /// At least one blocking term: save/submit must be refused.
    Blocked,
}

/// Full output of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub has_bias: bool,
    pub total_flags: usize,
    pub blocking_flags: usize,
    pub warning_flags: usize,
    pub severity_level: SeverityLevel,
    pub bias_score: f64,
    pub flagged_terms: Vec<FlaggedTerm>,
    /// SHA-256 hex digest of the analysed text; empty for blank input.
    pub text_hash: String,
}

impl AnalysisResult {
    /// Canonical result for empty or whitespace-only input.
    pub fn empty() -> Self {
        Self {
            has_bias: false,
            total_flags: 0,
            blocking_flags: 0,
            warning_flags: 0,
            severity_level: SeverityLevel::Clean,
            bias_score: 0.0,
            flagged_terms: Vec::new(),
            text_hash: String::new(),
        }
    }

    /// `(term, alternatives)` for every flagged term that has alternatives.
    pub fn suggestions(&self) -> Vec<(&str, &[String])> {
        self.flagged_terms
            .iter()
            .filter(|f| !f.suggestions.is_empty())
            .map(|f| (f.term.as_str(), f.suggestions.as_slice()))
            .collect()
    }

    pub fn gate(&self) -> SaveGate {
        if self.blocking_flags > 0 {
            SaveGate::Blocked
        } else if self.warning_flags > 0 {
            SaveGate::RequiresAcknowledgement
        } else {
            SaveGate::Allowed
        }
    }
}

/// Polymorphic key of a reviewed object: object type plus object id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectRef {
    pub subject_type: String,
    pub subject_id: i64,
}

impl SubjectRef {
    pub fn new(subject_type: impl Into<String>, subject_id: i64) -> Self {
        Self {
            subject_type: subject_type.into(),
            subject_id,
        }
    }
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.subject_type, self.subject_id)
    }
}

impl FromStr for SubjectRef {
    type Err = String;

    /// Parse `type:id`, e.g. `interview_feedback:42`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("expected TYPE:ID, got {s:?}"))?;
        let kind = kind.trim();
        if kind.is_empty() {
            return Err(format!("missing subject type in {s:?}"));
        }
        let id: i64 = id
            .trim()
            .parse()
            .map_err(|_| format!("invalid subject id in {s:?}"))?;
        Ok(Self::new(kind, id))
    }
}

/// Last saved analysis for one subject, with the author's audit flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub subject: SubjectRef,
    pub result: AnalysisResult,
    /// The author chose to save despite warnings.
    pub saved_with_warnings: bool,
    /// The author explicitly confirmed awareness of the flags.
    pub user_acknowledged: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
