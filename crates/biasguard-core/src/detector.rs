//! Analysis entry point.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::classify::classify;
use crate::config::DetectorConfig;
use crate::error::DetectError;
use crate::library::TermLibrary;
use crate::score::compute_score;
use crate::store::{ResultStore, TermStore};
use crate::types::{AnalysisResult, FlaggedTerm, Severity, StoredAnalysis, SubjectRef};

/// Scans feedback text against the active term library.
///
/// Holds the process-wide term cache; share one detector (by reference or
/// `Arc`) across threads rather than building one per request.
pub struct BiasDetector {
    library: TermLibrary,
    terms: Arc<dyn TermStore>,
    results: Arc<dyn ResultStore>,
}

impl BiasDetector {
    pub fn new(
        terms: Arc<dyn TermStore>,
        results: Arc<dyn ResultStore>,
        config: &DetectorConfig,
    ) -> Self {
        Self {
            library: TermLibrary::new(Arc::clone(&terms), config.term_cache_ttl()),
            terms,
            results,
        }
    }

    /// Analyse one text.
    ///
    /// Blank input short-circuits to [`AnalysisResult::empty`] without touching
    /// the store. The only side effect is a best-effort bump of each flagged
    /// term's detection counter; the result is never persisted here.
    pub fn analyze(&self, text: &str) -> Result<AnalysisResult, DetectError> {
        if text.trim().is_empty() {
            return Ok(AnalysisResult::empty());
        }

        let terms = self.library.get_active_terms()?;

        let mut flagged_terms = Vec::new();
        for compiled in terms.iter() {
            let spans = compiled.find_matches(text);
            if let Some(flagged) = FlaggedTerm::from_matches(&compiled.term, spans) {
                self.record_detection(flagged.term_id);
                flagged_terms.push(flagged);
            }
        }

        let bias_score = compute_score(&flagged_terms, text);
        let blocking_flags = flagged_terms
            .iter()
            .filter(|f| f.severity == Severity::Blocking)
            .count();
        let warning_flags = flagged_terms
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .count();
        let total_flags = blocking_flags + warning_flags;
        let severity_level = classify(blocking_flags, warning_flags, bias_score);

        if total_flags > 0 {
            info!(
                total_flags,
                blocking_flags,
                warning_flags,
                bias_score,
                severity = %severity_level,
                "bias detected in feedback"
            );
        }

        Ok(AnalysisResult {
            has_bias: total_flags > 0,
            total_flags,
            blocking_flags,
            warning_flags,
            severity_level,
            bias_score,
            flagged_terms,
            text_hash: content_hash(text),
        })
    }

    /// `true` when the text has no blocking terms. Warning-only text is
    /// clean enough to save.
    pub fn is_clean(&self, text: &str) -> Result<bool, DetectError> {
        Ok(self.analyze(text)?.blocking_flags == 0)
    }

    /// Create or replace the stored analysis for `subject`.
    pub fn save_result(
        &self,
        subject: &SubjectRef,
        result: &AnalysisResult,
        saved_with_warnings: bool,
        user_acknowledged: bool,
    ) -> Result<StoredAnalysis, DetectError> {
        let stored = self
            .results
            .upsert_analysis(subject, result, saved_with_warnings, user_acknowledged)
            .map_err(DetectError::ResultStore)?;
        info!(
            subject = %subject,
            severity = %result.severity_level,
            saved_with_warnings,
            user_acknowledged,
            "saved bias analysis"
        );
        Ok(stored)
    }

    pub fn get_analysis(&self, subject: &SubjectRef) -> Result<Option<StoredAnalysis>, DetectError> {
        self.results
            .get_analysis(subject)
            .map_err(DetectError::ResultStore)
    }

    /// Drop the cached term library. Call after any term is created, edited,
    /// deactivated, or deleted.
    pub fn invalidate_terms(&self) {
        self.library.invalidate();
    }

    fn record_detection(&self, term_id: i64) {
        if let Err(e) = self.terms.increment_detection_count(term_id) {
            debug!(term_id, error = %e, "detection count increment failed");
        }
    }
}

/// SHA-256 hex digest of the exact text.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
