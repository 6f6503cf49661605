//! Persistence seams supplied by the host application.
//!
//! The detector reaches terms and saved analyses only through these traits, so
//! a host can back them with whatever it already runs (see `biasguard-store`
//! for the in-memory and DuckDB implementations).

use anyhow::Result;

use crate::types::{AnalysisResult, BiasTerm, StoredAnalysis, SubjectRef};

/// Source of the bias term library.
pub trait TermStore: Send + Sync {
    /// Active terms in library order (see [`BiasTerm::library_cmp`]).
    fn list_active_terms(&self) -> Result<Vec<BiasTerm>>;

    /// Add one to a term's detection counter.
    ///
    /// Must be a single atomic increment at the store level so concurrent
    /// analyses never lose counts.
    fn increment_detection_count(&self, term_id: i64) -> Result<()>;
}

/// Sink for analysis results, one record per reviewed subject.
pub trait ResultStore: Send + Sync {
    /// Create or replace the record for `subject`. Last write wins.
    fn upsert_analysis(
        &self,
        subject: &SubjectRef,
        result: &AnalysisResult,
        saved_with_warnings: bool,
        user_acknowledged: bool,
    ) -> Result<StoredAnalysis>;

    fn get_analysis(&self, subject: &SubjectRef) -> Result<Option<StoredAnalysis>>;
}
