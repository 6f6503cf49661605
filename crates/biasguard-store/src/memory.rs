//! In-memory store for tests and for hosts that load the library from a file.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use biasguard_core::{
    AnalysisResult, BiasTerm, ResultStore, StoredAnalysis, SubjectRef, TermStore,
};
use chrono::Utc;
use tracing::debug;

use crate::StoreError;

/// Mutex-guarded maps implementing both store traits.
///
/// Increments and upserts happen under the lock, so concurrent analyses never
/// lose a detection count.
#[derive(Default)]
pub struct MemoryStore {
    terms: Mutex<BTreeMap<i64, BiasTerm>>,
    analyses: Mutex<HashMap<SubjectRef, StoredAnalysis>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-loaded with `terms`. Later duplicates of an id win.
    pub fn with_terms(terms: impl IntoIterator<Item = BiasTerm>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.terms.lock() {
            map.extend(terms.into_iter().map(|t| (t.id, t)));
        }
        store
    }

    // ── Admin ──

    /// Insert or replace a term. Callers must invalidate any detector cache.
    pub fn insert_term(&self, term: BiasTerm) -> Result<(), StoreError> {
        self.lock_terms()?.insert(term.id, term);
        Ok(())
    }

    /// Soft-delete a term.
    pub fn deactivate_term(&self, id: i64) -> Result<(), StoreError> {
        let mut terms = self.lock_terms()?;
        let term = terms.get_mut(&id).ok_or(StoreError::TermNotFound(id))?;
        term.is_active = false;
        debug!(term_id = id, "deactivated bias term");
        Ok(())
    }

    pub fn term(&self, id: i64) -> Result<Option<BiasTerm>, StoreError> {
        Ok(self.lock_terms()?.get(&id).cloned())
    }

    /// Every term, active or not, in library order.
    pub fn all_terms(&self) -> Result<Vec<BiasTerm>, StoreError> {
        let mut terms: Vec<BiasTerm> = self.lock_terms()?.values().cloned().collect();
        terms.sort_by(BiasTerm::library_cmp);
        Ok(terms)
    }

    fn lock_terms(&self) -> Result<MutexGuard<'_, BTreeMap<i64, BiasTerm>>, StoreError> {
        self.terms.lock().map_err(|_| StoreError::Poisoned)
    }

    fn lock_analyses(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<SubjectRef, StoredAnalysis>>, StoreError> {
        self.analyses.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl TermStore for MemoryStore {
    fn list_active_terms(&self) -> anyhow::Result<Vec<BiasTerm>> {
        let mut terms: Vec<BiasTerm> = self
            .lock_terms()?
            .values()
            .filter(|t| t.is_active)
            .cloned()
            .collect();
        terms.sort_by(BiasTerm::library_cmp);
        Ok(terms)
    }

    fn increment_detection_count(&self, term_id: i64) -> anyhow::Result<()> {
        let mut terms = self.lock_terms()?;
        let term = terms
            .get_mut(&term_id)
            .ok_or(StoreError::TermNotFound(term_id))?;
        term.detection_count += 1;
        Ok(())
    }
}

impl ResultStore for MemoryStore {
    fn upsert_analysis(
        &self,
        subject: &SubjectRef,
        result: &AnalysisResult,
        saved_with_warnings: bool,
        user_acknowledged: bool,
    ) -> anyhow::Result<StoredAnalysis> {
        let now = Utc::now();
        let mut analyses = self.lock_analyses()?;
        let created_at = analyses
            .get(subject)
            .map(|existing| existing.created_at)
            .unwrap_or(now);
        let stored = StoredAnalysis {
            subject: subject.clone(),
            result: result.clone(),
            saved_with_warnings,
            user_acknowledged,
            created_at,
            updated_at: now,
        };
        analyses.insert(subject.clone(), stored.clone());
        Ok(stored)
    }

    fn get_analysis(&self, subject: &SubjectRef) -> anyhow::Result<Option<StoredAnalysis>> {
        Ok(self.lock_analyses()?.get(subject).cloned())
    }
}
