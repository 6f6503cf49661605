//! Test doubles for the store traits.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{Result, bail};
use chrono::Utc;

use crate::store::{ResultStore, TermStore};
use crate::types::{AnalysisResult, BiasTerm, Category, Severity, StoredAnalysis, SubjectRef};

pub fn term(id: i64, display: &str, pattern: &str, severity: Severity) -> BiasTerm {
    BiasTerm {
        id,
        term: display.into(),
        pattern: pattern.into(),
        category: Category::Age,
        severity,
        explanation: format!("{display} is a biased term"),
        neutral_alternatives: vec![format!("not {display}")],
        is_active: true,
        detection_count: 0,
    }
}

#[derive(Default)]
pub struct StubStore {
    terms: Mutex<Vec<BiasTerm>>,
    analyses: Mutex<HashMap<SubjectRef, StoredAnalysis>>,
    loads: AtomicUsize,
    fail_reads: AtomicBool,
    fail_increments: AtomicBool,
}

impl StubStore {
    pub fn with_terms(mut terms: Vec<BiasTerm>) -> Self {
        terms.sort_by(BiasTerm::library_cmp);
        Self {
            terms: Mutex::new(terms),
            ..Default::default()
        }
    }

    pub fn push_term(&self, term: BiasTerm) {
        let mut terms = self.terms.lock().unwrap();
        terms.push(term);
        terms.sort_by(BiasTerm::library_cmp);
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_increments(&self, fail: bool) {
        self.fail_increments.store(fail, Ordering::SeqCst);
    }

    pub fn detection_count(&self, term_id: i64) -> u64 {
        self.terms
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == term_id)
            .map(|t| t.detection_count)
            .unwrap_or(0)
    }
}

impl TermStore for StubStore {
    fn list_active_terms(&self) -> Result<Vec<BiasTerm>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("connection refused");
        }
        self.loads.fetch_add(1, Ordering::SeqCst);
        let terms = self.terms.lock().unwrap();
        Ok(terms.iter().filter(|t| t.is_active).cloned().collect())
    }

    fn increment_detection_count(&self, term_id: i64) -> Result<()> {
        if self.fail_increments.load(Ordering::SeqCst) {
            bail!("counter update failed");
        }
        let mut terms = self.terms.lock().unwrap();
        if let Some(t) = terms.iter_mut().find(|t| t.id == term_id) {
            t.detection_count += 1;
        }
        Ok(())
    }
}

impl ResultStore for StubStore {
    fn upsert_analysis(
        &self,
        subject: &SubjectRef,
        result: &AnalysisResult,
        saved_with_warnings: bool,
        user_acknowledged: bool,
    ) -> Result<StoredAnalysis> {
        let now = Utc::now();
        let mut analyses = self.analyses.lock().unwrap();
        let created_at = analyses.get(subject).map(|a| a.created_at).unwrap_or(now);
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

    fn get_analysis(&self, subject: &SubjectRef) -> Result<Option<StoredAnalysis>> {
        Ok(self.analyses.lock().unwrap().get(subject).cloned())
    }
}
