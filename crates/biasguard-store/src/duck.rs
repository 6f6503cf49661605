//! DuckDB storage for the term library and saved analyses.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use biasguard_core::{
    AnalysisResult, BiasTerm, ResultStore, StoredAnalysis, SubjectRef, TermStore,
};
use chrono::{DateTime, Utc};
use duckdb::{Connection, params};
use tracing::{debug, info};

use crate::StoreError;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS bias_terms (
    id                   BIGINT PRIMARY KEY,
    term                 VARCHAR NOT NULL,
    pattern              VARCHAR NOT NULL,
    category             VARCHAR NOT NULL,
    severity             VARCHAR NOT NULL,
    explanation          VARCHAR NOT NULL DEFAULT '',
    neutral_alternatives VARCHAR NOT NULL DEFAULT '[]',
    is_active            BOOLEAN NOT NULL DEFAULT TRUE,
    detection_count      BIGINT  NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS bias_analyses (
    subject_type        VARCHAR NOT NULL,
    subject_id          BIGINT  NOT NULL,
    has_bias            BOOLEAN NOT NULL,
    severity_level      VARCHAR NOT NULL,
    bias_score          DOUBLE  NOT NULL,
    total_flags         BIGINT  NOT NULL,
    blocking_flags      BIGINT  NOT NULL,
    warning_flags       BIGINT  NOT NULL,
    text_hash           VARCHAR NOT NULL,
    result_json         VARCHAR NOT NULL,
    saved_with_warnings BOOLEAN NOT NULL,
    user_acknowledged   BOOLEAN NOT NULL,
    created_at          VARCHAR NOT NULL,
    updated_at          VARCHAR NOT NULL,
    PRIMARY KEY (subject_type, subject_id)
);
";

const TERM_COLUMNS: &str = "id, term, pattern, category, severity, explanation, \
     neutral_alternatives, is_active, detection_count";

const ANALYSIS_COLUMNS: &str =
    "subject_type, subject_id, result_json, saved_with_warnings, user_acknowledged, created_at, updated_at";

/// DuckDB store holding two tables.
///
/// `bias_terms` is the administrator-maintained library; `bias_analyses` keeps
/// the last analysis per `(subject_type, subject_id)`. The flag counts and
/// severity are denormalised next to the full JSON result so hosts can query
/// them directly.
///
/// The connection sits behind a mutex: DuckDB connections are not `Sync`, and
/// the store is shared across analysing threads.
pub struct DuckStore {
    conn: Mutex<Connection>,
}

impl DuckStore {
    /// Open an in-memory database with the schema created.
    pub fn open() -> Result<Self, StoreError> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Open or create a persistent database at `path` with the schema created.
    pub fn open_persistent(path: &Path) -> Result<Self, StoreError> {
        let store = Self {
            conn: Mutex::new(Connection::open(path)?),
        };
        store.ensure_schema()?;
        info!(path = %path.display(), "opened bias store");
        Ok(store)
    }

    /// Create both tables if they do not exist.
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        self.lock()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ── Terms (admin) ──

    /// Insert a term, or update every field except `detection_count` if the id exists.
    ///
    /// Callers must invalidate any detector cache afterwards.
    pub fn upsert_term(&self, term: &BiasTerm) -> Result<(), StoreError> {
        write_term(&*self.lock()?, term)
    }

    /// Upsert a batch of terms in one transaction, returning how many were
    /// written. On error nothing from the batch is kept.
    pub fn import_terms(&self, terms: &[BiasTerm]) -> Result<usize, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for term in terms {
            write_term(&tx, term)?;
        }
        tx.commit()?;
        info!(count = terms.len(), "imported bias terms");
        Ok(terms.len())
    }

    /// Soft-delete a term.
    pub fn deactivate_term(&self, id: i64) -> Result<(), StoreError> {
        let updated = self
            .lock()?
            .execute("UPDATE bias_terms SET is_active = FALSE WHERE id = ?", [id])?;
        if updated == 0 {
            return Err(StoreError::TermNotFound(id));
        }
        debug!(term_id = id, "deactivated bias term");
        Ok(())
    }

    pub fn term(&self, id: i64) -> Result<Option<BiasTerm>, StoreError> {
        let sql = format!("SELECT {TERM_COLUMNS} FROM bias_terms WHERE id = ?");
        let mut terms = self.query_terms(&sql, Some(id))?;
        Ok(terms.pop())
    }

    /// Every term, active or not, in library order.
    pub fn all_terms(&self) -> Result<Vec<BiasTerm>, StoreError> {
        let sql = format!("SELECT {TERM_COLUMNS} FROM bias_terms ORDER BY severity, category, id");
        self.query_terms(&sql, None)
    }

    /// Number of rows in `bias_terms`.
    pub fn term_count(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT count(*) FROM bias_terms", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ── Internal ──

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn query_terms(&self, sql: &str, id: Option<i64>) -> Result<Vec<BiasTerm>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let map_row = |row: &duckdb::Row<'_>| -> duckdb::Result<TermRow> {
            Ok(TermRow {
                id: row.get(0)?,
                term: row.get(1)?,
                pattern: row.get(2)?,
                category: row.get(3)?,
                severity: row.get(4)?,
                explanation: row.get(5)?,
                neutral_alternatives: row.get(6)?,
                is_active: row.get(7)?,
                detection_count: row.get(8)?,
            })
        };
        let rows: Vec<TermRow> = match id {
            Some(id) => stmt.query_map([id], map_row)?.collect::<Result<_, _>>()?,
            None => stmt.query_map([], map_row)?.collect::<Result<_, _>>()?,
        };
        rows.into_iter().map(TermRow::into_term).collect()
    }
}

/// Raw `bias_terms` row; enum columns are parsed after the row is read.
struct TermRow {
    id: i64,
    term: String,
    pattern: String,
    category: String,
    severity: String,
    explanation: String,
    neutral_alternatives: String,
    is_active: bool,
    detection_count: i64,
}

impl TermRow {
    fn into_term(self) -> Result<BiasTerm, StoreError> {
        Ok(BiasTerm {
            id: self.id,
            term: self.term,
            pattern: self.pattern,
            category: self.category.parse().map_err(StoreError::Other)?,
            severity: self.severity.parse().map_err(StoreError::Other)?,
            explanation: self.explanation,
            neutral_alternatives: serde_json::from_str(&self.neutral_alternatives)?,
            is_active: self.is_active,
            detection_count: self.detection_count.max(0) as u64,
        })
    }
}

fn write_term(conn: &Connection, term: &BiasTerm) -> Result<(), StoreError> {
    let alternatives = serde_json::to_string(&term.neutral_alternatives)?;
    let sql = format!(
        "INSERT INTO bias_terms ({TERM_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT (id) DO UPDATE SET
             term = excluded.term,
             pattern = excluded.pattern,
             category = excluded.category,
             severity = excluded.severity,
             explanation = excluded.explanation,
             neutral_alternatives = excluded.neutral_alternatives,
             is_active = excluded.is_active"
    );
    conn.execute(
        &sql,
        params![
            term.id,
            term.term,
            term.pattern,
            term.category.as_str(),
            term.severity.as_str(),
            term.explanation,
            alternatives,
            term.is_active,
            term.detection_count as i64,
        ],
    )?;
    Ok(())
}

fn read_analysis(conn: &Connection, subject: &SubjectRef) -> Result<Option<StoredAnalysis>, StoreError> {
    let sql = format!(
        "SELECT {ANALYSIS_COLUMNS} FROM bias_analyses WHERE subject_type = ? AND subject_id = ?"
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![subject.subject_type, subject.subject_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, bool>(3)?,
            row.get::<_, bool>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let Some(row) = rows.next() else {
        return Ok(None);
    };
    let (subject_type, subject_id, result_json, saved_with_warnings, user_acknowledged, created_at, updated_at) =
        row?;

    Ok(Some(StoredAnalysis {
        subject: SubjectRef::new(subject_type, subject_id),
        result: serde_json::from_str(&result_json)?,
        saved_with_warnings,
        user_acknowledged,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    }))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StoreError::Other(format!("bad timestamp {s:?}: {e}")))
}

impl TermStore for DuckStore {
    fn list_active_terms(&self) -> anyhow::Result<Vec<BiasTerm>> {
        let sql = format!(
            "SELECT {TERM_COLUMNS} FROM bias_terms WHERE is_active ORDER BY severity, category, id"
        );
        Ok(self.query_terms(&sql, None)?)
    }

    fn increment_detection_count(&self, term_id: i64) -> anyhow::Result<()> {
        let updated = self.lock()?.execute(
            "UPDATE bias_terms SET detection_count = detection_count + 1 WHERE id = ?",
            [term_id],
        )?;
        if updated == 0 {
            return Err(StoreError::TermNotFound(term_id).into());
        }
        Ok(())
    }
}

impl ResultStore for DuckStore {
    fn upsert_analysis(
        &self,
        subject: &SubjectRef,
        result: &AnalysisResult,
        saved_with_warnings: bool,
        user_acknowledged: bool,
    ) -> anyhow::Result<StoredAnalysis> {
        let result_json = serde_json::to_string(result)?;
        let now = Utc::now().to_rfc3339();
        // Write and read back under one guard so the caller sees its own row.
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO bias_analyses (
                 subject_type, subject_id, has_bias, severity_level, bias_score,
                 total_flags, blocking_flags, warning_flags, text_hash, result_json,
                 saved_with_warnings, user_acknowledged, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (subject_type, subject_id) DO UPDATE SET
                 has_bias = excluded.has_bias,
                 severity_level = excluded.severity_level,
                 bias_score = excluded.bias_score,
                 total_flags = excluded.total_flags,
                 blocking_flags = excluded.blocking_flags,
                 warning_flags = excluded.warning_flags,
                 text_hash = excluded.text_hash,
                 result_json = excluded.result_json,
                 saved_with_warnings = excluded.saved_with_warnings,
                 user_acknowledged = excluded.user_acknowledged,
                 updated_at = excluded.updated_at",
            params![
                subject.subject_type,
                subject.subject_id,
                result.has_bias,
                result.severity_level.as_str(),
                result.bias_score,
                result.total_flags as i64,
                result.blocking_flags as i64,
                result.warning_flags as i64,
                result.text_hash,
                result_json,
                saved_with_warnings,
                user_acknowledged,
                now,
                now,
            ],
        )?;
        read_analysis(&conn, subject)?
            .ok_or_else(|| StoreError::Other(format!("analysis for {subject} vanished after upsert")).into())
    }

    fn get_analysis(&self, subject: &SubjectRef) -> anyhow::Result<Option<StoredAnalysis>> {
        Ok(read_analysis(&*self.lock()?, subject)?)
    }
}
