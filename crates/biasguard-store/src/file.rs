//! JSON term-library files.
//!
//! A file is a JSON array of terms:
//!
//! ```json
//! [{"id": 1, "term": "young", "pattern": "\\byoung\\b",
//!   "category": "age", "severity": "warning",
//!   "neutral_alternatives": ["early-career"]}]
//! ```
//!
//! `is_active` defaults to true, `detection_count` to 0, `explanation` and
//! `neutral_alternatives` to empty.

use std::collections::HashSet;
use std::path::Path;

use biasguard_core::BiasTerm;
use tracing::info;

use crate::StoreError;

/// Read and parse a term-library file.
pub fn read_terms_file(path: &Path) -> Result<Vec<BiasTerm>, StoreError> {
    if !path.exists() {
        return Err(StoreError::TermsFileNotFound(path.to_path_buf()));
    }
    let json = std::fs::read_to_string(path)?;
    let terms = parse_terms_json(&json)?;
    info!(count = terms.len(), path = %path.display(), "read terms file");
    Ok(terms)
}

/// Parse a term library from JSON. Ids must be unique.
pub fn parse_terms_json(json: &str) -> Result<Vec<BiasTerm>, StoreError> {
    let terms: Vec<BiasTerm> = serde_json::from_str(json)?;
    let mut seen = HashSet::new();
    for term in &terms {
        if !seen.insert(term.id) {
            return Err(StoreError::Other(format!("duplicate term id {}", term.id)));
        }
    }
    Ok(terms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use biasguard_core::{Category, Severity};

    const LIBRARY: &str = r#"[
        {
            "id": 1,
            "term": "pregnant",
            "pattern": "\\bpregnant\\b",
            "category": "family",
            "severity": "blocking",
            "explanation": "Protected characteristic."
        },
        {
            "id": 2,
            "term": "young",
            "pattern": "\\byoung\\b",
            "category": "age",
            "severity": "warning",
            "neutral_alternatives": ["early-career"],
            "is_active": false,
            "detection_count": 12
        }
    ]"#;

    #[test]
    fn parse_library() {
        let terms = parse_terms_json(LIBRARY).unwrap();
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].severity, Severity::Blocking);
        assert_eq!(terms[0].category, Category::Family);
        assert!(terms[0].is_active);
        assert_eq!(terms[0].pattern, r"\bpregnant\b");
        assert!(!terms[1].is_active);
        assert_eq!(terms[1].detection_count, 12);
        assert_eq!(terms[1].neutral_alternatives, vec!["early-career"]);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let json = r#"[
            {"id": 1, "term": "a", "pattern": "a", "category": "other", "severity": "warning"},
            {"id": 1, "term": "b", "pattern": "b", "category": "other", "severity": "warning"}
        ]"#;
        assert!(matches!(parse_terms_json(json), Err(StoreError::Other(_))));
    }

    #[test]
    fn unknown_severity_rejected() {
        let json = r#"[{"id": 1, "term": "a", "pattern": "a", "category": "age", "severity": "severe"}]"#;
        assert!(matches!(parse_terms_json(json), Err(StoreError::Json(_))));
    }

    #[test]
    fn read_from_disk() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("terms.json");
        std::fs::write(&path, LIBRARY).unwrap();
        let terms = read_terms_file(&path).unwrap();
        assert_eq!(terms.len(), 2);
    }

    #[test]
    fn missing_file_errors() {
        let result = read_terms_file(Path::new("/nonexistent/terms.json"));
        assert!(matches!(result, Err(StoreError::TermsFileNotFound(_))));
    }
}
