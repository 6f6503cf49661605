//! Severity classification.

use crate::types::SeverityLevel;

/// Score at or above which a warning-only result is `MEDIUM` rather than `LOW`.
pub const MEDIUM_THRESHOLD: f64 = 0.5;

/// Map flag counts and score to a severity level.
///
/// Priority cascade, first rule wins:
/// 1. any blocking flag → `HIGH`
/// 2. no warnings → `CLEAN`
/// 3. score ≥ 0.5 → `MEDIUM`
/// 4. otherwise `LOW`
pub fn classify(blocking_count: usize, warning_count: usize, score: f64) -> SeverityLevel {
    if blocking_count > 0 {
        SeverityLevel::High
    } else if warning_count == 0 {
        SeverityLevel::Clean
    } else if score >= MEDIUM_THRESHOLD {
        SeverityLevel::Medium
    } else {
        SeverityLevel::Low
    }
}
