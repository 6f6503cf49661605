//! Built-in starter library for seeding a fresh store.
//!
//! Blocking terms reference protected characteristics directly; warning terms
//! are coded language that often stands in for them.

use crate::types::{BiasTerm, Category, Severity};

struct Seed {
    term: &'static str,
    pattern: &'static str,
    category: Category,
    severity: Severity,
    explanation: &'static str,
    alternatives: &'static [&'static str],
}

const SEEDS: &[Seed] = &[
    // ── Blocking ──
    Seed {
        term: "pregnant",
        pattern: r"\bpregnan(t|cy)\b",
        category: Category::Family,
        severity: Severity::Blocking,
        explanation: "Pregnancy is a protected characteristic and must not inform hiring decisions.",
        alternatives: &[],
    },
    Seed {
        term: "maternity leave",
        pattern: r"\b(maternity|paternity) leave\b",
        category: Category::Family,
        severity: Severity::Blocking,
        explanation: "Planned or possible parental leave must not be weighed against a candidate.",
        alternatives: &[],
    },
    Seed {
        term: "has kids",
        pattern: r"\b(has|have|with) (young )?(kids|children)\b",
        category: Category::Family,
        severity: Severity::Blocking,
        explanation: "Family and caring responsibilities are not job criteria.",
        alternatives: &["availability for the stated schedule"],
    },
    Seed {
        term: "too old",
        pattern: r"\btoo old\b",
        category: Category::Age,
        severity: Severity::Blocking,
        explanation: "Age-based judgements are discriminatory.",
        alternatives: &["lacks experience with the required tools"],
    },
    Seed {
        term: "years old",
        pattern: r"\b\d{2}\s*(years?|yrs?)[- ]old\b",
        category: Category::Age,
        severity: Severity::Blocking,
        explanation: "A candidate's age must not be recorded in feedback.",
        alternatives: &[],
    },
    Seed {
        term: "disabled",
        pattern: r"\b(disabled|handicapped|wheelchair)\b",
        category: Category::Disability,
        severity: Severity::Blocking,
        explanation: "Disability must not be a factor; assess only job-related abilities with accommodation.",
        alternatives: &[],
    },
    Seed {
        term: "religious",
        pattern: r"\b(religious|church|mosque|synagogue|temple)\b",
        category: Category::Religion,
        severity: Severity::Blocking,
        explanation: "Religion is a protected characteristic.",
        alternatives: &[],
    },
    Seed {
        term: "foreign accent",
        pattern: r"\b(foreign|thick|strong) accent\b",
        category: Category::Nationality,
        severity: Severity::Blocking,
        explanation: "Accent is a proxy for national origin.",
        alternatives: &["communicated clearly", "was hard to follow on technical points"],
    },
    // ── Warning ──
    Seed {
        term: "young",
        pattern: r"\byoung\b",
        category: Category::Age,
        severity: Severity::Warning,
        explanation: "Describing a candidate as young may signal age bias.",
        alternatives: &["early-career", "recent graduate"],
    },
    Seed {
        term: "energetic",
        pattern: r"\b(energetic|youthful|fresh)\b",
        category: Category::Age,
        severity: Severity::Warning,
        explanation: "Often used as coded language for age.",
        alternatives: &["motivated", "engaged"],
    },
    Seed {
        term: "digital native",
        pattern: r"\bdigital native\b",
        category: Category::Age,
        severity: Severity::Warning,
        explanation: "Implies a generational cohort rather than a skill.",
        alternatives: &["proficient with modern tools"],
    },
    Seed {
        term: "overqualified",
        pattern: r"\bover-?qualified\b",
        category: Category::Age,
        severity: Severity::Warning,
        explanation: "Frequently a proxy for age or salary assumptions.",
        alternatives: &["experience exceeds the role's scope"],
    },
    Seed {
        term: "aggressive",
        pattern: r"\b(aggressive|abrasive|bossy)\b",
        category: Category::Gender,
        severity: Severity::Warning,
        explanation: "Applied disproportionately to women for the same behaviour.",
        alternatives: &["assertive", "direct"],
    },
    Seed {
        term: "emotional",
        pattern: r"\b(emotional|hysterical)\b",
        category: Category::Gender,
        severity: Severity::Warning,
        explanation: "Gendered descriptor unrelated to job performance.",
        alternatives: &["expressive", "passionate"],
    },
    Seed {
        term: "culture fit",
        pattern: r"\bculture[- ]fit\b",
        category: Category::Personality,
        severity: Severity::Warning,
        explanation: "Vague; tends to favour candidates similar to the interviewer.",
        alternatives: &["alignment with team values", "collaboration style"],
    },
    Seed {
        term: "attractive",
        pattern: r"\b(attractive|pretty|handsome|overweight)\b",
        category: Category::Appearance,
        severity: Severity::Warning,
        explanation: "Physical appearance is not a job criterion.",
        alternatives: &["professional presentation"],
    },
    Seed {
        term: "native speaker",
        pattern: r"\bnative (english )?speaker\b",
        category: Category::Nationality,
        severity: Severity::Warning,
        explanation: "Implies national origin; assess language proficiency instead.",
        alternatives: &["fluent in English"],
    },
];

/// The starter library, ids numbered from 1 in declaration order.
pub fn default_terms() -> Vec<BiasTerm> {
    SEEDS
        .iter()
        .zip(1..)
        .map(|(seed, id)| BiasTerm {
            id,
            term: seed.term.to_string(),
            pattern: seed.pattern.to_string(),
            category: seed.category,
            severity: seed.severity,
            explanation: seed.explanation.to_string(),
            neutral_alternatives: seed.alternatives.iter().map(|s| s.to_string()).collect(),
            is_active: true,
            detection_count: 0,
        })
        .collect()
}
