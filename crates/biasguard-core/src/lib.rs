//! Bias detection for interview feedback: term library, matcher, scorer, classifier.

pub mod classify;
pub mod config;
pub mod defaults;
pub mod detector;
mod error;
pub mod library;
pub mod matcher;
pub mod score;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use classify::classify;
pub use config::DetectorConfig;
pub use defaults::default_terms;
pub use detector::{BiasDetector, content_hash};
pub use error::DetectError;
pub use library::TermLibrary;
pub use matcher::{CompiledTerm, find_matches};
pub use score::compute_score;
pub use store::{ResultStore, TermStore};
pub use types::{
    AnalysisResult, BiasTerm, Category, FlaggedTerm, MatchSpan, SaveGate, Severity,
    SeverityLevel, StoredAnalysis, SubjectRef,
};
