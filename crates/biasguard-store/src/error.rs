use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("terms file not found: {0}")]
    TermsFileNotFound(std::path::PathBuf),

    #[error("term not found: {0}")]
    TermNotFound(i64),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "duckdb")]
    #[error("duckdb error: {0}")]
    DuckDb(#[from] ::duckdb::Error),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("{0}")]
    Other(String),
}
