use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("term store unavailable: {0}")]
    TermStore(#[source] anyhow::Error),

    #[error("result store error: {0}")]
    ResultStore(#[source] anyhow::Error),
}
