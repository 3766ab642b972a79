use tercet_fetch::{ExtractError, FetchError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Reference '{0}' already exists")]
    DuplicateKey(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Catalog lock poisoned")]
    LockPoisoned,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Why a pipeline run produced nothing. Callers of
/// [`Pipeline::next_record`](crate::Pipeline::next_record) only ever see the
/// collapsed [`Outcome`](crate::Outcome); this is kept for logging.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Catalog error: {0}")]
    CatalogError(#[from] CatalogError),

    #[error("Fetch failed: {0}")]
    FetchError(#[from] FetchError),

    #[error("Extraction failed: {0}")]
    ExtractError(#[from] ExtractError),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
