use std::{error::Error as StdError, fmt, time::Duration};

use thiserror::Error;

#[derive(Debug)]
pub enum EmbeddingError {
    Authentication(String),
    QuotaExceeded(String),
    RateLimited { retry_after: Option<Duration> },
    InvalidResponse(String),
    Provider(String),
}

impl EmbeddingError {
    /// True for rejections caused by the account rather than the request.
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            EmbeddingError::Authentication(_) | EmbeddingError::QuotaExceeded(_)
        )
    }
}

impl fmt::Display for EmbeddingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingError::Authentication(message) => {
                write!(f, "Embedding authentication failed: {message}")
            }
            EmbeddingError::QuotaExceeded(message) => {
                write!(f, "Embedding quota exceeded: {message}")
            }
            EmbeddingError::RateLimited { retry_after } => match retry_after {
                Some(duration) => write!(f, "Embedding rate limited (retry_after={duration:?})"),
                None => write!(f, "Embedding rate limited (retry_after=unknown)"),
            },
            EmbeddingError::InvalidResponse(message) => {
                write!(f, "Embedding invalid response: {message}")
            }
            EmbeddingError::Provider(message) => write!(f, "Embedding provider error: {message}"),
        }
    }
}

impl StdError for EmbeddingError {}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(#[source] Box<dyn StdError + Send + Sync>),
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("invalid document id: {0}")]
    InvalidId(String),
    #[error("store is closed")]
    Closed,
    #[error("Store error: {0}")]
    Internal(#[source] Box<dyn StdError + Send + Sync>),
}

/// A batch insert that stopped partway.
#[derive(Debug, Error)]
#[error("inserted {} of {attempted} documents: {source}", .inserted_ids.len())]
pub struct AddDocumentsError {
    /// Ids of rows that were committed before the failure.
    pub inserted_ids: Vec<String>,
    pub attempted: usize,
    #[source]
    pub source: StoreError,
}

impl AddDocumentsError {
    pub fn new(inserted_ids: Vec<String>, attempted: usize, source: impl Into<StoreError>) -> Self {
        Self {
            inserted_ids,
            attempted,
            source: source.into(),
        }
    }

    /// Nothing was inserted before the failure.
    pub fn nothing_inserted(attempted: usize, source: impl Into<StoreError>) -> Self {
        Self::new(Vec::new(), attempted, source)
    }
}
