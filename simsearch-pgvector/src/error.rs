use simsearch_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PgVectorStoreError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("database connection failed: {0}")]
    Connection(#[source] sqlx::Error),
    #[error("query failed on table '{table}': {source}")]
    Query {
        table: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("malformed row: {0}")]
    Malformed(String),
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("batch mismatch: docs={docs}, embeddings={embeddings}")]
    BatchMismatch { docs: usize, embeddings: usize },
}

impl From<PgVectorStoreError> for StoreError {
    fn from(value: PgVectorStoreError) -> Self {
        match value {
            PgVectorStoreError::DimensionMismatch { expected, got } => {
                StoreError::DimensionMismatch { expected, got }
            }
            PgVectorStoreError::Connection(err) => StoreError::Connection(Box::new(err)),
            PgVectorStoreError::Query {
                source: sqlx::Error::PoolClosed,
                ..
            } => StoreError::Closed,
            PgVectorStoreError::Query {
                source: source @ (sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut),
                ..
            } => StoreError::Connection(Box::new(source)),
            other => StoreError::Internal(Box::new(other)),
        }
    }
}
