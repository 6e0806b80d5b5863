use simsearch_core::StoreError;
use simsearch_retrieval::LoadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to clear the table: {0}")]
    Clear(#[source] StoreError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("similarity search failed: {0}")]
    Search(#[source] StoreError),
    #[error("failed to close the store: {0}")]
    Close(#[source] StoreError),
}
