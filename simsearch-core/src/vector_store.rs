use std::sync::Arc;

use async_trait::async_trait;

use crate::{AddDocumentsError, Document, StoreError};

#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub document: Document,
    /// Cosine distance to the query; lower is nearer.
    pub distance: f32,
}

/// A table of embedded documents that can be cleared, filled and queried.
///
/// Implementations own their embedder: `add_documents` and
/// `similarity_search_with_score` take raw text and embed it internally.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Removes every stored row and returns how many were deleted.
    async fn clear(&self) -> Result<u64, StoreError>;

    /// Embeds and inserts `docs`, returning their ids in input order.
    ///
    /// On failure the error carries the ids that were already committed;
    /// those rows are not rolled back.
    async fn add_documents(&self, docs: Vec<Document>) -> Result<Vec<String>, AddDocumentsError>;

    /// Returns at most `k` rows ordered by ascending cosine distance to `query`.
    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    /// Releases the underlying connection. Later calls fail.
    async fn close(&self) -> Result<(), StoreError>;
}

#[async_trait]
impl<T> VectorStore for Box<T>
where
    T: VectorStore + ?Sized,
{
    async fn clear(&self) -> Result<u64, StoreError> {
        (**self).clear().await
    }

    async fn add_documents(&self, docs: Vec<Document>) -> Result<Vec<String>, AddDocumentsError> {
        (**self).add_documents(docs).await
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>, StoreError> {
        (**self).similarity_search_with_score(query, k).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        (**self).count().await
    }

    async fn close(&self) -> Result<(), StoreError> {
        (**self).close().await
    }
}

#[async_trait]
impl<T> VectorStore for Arc<T>
where
    T: VectorStore + ?Sized,
{
    async fn clear(&self) -> Result<u64, StoreError> {
        (**self).clear().await
    }

    async fn add_documents(&self, docs: Vec<Document>) -> Result<Vec<String>, AddDocumentsError> {
        (**self).add_documents(docs).await
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>, StoreError> {
        (**self).similarity_search_with_score(query, k).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        (**self).count().await
    }

    async fn close(&self) -> Result<(), StoreError> {
        (**self).close().await
    }
}
