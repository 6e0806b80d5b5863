use std::fmt;

use pgvector::Vector;
use serde_json::Value;
use simsearch_core::{
    AddDocumentsError, Document, Embedding, SearchResult, StoreError, VectorStore,
};
use sqlx::postgres::PgPool;
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{ColumnConfig, PgVectorStoreBuilder};
use crate::mapper::{doc_to_metadata, row_id, row_to_document};
use crate::{sql, PgVectorStoreError};

pub struct PgVectorStore<E> {
    pub(crate) embedder: E,
    pub(crate) pool: PgPool,
    pub(crate) table_name: String,
    pub(crate) columns: ColumnConfig,
    pub(crate) chunk_size: usize,
}

impl<E> fmt::Debug for PgVectorStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgVectorStore")
            .field("table_name", &self.table_name)
            .field("columns", &self.columns)
            .field("chunk_size", &self.chunk_size)
            .field("closed", &self.pool.is_closed())
            .finish()
    }
}

struct PendingRow {
    id: Uuid,
    content: String,
    metadata: Value,
    vector: Vec<f32>,
}

impl<E> PgVectorStore<E>
where
    E: Embedding,
{
    pub fn builder(embedder: E) -> PgVectorStoreBuilder<E> {
        PgVectorStoreBuilder::new(embedder)
    }

    pub(crate) fn new(
        embedder: E,
        pool: PgPool,
        table_name: String,
        columns: ColumnConfig,
        chunk_size: usize,
    ) -> Self {
        Self {
            embedder,
            pool,
            table_name,
            columns,
            chunk_size,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn columns(&self) -> &ColumnConfig {
        &self.columns
    }

    pub fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    fn query_error(&self, source: sqlx::Error) -> PgVectorStoreError {
        PgVectorStoreError::Query {
            table: self.table_name.clone(),
            source,
        }
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.pool.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    pub(crate) async fn ensure_table(&self) -> Result<(), PgVectorStoreError> {
        sqlx::query(sql::create_extension())
            .execute(&self.pool)
            .await
            .map_err(|err| self.query_error(err))?;
        sqlx::query(&sql::create_table(
            &self.table_name,
            &self.columns,
            self.embedder.dimension(),
        ))
        .execute(&self.pool)
        .await
        .map_err(|err| self.query_error(err))?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<u64, StoreError> {
        self.ensure_open()?;
        let result = sqlx::query(&sql::delete_all(&self.table_name))
            .execute(&self.pool)
            .await
            .map_err(|err| StoreError::from(self.query_error(err)))?;
        tracing::debug!(table = %self.table_name, rows = result.rows_affected(), "cleared table");
        Ok(result.rows_affected())
    }

    pub async fn count(&self) -> Result<u64, StoreError> {
        self.ensure_open()?;
        let count: i64 = sqlx::query_scalar(&sql::count_rows(&self.table_name))
            .fetch_one(&self.pool)
            .await
            .map_err(|err| StoreError::from(self.query_error(err)))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    fn pending_rows(
        &self,
        docs: &[Document],
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Vec<PendingRow>, StoreError> {
        if docs.len() != embeddings.len() {
            return Err(PgVectorStoreError::BatchMismatch {
                docs: docs.len(),
                embeddings: embeddings.len(),
            }
            .into());
        }

        let expected_dim = self.embedder.dimension();
        let mut rows = Vec::with_capacity(docs.len());
        for (doc, vector) in docs.iter().zip(embeddings) {
            if vector.len() != expected_dim {
                return Err(PgVectorStoreError::DimensionMismatch {
                    expected: expected_dim,
                    got: vector.len(),
                }
                .into());
            }
            let id = row_id(doc).map_err(StoreError::InvalidId)?;
            rows.push(PendingRow {
                id,
                content: doc.content.clone(),
                metadata: doc_to_metadata(doc),
                vector,
            });
        }
        Ok(rows)
    }

    async fn insert_chunk(&self, chunk: &[PendingRow]) -> Result<(), StoreError> {
        let mut builder =
            QueryBuilder::<Postgres>::new(sql::insert_prefix(&self.table_name, &self.columns));
        builder.push_values(chunk, |mut row, pending| {
            row.push_bind(pending.id)
                .push_bind(pending.content.clone())
                .push_bind(Json(pending.metadata.clone()))
                .push_bind(Vector::from(pending.vector.clone()));
        });
        builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|err| StoreError::from(self.query_error(err)))?;
        Ok(())
    }

    /// Embeds every document, then inserts in chunks of `chunk_size` rows.
    ///
    /// Each chunk commits on its own; on failure the error lists the ids
    /// of the chunks that already landed.
    pub async fn add_documents(
        &self,
        docs: Vec<Document>,
    ) -> Result<Vec<String>, AddDocumentsError> {
        let attempted = docs.len();
        let span = tracing::info_span!(
            "pgvector_insert",
            table = %self.table_name,
            batch_size = attempted,
        );

        async move {
            self.ensure_open()
                .map_err(|err| AddDocumentsError::nothing_inserted(attempted, err))?;

            let texts: Vec<String> = docs.iter().map(|doc| doc.content.clone()).collect();
            let embeddings = self
                .embedder
                .embed_batch(&texts)
                .await
                .map_err(|err| AddDocumentsError::nothing_inserted(attempted, err))?;

            let rows = self
                .pending_rows(&docs, embeddings)
                .map_err(|err| AddDocumentsError::nothing_inserted(attempted, err))?;

            let total_chunks = rows.len().div_ceil(self.chunk_size);
            let mut inserted = Vec::with_capacity(rows.len());
            for (chunk_index, chunk) in rows.chunks(self.chunk_size).enumerate() {
                if let Err(err) = self.insert_chunk(chunk).await {
                    tracing::warn!(
                        chunk_index = chunk_index + 1,
                        total_chunks = total_chunks,
                        inserted = inserted.len(),
                        error = %err,
                        "insert chunk failed"
                    );
                    return Err(AddDocumentsError::new(inserted, attempted, err));
                }
                inserted.extend(chunk.iter().map(|row| row.id.to_string()));
            }

            Ok::<_, AddDocumentsError>(inserted)
        }
        .instrument(span)
        .await
    }

    pub async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>, StoreError> {
        let span = tracing::info_span!("pgvector_query", table = %self.table_name, k = k);

        async move {
            self.ensure_open()?;
            if k == 0 {
                return Ok(Vec::new());
            }

            let query_embedding = self.embedder.embed(query).await?;
            let expected_dim = self.embedder.dimension();
            if query_embedding.len() != expected_dim {
                return Err(StoreError::DimensionMismatch {
                    expected: expected_dim,
                    got: query_embedding.len(),
                });
            }

            let limit = i64::try_from(k).unwrap_or(i64::MAX);
            let rows = sqlx::query(&sql::similarity_search(&self.table_name, &self.columns))
                .bind(Vector::from(query_embedding))
                .bind(limit)
                .fetch_all(&self.pool)
                .await
                .map_err(|err| StoreError::from(self.query_error(err)))?;

            let mut output = Vec::with_capacity(rows.len());
            for row in rows {
                let id: String = row
                    .try_get("id")
                    .map_err(|err| StoreError::from(self.query_error(err)))?;
                let content: Option<String> = row
                    .try_get("content")
                    .map_err(|err| StoreError::from(self.query_error(err)))?;
                let metadata: Option<Json<Value>> = row
                    .try_get("metadata")
                    .map_err(|err| StoreError::from(self.query_error(err)))?;
                let distance: f64 = row
                    .try_get(sql::DISTANCE_ALIAS)
                    .map_err(|err| StoreError::from(self.query_error(err)))?;

                let document = row_to_document(id, content, metadata.map(|json| json.0))?;
                output.push(SearchResult {
                    document,
                    distance: distance as f32,
                });
            }

            Ok::<_, StoreError>(output)
        }
        .instrument(span)
        .await
    }

    pub async fn close(&self) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.pool.close().await;
        tracing::debug!(table = %self.table_name, "closed pgvector pool");
        Ok(())
    }
}

#[async_trait::async_trait]
impl<E> VectorStore for PgVectorStore<E>
where
    E: Embedding + Send + Sync,
{
    async fn clear(&self) -> Result<u64, StoreError> {
        PgVectorStore::clear(self).await
    }

    async fn add_documents(&self, docs: Vec<Document>) -> Result<Vec<String>, AddDocumentsError> {
        PgVectorStore::add_documents(self, docs).await
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>, StoreError> {
        PgVectorStore::similarity_search_with_score(self, query, k).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        PgVectorStore::count(self).await
    }

    async fn close(&self) -> Result<(), StoreError> {
        PgVectorStore::close(self).await
    }
}
