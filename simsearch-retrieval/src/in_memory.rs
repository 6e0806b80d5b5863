use std::sync::atomic::{AtomicBool, Ordering};

use simsearch_core::{
    AddDocumentsError, Document, Embedding, SearchResult, StoreError, VectorStore,
};
use tokio::sync::RwLock;
use uuid::Uuid;

struct StoredRow {
    document: Document,
    embedding: Vec<f32>,
}

/// `VectorStore` kept in process memory, ranked by cosine distance.
///
/// Stands in for the database in tests and offline runs. Re-adding an
/// existing id replaces the row.
pub struct InMemoryVectorStore<E> {
    embedder: E,
    rows: RwLock<Vec<StoredRow>>,
    closed: AtomicBool,
}

impl<E> InMemoryVectorStore<E>
where
    E: Embedding,
{
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            rows: RwLock::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<E> VectorStore for InMemoryVectorStore<E>
where
    E: Embedding,
{
    async fn clear(&self) -> Result<u64, StoreError> {
        self.ensure_open()?;
        let mut rows = self.rows.write().await;
        let removed = rows.len() as u64;
        rows.clear();
        Ok(removed)
    }

    async fn add_documents(&self, docs: Vec<Document>) -> Result<Vec<String>, AddDocumentsError> {
        let attempted = docs.len();
        self.ensure_open()
            .map_err(|err| AddDocumentsError::nothing_inserted(attempted, err))?;

        let texts: Vec<String> = docs.iter().map(|doc| doc.content.clone()).collect();
        let embeddings = self
            .embedder
            .embed_batch(&texts)
            .await
            .map_err(|err| AddDocumentsError::nothing_inserted(attempted, err))?;
        if embeddings.len() != attempted {
            return Err(AddDocumentsError::nothing_inserted(
                attempted,
                StoreError::Internal(
                    format!(
                        "embedder returned {} vectors for {attempted} documents",
                        embeddings.len()
                    )
                    .into(),
                ),
            ));
        }

        let expected = self.embedder.dimension();
        if let Some(bad) = embeddings.iter().find(|embedding| embedding.len() != expected) {
            return Err(AddDocumentsError::nothing_inserted(
                attempted,
                StoreError::DimensionMismatch {
                    expected,
                    got: bad.len(),
                },
            ));
        }

        let mut rows = self.rows.write().await;
        let mut ids = Vec::with_capacity(attempted);
        for (mut document, embedding) in docs.into_iter().zip(embeddings) {
            if !document.has_id() {
                document.id = Uuid::new_v4().to_string();
            }
            document.embedding = None;
            ids.push(document.id.clone());

            let row = StoredRow {
                document,
                embedding,
            };
            match rows.iter_mut().find(|existing| existing.document.id == row.document.id) {
                Some(existing) => *existing = row,
                None => rows.push(row),
            }
        }
        Ok(ids)
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>, StoreError> {
        self.ensure_open()?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let rows = self.rows.read().await;
        let mut scored: Vec<SearchResult> = rows
            .iter()
            .map(|row| {
                let mut distance = cosine_distance(&query_embedding, &row.embedding);
                if distance.is_nan() {
                    distance = f32::INFINITY;
                }
                SearchResult {
                    document: row.document.clone(),
                    distance,
                }
            })
            .collect();

        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(k);
        Ok(scored)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.ensure_open()?;
        Ok(self.rows.read().await.len() as u64)
    }

    async fn close(&self) -> Result<(), StoreError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

/// `1 - cosine_similarity`, the metric behind pgvector's `<=>`. Zero vectors are at
/// distance 1 from everything.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}
