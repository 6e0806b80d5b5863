use std::path::PathBuf;

use simsearch_core::VectorStore;
use simsearch_retrieval::load_documents;
use tracing::Instrument;

use crate::diagnostics::{error_chain, list_directory};
use crate::{InsertReport, PipelineError, PipelineReport, PipelineStage};

pub const DEFAULT_QUERY: &str = "frontend dev";
pub const DEFAULT_K: usize = 10;

/// The query argument, or `DEFAULT_QUERY` with a warning when it is absent.
pub fn resolve_query(arg: Option<String>) -> String {
    match arg.filter(|query| !query.is_empty()) {
        Some(query) => query,
        None => {
            tracing::warn!(
                default = DEFAULT_QUERY,
                "no query string given on the command line, using the default"
            );
            DEFAULT_QUERY.to_string()
        }
    }
}

pub struct PipelineDriver<S> {
    store: S,
    documents_path: PathBuf,
    diagnostics_dir: PathBuf,
    k: usize,
    stage: PipelineStage,
}

impl<S> PipelineDriver<S>
where
    S: VectorStore,
{
    /// `store` must already be connected.
    pub fn new(store: S, documents_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            documents_path: documents_path.into(),
            diagnostics_dir: PathBuf::from("."),
            k: DEFAULT_K,
            stage: PipelineStage::Connected,
        }
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Directory listed in the logs when insertion fails.
    pub fn with_diagnostics_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.diagnostics_dir = dir.into();
        self
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    fn advance(&mut self, next: PipelineStage) {
        debug_assert!(next > self.stage, "stage {next} after {}", self.stage);
        tracing::debug!(from = %self.stage, to = %next, "pipeline stage");
        self.stage = next;
    }

    /// Runs clear, load, insert and query, then closes the store.
    ///
    /// Insertion failures are recorded in the report and the query still
    /// runs. Any other failure ends the run early; the store is closed in
    /// every case and the first error is returned.
    pub async fn run(mut self, query: &str) -> Result<PipelineReport, PipelineError> {
        let span = tracing::info_span!("pipeline", query = %query);
        let outcome = self.execute(query).instrument(span).await;
        let closed = self.store.close().await;

        match (outcome, closed) {
            (Ok(mut report), Ok(())) => {
                self.advance(PipelineStage::Closed);
                report.stage = PipelineStage::Closed;
                Ok(report)
            }
            (Ok(_), Err(err)) => Err(PipelineError::Close(err)),
            (Err(err), Ok(())) => {
                tracing::debug!(stage = %self.stage, "store closed after failure");
                Err(err)
            }
            (Err(err), Err(close_err)) => {
                tracing::warn!(error = %close_err, "failed to close store after failure");
                Err(err)
            }
        }
    }

    async fn execute(&mut self, query: &str) -> Result<PipelineReport, PipelineError> {
        let cleared = self.store.clear().await.map_err(PipelineError::Clear)?;
        self.advance(PipelineStage::Cleared);
        tracing::info!(rows = cleared, "Cleaned database!");

        let documents = load_documents(&self.documents_path).await?;
        let loaded = documents.len();
        self.advance(PipelineStage::Loaded);

        let insert = match self.store.add_documents(documents).await {
            Ok(ids) => {
                self.advance(PipelineStage::Inserted);
                tracing::info!(count = ids.len(), "Documents added successfully");
                InsertReport::Complete { ids }
            }
            Err(err) => {
                self.advance(PipelineStage::InsertFailed);
                tracing::error!(
                    error = %error_chain(&err),
                    inserted = err.inserted_ids.len(),
                    attempted = err.attempted,
                    "Error adding documents"
                );
                let directory_listing = list_directory(&self.diagnostics_dir).await;
                tracing::info!(files = ?directory_listing, "Current directory files");
                InsertReport::Partial {
                    inserted_ids: err.inserted_ids,
                    attempted: err.attempted,
                    error: err.source,
                    directory_listing,
                }
            }
        };

        let rows_after_insert = match self.store.count().await {
            Ok(rows) => {
                tracing::debug!(rows, "rows in table after insert");
                Some(rows)
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not count rows after insert");
                None
            }
        };

        let results = self
            .store
            .similarity_search_with_score(query, self.k)
            .await
            .map_err(PipelineError::Search)?;
        self.advance(PipelineStage::Queried);

        Ok(PipelineReport {
            query: query.to_string(),
            cleared,
            loaded,
            insert,
            rows_after_insert,
            results,
            stage: self.stage,
        })
    }
}
