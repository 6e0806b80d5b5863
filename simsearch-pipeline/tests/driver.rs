use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use simsearch_core::{
    AddDocumentsError, Document, EmbeddingError, SearchResult, StoreError, VectorStore,
};
use simsearch_pipeline::{InsertReport, PipelineDriver, PipelineError, PipelineStage};
use tempfile::{tempdir, TempDir};

#[derive(Default)]
struct Calls {
    log: Vec<&'static str>,
    closes: usize,
}

/// Records every call; failures are switched on per operation.
#[derive(Clone, Default)]
struct ScriptedStore {
    calls: Arc<Mutex<Calls>>,
    fail_clear: bool,
    fail_insert_after: Option<usize>,
    fail_search: bool,
    fail_close: bool,
}

impl ScriptedStore {
    fn log(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().log.clone()
    }

    fn closes(&self) -> usize {
        self.calls.lock().unwrap().closes
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().log.push(call);
    }
}

#[async_trait]
impl VectorStore for ScriptedStore {
    async fn clear(&self) -> Result<u64, StoreError> {
        self.record("clear");
        if self.fail_clear {
            return Err(StoreError::Connection("connection refused".into()));
        }
        Ok(2)
    }

    async fn add_documents(&self, docs: Vec<Document>) -> Result<Vec<String>, AddDocumentsError> {
        self.record("add_documents");
        let ids: Vec<String> = (0..docs.len()).map(|i| format!("row-{i}")).collect();
        match self.fail_insert_after {
            Some(n) => Err(AddDocumentsError::new(
                ids.into_iter().take(n).collect(),
                docs.len(),
                EmbeddingError::QuotaExceeded("You exceeded your current quota".to_string()),
            )),
            None => Ok(ids),
        }
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>, StoreError> {
        self.record("search");
        if self.fail_search {
            return Err(StoreError::Embedding(EmbeddingError::Authentication(
                "Incorrect API key provided".to_string(),
            )));
        }
        Ok(vec![SearchResult {
            document: Document::new(query, HashMap::new()),
            distance: 0.0,
        }]
        .into_iter()
        .take(k)
        .collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.record("count");
        Ok(0)
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.record("close");
        self.calls.lock().unwrap().closes += 1;
        if self.fail_close {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

fn data_file(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("data.json");
    fs::write(&path, contents).expect("write data file");
    (dir, path)
}

fn three_documents() -> (TempDir, PathBuf) {
    data_file(
        &json!([
            {"content": "A", "metadata": {}},
            {"content": "B", "metadata": {}},
            {"content": "C", "metadata": {}}
        ])
        .to_string(),
    )
}

#[tokio::test]
async fn successful_run_visits_every_stage_and_closes_once() {
    let (_dir, path) = three_documents();
    let store = ScriptedStore::default();

    let report = PipelineDriver::new(store.clone(), &path)
        .run("frontend dev")
        .await
        .expect("run should succeed");

    assert_eq!(
        store.log(),
        vec!["clear", "add_documents", "count", "search", "close"]
    );
    assert_eq!(store.closes(), 1);
    assert_eq!(report.stage, PipelineStage::Closed);
    assert_eq!(report.cleared, 2);
    assert_eq!(report.loaded, 3);
    assert!(report.insert.is_complete());
    assert_eq!(report.insert.inserted(), 3);
    assert_eq!(report.query, "frontend dev");
    assert_eq!(report.results[0].document.content, "frontend dev");
}

#[tokio::test]
async fn partial_insert_still_runs_the_search() {
    let (dir, path) = three_documents();
    fs::write(dir.path().join("marker.txt"), "x").expect("write marker");
    let store = ScriptedStore {
        fail_insert_after: Some(1),
        ..ScriptedStore::default()
    };

    let report = PipelineDriver::new(store.clone(), &path)
        .with_diagnostics_dir(dir.path())
        .run("A")
        .await
        .expect("insert failure must not abort the run");

    assert_eq!(
        store.log(),
        vec!["clear", "add_documents", "count", "search", "close"]
    );
    assert_eq!(store.closes(), 1);
    assert!(!report.insert.is_complete());
    match report.insert {
        InsertReport::Partial {
            inserted_ids,
            attempted,
            error,
            directory_listing,
        } => {
            assert_eq!(inserted_ids, vec!["row-0".to_string()]);
            assert_eq!(attempted, 3);
            assert!(matches!(
                error,
                StoreError::Embedding(EmbeddingError::QuotaExceeded(_))
            ));
            assert_eq!(
                directory_listing,
                vec!["data.json".to_string(), "marker.txt".to_string()]
            );
        }
        InsertReport::Complete { .. } => panic!("expected a partial insert"),
    }
    assert_eq!(report.results.len(), 1);
}

#[tokio::test]
async fn clear_failure_is_fatal_but_still_closes() {
    let (_dir, path) = three_documents();
    let store = ScriptedStore {
        fail_clear: true,
        ..ScriptedStore::default()
    };

    let err = PipelineDriver::new(store.clone(), &path)
        .run("A")
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Clear(StoreError::Connection(_))));
    assert_eq!(store.log(), vec!["clear", "close"]);
    assert_eq!(store.closes(), 1);
}

#[tokio::test]
async fn missing_document_file_is_fatal_and_skips_insert() {
    let dir = tempdir().expect("temp dir");
    let store = ScriptedStore::default();

    let err = PipelineDriver::new(store.clone(), dir.path().join("absent.json"))
        .run("A")
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Load(_)));
    assert_eq!(store.log(), vec!["clear", "close"]);
}

#[tokio::test]
async fn malformed_document_file_is_fatal() {
    let (_dir, path) = data_file(r#"[{"content": 42, "metadata": {}}]"#);
    let store = ScriptedStore::default();

    let err = PipelineDriver::new(store.clone(), &path)
        .run("A")
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Load(_)));
    assert_eq!(store.closes(), 1);
}

#[tokio::test]
async fn search_failure_is_fatal_but_still_closes() {
    let (_dir, path) = three_documents();
    let store = ScriptedStore {
        fail_search: true,
        ..ScriptedStore::default()
    };

    let err = PipelineDriver::new(store.clone(), &path)
        .run("A")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Search(StoreError::Embedding(EmbeddingError::Authentication(_)))
    ));
    assert_eq!(store.closes(), 1);
}

#[tokio::test]
async fn close_failure_after_success_is_reported() {
    let (_dir, path) = three_documents();
    let store = ScriptedStore {
        fail_close: true,
        ..ScriptedStore::default()
    };

    let err = PipelineDriver::new(store.clone(), &path)
        .run("A")
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Close(StoreError::Closed)));
    assert_eq!(store.closes(), 1);
}

#[tokio::test]
async fn close_failure_does_not_mask_earlier_error() {
    let (_dir, path) = three_documents();
    let store = ScriptedStore {
        fail_search: true,
        fail_close: true,
        ..ScriptedStore::default()
    };

    let err = PipelineDriver::new(store.clone(), &path)
        .run("A")
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Search(_)));
}

#[tokio::test]
async fn k_limits_the_search() {
    let (_dir, path) = three_documents();
    let store = ScriptedStore::default();

    let report = PipelineDriver::new(store, &path)
        .with_k(0)
        .run("A")
        .await
        .unwrap();

    assert!(report.results.is_empty());
}

#[test]
fn new_driver_starts_connected() {
    let driver = PipelineDriver::new(ScriptedStore::default(), "data.json");
    assert_eq!(driver.stage(), PipelineStage::Connected);
}
