use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use simsearch_core::{AddDocumentsError, Document, SearchResult, StoreError, VectorStore};

#[derive(Clone, Default)]
struct RecordingStore {
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl VectorStore for RecordingStore {
    async fn clear(&self) -> Result<u64, StoreError> {
        Ok(4)
    }

    async fn add_documents(&self, docs: Vec<Document>) -> Result<Vec<String>, AddDocumentsError> {
        Ok(docs.iter().map(|doc| doc.content.clone()).collect())
    }

    async fn similarity_search_with_score(
        &self,
        _query: &str,
        _k: usize,
    ) -> Result<Vec<SearchResult>, StoreError> {
        Ok(Vec::new())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(0)
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn vector_store_trait_object_safe() {
    let _: Option<Arc<dyn VectorStore>> = None;
}

#[tokio::test]
async fn boxed_store_forwards_to_inner() {
    let inner = RecordingStore::default();
    let closes = inner.closes.clone();
    let store: Box<dyn VectorStore> = Box::new(inner);

    assert_eq!(store.clear().await.unwrap(), 4);
    let ids = store
        .add_documents(vec![Document::new("a", Default::default())])
        .await
        .unwrap();
    assert_eq!(ids, vec!["a".to_string()]);

    store.close().await.unwrap();
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}
