use std::collections::HashMap;

use serde_json::json;
use simsearch_core::Document;
use simsearch_pgvector::mapper::{doc_to_metadata, row_id, row_to_document};
use simsearch_pgvector::PgVectorStoreError;

#[test]
fn doc_metadata_becomes_json_object() {
    let mut metadata = HashMap::new();
    metadata.insert("team".to_string(), json!("web"));
    let doc = Document::new("frontend dev", metadata);

    assert_eq!(doc_to_metadata(&doc), json!({"team": "web"}));
}

#[test]
fn row_id_generates_uuid_for_new_documents() {
    let doc = Document::new("a", HashMap::new());
    let first = row_id(&doc).unwrap();
    let second = row_id(&doc).unwrap();
    assert_ne!(first, second);
}

#[test]
fn row_id_keeps_uuid_ids_and_rejects_others() {
    let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";
    let doc = Document::new("a", HashMap::new()).with_id(id);
    assert_eq!(row_id(&doc).unwrap().to_string(), id);

    let doc = Document::new("a", HashMap::new()).with_id("doc-1");
    assert_eq!(row_id(&doc).unwrap_err(), "doc-1");
}

#[test]
fn row_to_document_rebuilds_metadata() {
    let doc = row_to_document(
        "row-1".to_string(),
        Some("A".to_string()),
        Some(json!({"source": "data.json"})),
    )
    .unwrap();

    assert_eq!(doc.id, "row-1");
    assert_eq!(doc.content, "A");
    assert_eq!(doc.metadata.get("source"), Some(&json!("data.json")));
    assert!(doc.embedding.is_none());
}

#[test]
fn row_to_document_treats_null_as_empty() {
    let doc = row_to_document("row-1".to_string(), None, None).unwrap();
    assert!(doc.metadata.is_empty());
    assert!(doc.content.is_empty());
}

#[test]
fn row_to_document_rejects_non_object_metadata() {
    let err = row_to_document("row-1".to_string(), None, Some(json!([1, 2]))).unwrap_err();
    assert!(matches!(err, PgVectorStoreError::Malformed(_)));
}
