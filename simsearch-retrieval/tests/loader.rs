use std::fs;

use serde_json::json;
use tempfile::tempdir;
use simsearch_retrieval::{load_documents, parse_documents, LoadError};

#[tokio::test]
async fn loads_content_and_metadata() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("data.json");
    fs::write(
        &path,
        r#"[
            {"content": "Senior frontend developer, React", "metadata": {"id": 1, "tags": ["react"]}},
            {"content": "Backend engineer, Rust", "metadata": {}}
        ]"#,
    )
    .expect("write temp file");

    let documents = load_documents(&path).await.expect("documents should load");

    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].content, "Senior frontend developer, React");
    assert_eq!(documents[0].metadata.get("id"), Some(&json!(1)));
    assert_eq!(documents[0].metadata.get("tags"), Some(&json!(["react"])));
    assert!(documents[1].metadata.is_empty());
    assert!(documents.iter().all(|doc| !doc.has_id()));
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("absent.json");

    let error = load_documents(&path).await.expect_err("missing file should fail");

    assert!(matches!(error, LoadError::NotFound { path: error_path } if error_path == path));
}

#[tokio::test]
async fn malformed_json_is_parse_error() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("data.json");
    fs::write(&path, "[{\"content\": ").expect("write temp file");

    let error = load_documents(&path).await.expect_err("malformed json should fail");

    assert!(matches!(error, LoadError::Parse { .. }));
}

#[test]
fn top_level_object_is_parse_error() {
    let error = parse_documents(r#"{"content": "A", "metadata": {}}"#, "data.json".as_ref())
        .expect_err("object should be rejected");
    assert!(matches!(error, LoadError::Parse { .. }));
}

#[test]
fn record_without_content_names_its_index() {
    let raw = r#"[{"content": "A", "metadata": {}}, {"metadata": {}}]"#;

    let error = parse_documents(raw, "data.json".as_ref()).expect_err("missing content");

    match error {
        LoadError::InvalidRecord { index, source, .. } => {
            assert_eq!(index, 1);
            assert!(source.to_string().contains("content"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn record_without_metadata_is_rejected() {
    let error = parse_documents(r#"[{"content": "A"}]"#, "data.json".as_ref())
        .expect_err("metadata is required");
    assert!(matches!(error, LoadError::InvalidRecord { index: 0, .. }));
}

#[test]
fn non_object_metadata_is_rejected() {
    let error = parse_documents(
        r#"[{"content": "A", "metadata": ["not", "a", "map"]}]"#,
        "data.json".as_ref(),
    )
    .expect_err("metadata must be an object");
    assert!(matches!(error, LoadError::InvalidRecord { index: 0, .. }));
}

#[test]
fn page_content_alias_is_accepted() {
    let documents = parse_documents(
        r#"[{"pageContent": "A", "metadata": {"source": "langchain"}}]"#,
        "data.json".as_ref(),
    )
    .expect("alias should parse");
    assert_eq!(documents[0].content, "A");
}

#[test]
fn empty_array_loads_no_documents() {
    let documents = parse_documents("[]", "data.json".as_ref()).expect("empty array");
    assert!(documents.is_empty());
}
