use std::collections::HashMap;

use serde_json::{Map, Value};
use simsearch_core::Document;
use uuid::Uuid;

use crate::error::PgVectorStoreError;

pub fn doc_to_metadata(doc: &Document) -> Value {
    Value::Object(Map::from_iter(doc.metadata.clone()))
}

/// Reuses the document's id when it is a UUID, otherwise generates one.
/// A non-empty id that is not a UUID is rejected.
pub fn row_id(doc: &Document) -> Result<Uuid, String> {
    if !doc.has_id() {
        return Ok(Uuid::new_v4());
    }
    Uuid::parse_str(doc.id.trim()).map_err(|_| doc.id.clone())
}

pub fn row_to_document(
    id: String,
    content: Option<String>,
    metadata: Option<Value>,
) -> Result<Document, PgVectorStoreError> {
    let metadata = match metadata {
        None | Some(Value::Null) => HashMap::new(),
        Some(Value::Object(map)) => map.into_iter().collect(),
        Some(other) => {
            return Err(PgVectorStoreError::Malformed(format!(
                "metadata for row '{id}' must be an object, got {other}"
            )))
        }
    };

    Ok(Document {
        id,
        content: content.unwrap_or_default(),
        metadata,
        embedding: None,
    })
}
