use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use simsearch_core::Document;

use crate::LoadError;

/// One entry of the document file.
///
/// Both fields are required; `metadata` must be a JSON object.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DocumentRecord {
    #[serde(alias = "pageContent")]
    pub content: String,
    pub metadata: Map<String, Value>,
}

impl From<DocumentRecord> for Document {
    fn from(record: DocumentRecord) -> Self {
        Document::new(record.content, record.metadata.into_iter().collect())
    }
}

pub async fn load_documents(path: impl AsRef<Path>) -> Result<Vec<Document>, LoadError> {
    let path = path.as_ref().to_path_buf();
    let raw = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(LoadError::NotFound { path });
        }
        Err(source) => return Err(LoadError::Io { path, source }),
    };

    let documents = parse_documents(&raw, &path)?;
    tracing::debug!(path = %path.display(), count = documents.len(), "loaded documents");
    Ok(documents)
}

/// `path` is only used in error messages.
pub fn parse_documents(raw: &str, path: &Path) -> Result<Vec<Document>, LoadError> {
    let entries: Vec<Value> = serde_json::from_str(raw).map_err(|source| LoadError::Parse {
        path: PathBuf::from(path),
        source,
    })?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value::<DocumentRecord>(entry)
                .map(Document::from)
                .map_err(|source| LoadError::InvalidRecord {
                    path: PathBuf::from(path),
                    index,
                    source,
                })
        })
        .collect()
}
