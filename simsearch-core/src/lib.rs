mod document;
mod embedding;
mod error;
mod value;
mod vector_store;

pub use document::Document;
pub use embedding::Embedding;
pub use error::{AddDocumentsError, EmbeddingError, StoreError};
pub use value::Value;
pub use vector_store::{SearchResult, VectorStore};
