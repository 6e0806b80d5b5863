mod error;
mod hash_embedder;
mod in_memory;
mod loader;

pub use error::LoadError;
pub use hash_embedder::HashEmbedder;
pub use in_memory::{cosine_distance, InMemoryVectorStore};
pub use loader::{load_documents, parse_documents, DocumentRecord};
