//! Embedding providers for simsearch.
//!
//! `OpenAiEmbedding` talks to the OpenAI embeddings endpoint with a fixed
//! output dimensionality and a maximum number of inputs per request.
//!
//! Environment variables commonly used by callers:
//! - `OPENAI_API_KEY`
//! - `OPENAI_BASE_URL` (optional)

mod error;
mod openai;

pub use error::EmbeddingProviderError;
pub use openai::{OpenAiEmbedding, DEFAULT_BATCH_SIZE, OPENAI_BASE_URL};
