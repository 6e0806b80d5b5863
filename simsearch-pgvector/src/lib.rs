//! Postgres + pgvector store for simsearch.
//!
//! `PgVectorStore` keeps one row per document in a dedicated table
//! (`id uuid`, `content text`, `metadata jsonb`, `vector vector(n)`) and
//! ranks rows by cosine distance (`<=>`). The embedder is injected
//! (`E: Embedding`); documents and queries are embedded inside the store.
//!
//! Connection parameters come from the builder; credentials not set there
//! fall back to the usual `PGUSER` / `PGPASSWORD` environment variables.

mod config;
mod error;
pub mod mapper;
pub mod sql;
mod store;

pub use config::{ColumnConfig, PgVectorStoreBuilder};
pub use error::PgVectorStoreError;
pub use store::PgVectorStore;
