use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use simsearch_embeddings::{DEFAULT_BATCH_SIZE, OPENAI_BASE_URL};
use simsearch_pipeline::DEFAULT_K;

pub const DEFAULT_MODEL: &str = "text-embedding-3-large";
/// pgvector's HNSW index accepts at most 2000 dimensions.
pub const DEFAULT_DIMENSIONS: usize = 2000;
pub const DEFAULT_PG_HOST: &str = "127.0.0.1";
pub const DEFAULT_PG_PORT: u16 = 5432;
pub const DEFAULT_PG_DATABASE: &str = "vector_demo";
pub const DEFAULT_TABLE: &str = "similarity_search";
pub const DEFAULT_DATA_PATH: &str = "similarity_search/data.json";

/// Everything the run needs besides the query.
#[derive(Clone)]
pub struct Settings {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub embedding_model: String,
    pub batch_size: usize,
    pub dimensions: usize,
    pub pg_host: String,
    pub pg_port: u16,
    pub pg_database: String,
    pub table_name: String,
    pub data_path: PathBuf,
    pub top_k: usize,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let api_key = if self.openai_api_key.is_empty() {
            "<none>"
        } else {
            "<redacted>"
        };

        f.debug_struct("Settings")
            .field("openai_api_key", &api_key)
            .field("openai_base_url", &self.openai_base_url)
            .field("embedding_model", &self.embedding_model)
            .field("batch_size", &self.batch_size)
            .field("dimensions", &self.dimensions)
            .field("pg_host", &self.pg_host)
            .field("pg_port", &self.pg_port)
            .field("pg_database", &self.pg_database)
            .field("table_name", &self.table_name)
            .field("data_path", &self.data_path)
            .field("top_k", &self.top_k)
            .finish()
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let text = |name: &str, default: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let settings = Self {
            openai_api_key: lookup("OPENAI_API_KEY").unwrap_or_default(),
            openai_base_url: text("OPENAI_BASE_URL", OPENAI_BASE_URL),
            embedding_model: text("SIMSEARCH_EMBEDDING_MODEL", DEFAULT_MODEL),
            batch_size: parsed(&lookup, "SIMSEARCH_EMBEDDING_BATCH_SIZE", DEFAULT_BATCH_SIZE)?,
            dimensions: parsed(&lookup, "SIMSEARCH_EMBEDDING_DIMENSIONS", DEFAULT_DIMENSIONS)?,
            pg_host: text("SIMSEARCH_PG_HOST", DEFAULT_PG_HOST),
            pg_port: parsed(&lookup, "SIMSEARCH_PG_PORT", DEFAULT_PG_PORT)?,
            pg_database: text("SIMSEARCH_PG_DATABASE", DEFAULT_PG_DATABASE),
            table_name: text("SIMSEARCH_TABLE", DEFAULT_TABLE),
            data_path: PathBuf::from(text("SIMSEARCH_DATA_PATH", DEFAULT_DATA_PATH)),
            top_k: DEFAULT_K,
        };

        if settings.batch_size == 0 {
            anyhow::bail!("SIMSEARCH_EMBEDDING_BATCH_SIZE must be greater than 0");
        }
        if settings.dimensions == 0 {
            anyhow::bail!("SIMSEARCH_EMBEDDING_DIMENSIONS must be greater than 0");
        }
        Ok(settings)
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name).filter(|value| !value.trim().is_empty()) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {name}: {value:?}")),
        None => Ok(default),
    }
}
