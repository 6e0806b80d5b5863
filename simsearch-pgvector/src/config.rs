use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::sql::validate_identifier;
use crate::store::PgVectorStore;
use crate::PgVectorStoreError;
use simsearch_core::Embedding;

/// Column names of the store table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnConfig {
    pub id: String,
    pub vector: String,
    pub content: String,
    pub metadata: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            vector: "vector".to_string(),
            content: "content".to_string(),
            metadata: "metadata".to_string(),
        }
    }
}

impl ColumnConfig {
    pub fn validate(&self) -> Result<(), PgVectorStoreError> {
        validate_identifier("id column", &self.id)?;
        validate_identifier("vector column", &self.vector)?;
        validate_identifier("content column", &self.content)?;
        validate_identifier("metadata column", &self.metadata)?;
        Ok(())
    }
}

pub struct PgVectorStoreBuilder<E> {
    embedder: E,
    database_url: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    database: Option<String>,
    username: Option<String>,
    password: Option<String>,
    table_name: Option<String>,
    columns: ColumnConfig,
    chunk_size: usize,
    max_connections: u32,
    min_connections: u32,
    acquire_timeout: Duration,
    ensure_table: bool,
}

impl<E> fmt::Debug for PgVectorStoreBuilder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let password = if self.password.is_some() {
            "<redacted>"
        } else {
            "<none>"
        };
        let database_url = if self.database_url.is_some() {
            "<redacted>"
        } else {
            "<none>"
        };

        f.debug_struct("PgVectorStoreBuilder")
            .field("database_url", &database_url)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &password)
            .field("table_name", &self.table_name)
            .field("columns", &self.columns)
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

impl<E> PgVectorStoreBuilder<E>
where
    E: Embedding,
{
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            database_url: None,
            host: None,
            port: None,
            database: None,
            username: None,
            password: None,
            table_name: None,
            columns: ColumnConfig::default(),
            chunk_size: 500,
            max_connections: 5,
            min_connections: 0,
            acquire_timeout: Duration::from_secs(30),
            ensure_table: true,
        }
    }

    /// Base connection string; host, port and friends set on the builder
    /// override its parts.
    pub fn database_url(mut self, value: impl Into<String>) -> Self {
        self.database_url = Some(value.into());
        self
    }

    pub fn host(mut self, value: impl Into<String>) -> Self {
        self.host = Some(value.into());
        self
    }

    pub fn port(mut self, value: u16) -> Self {
        self.port = Some(value);
        self
    }

    pub fn database(mut self, value: impl Into<String>) -> Self {
        self.database = Some(value.into());
        self
    }

    pub fn username(mut self, value: impl Into<String>) -> Self {
        self.username = Some(value.into());
        self
    }

    pub fn password(mut self, value: impl Into<String>) -> Self {
        self.password = Some(value.into());
        self
    }

    pub fn table_name(mut self, value: impl Into<String>) -> Self {
        self.table_name = Some(value.into());
        self
    }

    pub fn columns(mut self, value: ColumnConfig) -> Self {
        self.columns = value;
        self
    }

    /// Rows per `INSERT` statement.
    pub fn chunk_size(mut self, value: usize) -> Self {
        self.chunk_size = value;
        self
    }

    pub fn max_connections(mut self, value: u32) -> Self {
        self.max_connections = value;
        self
    }

    pub fn min_connections(mut self, value: u32) -> Self {
        self.min_connections = value;
        self
    }

    pub fn acquire_timeout(mut self, value: Duration) -> Self {
        self.acquire_timeout = value;
        self
    }

    /// Create the `vector` extension and the table when missing. On by default.
    pub fn ensure_table(mut self, value: bool) -> Self {
        self.ensure_table = value;
        self
    }

    /// Options that `build` will connect with.
    pub fn connect_options(&self) -> Result<PgConnectOptions, PgVectorStoreError> {
        let mut options = match &self.database_url {
            Some(url) => PgConnectOptions::from_str(url)
                .map_err(|err| PgVectorStoreError::Config(format!("invalid database_url: {err}")))?,
            None => PgConnectOptions::new(),
        };

        if let Some(host) = &self.host {
            options = options.host(host);
        }
        if let Some(port) = self.port {
            options = options.port(port);
        }
        if let Some(database) = &self.database {
            options = options.database(database);
        }
        if let Some(username) = &self.username {
            options = options.username(username);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        Ok(options)
    }

    fn validate(&self) -> Result<String, PgVectorStoreError> {
        let table_name = self
            .table_name
            .clone()
            .ok_or_else(|| PgVectorStoreError::Config("table_name is required".to_string()))?;
        validate_identifier("table name", &table_name)?;
        self.columns.validate()?;

        if self.chunk_size == 0 {
            return Err(PgVectorStoreError::Config(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.embedder.dimension() == 0 {
            return Err(PgVectorStoreError::Config(
                "embedder dimension must be greater than 0".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(PgVectorStoreError::Config(
                "max_connections must be greater than 0".to_string(),
            ));
        }
        Ok(table_name)
    }

    pub async fn build(self) -> Result<PgVectorStore<E>, PgVectorStoreError> {
        let table_name = self.validate()?;
        let options = self.connect_options()?;

        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(PgVectorStoreError::Connection)?;

        let store = PgVectorStore::new(
            self.embedder,
            pool,
            table_name,
            self.columns,
            self.chunk_size,
        );

        if self.ensure_table {
            store.ensure_table().await?;
        }

        tracing::info!(
            table = %store.table_name(),
            dimension = store.dimension(),
            "connected to pgvector store"
        );
        Ok(store)
    }
}
