//! `similarity-search [QUERY]`
//!
//! Clears the table, ingests `similarity_search/data.json`, and prints the ten
//! documents nearest to QUERY (default "frontend dev") by cosine distance.

mod config;
mod output;

use anyhow::Context;
use clap::Parser;
use simsearch_embeddings::OpenAiEmbedding;
use simsearch_pgvector::PgVectorStore;
use simsearch_pipeline::{resolve_query, PipelineDriver};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Settings;

#[derive(Parser, Debug)]
#[command(name = "similarity-search", version, about)]
struct Cli {
    /// Text to search for. Defaults to "frontend dev".
    query: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries the results only
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    let query = resolve_query(cli.query);

    if settings.openai_api_key.is_empty() {
        warn!("OPENAI_API_KEY is not set; embedding requests will be rejected");
    }

    let embedder = OpenAiEmbedding::new(
        settings.openai_api_key.clone(),
        settings.embedding_model.clone(),
        settings.dimensions,
    )
    .with_base_url(settings.openai_base_url.clone())
    .with_batch_size(settings.batch_size);

    let store = PgVectorStore::builder(embedder)
        .host(settings.pg_host.clone())
        .port(settings.pg_port)
        .database(settings.pg_database.clone())
        .table_name(settings.table_name.clone())
        .build()
        .await
        .with_context(|| {
            format!(
                "failed to connect to postgres at {}:{}/{}",
                settings.pg_host, settings.pg_port, settings.pg_database
            )
        })?;
    info!(table = %settings.table_name, "connected to vector store");

    let report = PipelineDriver::new(store, settings.data_path.clone())
        .with_k(settings.top_k)
        .run(&query)
        .await?;

    if !report.insert.is_complete() {
        warn!(
            inserted = report.insert.inserted(),
            loaded = report.loaded,
            "searching over a partially inserted document set"
        );
    }

    print!("{}", output::format_results(&report.query, &report.results));
    Ok(())
}
