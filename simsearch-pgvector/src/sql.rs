//! Statement text for the pgvector table.
//!
//! Table and column names are validated by the builder and always emitted
//! double-quoted; values are always bound, never interpolated.

use crate::{ColumnConfig, PgVectorStoreError};

/// Longest identifier Postgres keeps without truncation.
const MAX_IDENTIFIER_LEN: usize = 63;

/// Alias for the computed distance column in search results.
pub const DISTANCE_ALIAS: &str = "_distance";

pub fn validate_identifier(kind: &str, name: &str) -> Result<(), PgVectorStoreError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_start || !valid_rest || name.len() > MAX_IDENTIFIER_LEN {
        return Err(PgVectorStoreError::Config(format!(
            "{kind} '{name}' is not a plain SQL identifier"
        )));
    }
    Ok(())
}

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn create_extension() -> &'static str {
    "CREATE EXTENSION IF NOT EXISTS vector"
}

pub fn create_table(table: &str, columns: &ColumnConfig, dimension: usize) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({} uuid PRIMARY KEY, {} text, {} jsonb, {} vector({}))",
        quote_identifier(table),
        quote_identifier(&columns.id),
        quote_identifier(&columns.content),
        quote_identifier(&columns.metadata),
        quote_identifier(&columns.vector),
        dimension
    )
}

pub fn delete_all(table: &str) -> String {
    format!("DELETE FROM {}", quote_identifier(table))
}

pub fn count_rows(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", quote_identifier(table))
}

/// `INSERT INTO .. (cols) ` ready for a `VALUES` list in id, content,
/// metadata, vector order.
pub fn insert_prefix(table: &str, columns: &ColumnConfig) -> String {
    format!(
        "INSERT INTO {} ({}, {}, {}, {}) ",
        quote_identifier(table),
        quote_identifier(&columns.id),
        quote_identifier(&columns.content),
        quote_identifier(&columns.metadata),
        quote_identifier(&columns.vector)
    )
}

/// Binds `$1` = query vector, `$2` = limit.
pub fn similarity_search(table: &str, columns: &ColumnConfig) -> String {
    format!(
        "SELECT {id}::text AS id, {content} AS content, {metadata} AS metadata, \
         {vector} <=> $1 AS {distance} FROM {table} ORDER BY {distance} ASC LIMIT $2",
        id = quote_identifier(&columns.id),
        content = quote_identifier(&columns.content),
        metadata = quote_identifier(&columns.metadata),
        vector = quote_identifier(&columns.vector),
        distance = quote_identifier(DISTANCE_ALIAS),
        table = quote_identifier(table),
    )
}
