use std::fmt::Write as _;

use serde_json::{Map, Value};
use simsearch_core::SearchResult;

pub fn header(query: &str) -> String {
    format!("The nearest neighbors of \"{query}\" by cosine distance are:")
}

/// One line per result, nearest first: rank, distance, content, metadata.
pub fn format_results(query: &str, results: &[SearchResult]) -> String {
    let mut out = header(query);
    out.push('\n');
    for (rank, result) in results.iter().enumerate() {
        let metadata: Map<String, Value> = result
            .document
            .metadata
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let _ = writeln!(
            out,
            "{:>3}. {:.6}  {}  {}",
            rank + 1,
            result.distance,
            result.document.content,
            Value::Object(metadata)
        );
    }
    out
}
