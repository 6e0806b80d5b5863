use std::fmt;

use simsearch_core::{SearchResult, StoreError};

/// Where a run is. Only ever moves forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    Connected,
    Cleared,
    Loaded,
    Inserted,
    InsertFailed,
    Queried,
    Closed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Connected => "connected",
            PipelineStage::Cleared => "cleared",
            PipelineStage::Loaded => "loaded",
            PipelineStage::Inserted => "inserted",
            PipelineStage::InsertFailed => "insert_failed",
            PipelineStage::Queried => "queried",
            PipelineStage::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum InsertReport {
    Complete {
        ids: Vec<String>,
    },
    /// The batch stopped early. Rows in `inserted_ids` remain in the table.
    Partial {
        inserted_ids: Vec<String>,
        attempted: usize,
        error: StoreError,
        /// Working-directory listing captured when the failure was logged.
        directory_listing: Vec<String>,
    },
}

impl InsertReport {
    pub fn is_complete(&self) -> bool {
        matches!(self, InsertReport::Complete { .. })
    }

    pub fn inserted(&self) -> usize {
        match self {
            InsertReport::Complete { ids } => ids.len(),
            InsertReport::Partial { inserted_ids, .. } => inserted_ids.len(),
        }
    }
}

#[derive(Debug)]
pub struct PipelineReport {
    pub query: String,
    /// Rows removed by the initial clear.
    pub cleared: u64,
    /// Documents read from the input file.
    pub loaded: usize,
    pub insert: InsertReport,
    pub rows_after_insert: Option<u64>,
    /// Nearest first.
    pub results: Vec<SearchResult>,
    pub stage: PipelineStage,
}
