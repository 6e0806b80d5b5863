//! The clear / load / insert / query sequence over any `VectorStore`.
//!
//! The store arrives already connected; `PipelineDriver::run` takes it the
//! rest of the way and closes it exactly once, whatever happens in between.

mod diagnostics;
mod driver;
mod error;
mod report;

pub use diagnostics::list_directory;
pub use driver::{resolve_query, PipelineDriver, DEFAULT_K, DEFAULT_QUERY};
pub use error::PipelineError;
pub use report::{InsertReport, PipelineReport, PipelineStage};
