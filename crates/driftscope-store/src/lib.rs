//! Storage layer: in-memory store and DuckDB (file-backed or in-memory).

mod error;
mod memory;
mod record;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use record::{AnalysisRecord, AnalysisStore, LATEST_LIMIT, NewAnalysis};

#[cfg(feature = "duckdb")]
mod duck;
#[cfg(feature = "duckdb")]
pub use duck::DuckStore;
