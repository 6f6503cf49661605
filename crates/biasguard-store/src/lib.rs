//! Storage layer: in-memory maps for tests and embedding, DuckDB for persistence.

mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::{parse_terms_json, read_terms_file};
pub use memory::MemoryStore;

#[cfg(feature = "duckdb")]
mod duck;
#[cfg(feature = "duckdb")]
pub use duck::DuckStore;
