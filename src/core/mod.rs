//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod loader;
pub mod log;
pub mod normalize;
pub mod series;
pub mod table;

// Re-export main types for cleaner imports
pub use cache::TableCache;
pub use loader::{LoadedTable, TableOrigin, TableRequest, build_combined_table};
pub use series::{RawObservation, SeriesFetcher};
pub use table::{CombinedTable, ObservationTable};
