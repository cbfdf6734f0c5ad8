//! External market data interfaces: tick ingestion from CSV.

pub mod loader;

pub use loader::{load_ticks_csv, LoadError};
