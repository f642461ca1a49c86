//! Ingestion of emergency department extracts.
//!
//! - **table**: header-addressed CSV reading
//! - **sources**: events, admission status, observations and diagnostics
//!   loaders mapped into the shared row shape

pub mod error;
pub mod sources;
pub mod table;

pub use error::{IngestError, Result};
pub use sources::{
    collapse_requests, load_admissions, load_diagnostics, load_events, load_observations,
};
pub use table::CsvTable;
