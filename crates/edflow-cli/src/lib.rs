//! CLI library components for the `edflow` binary.

pub mod logging;
pub mod pipeline;
pub mod types;
