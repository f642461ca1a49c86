//! Event log normalization and location/pathway resolution.
//!
//! - **parse**: raw rows to timestamped records
//! - **normalize**: deduplication, truncation and admission relabeling
//! - **resolve**: locations, synthesized events, order keys and pathways
//! - **pipeline**: the [`TransformStep`] contract and its ordered executor

pub mod context;
pub mod log;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod resolve;

pub use context::TransformContext;
pub use log::EventLog;
pub use normalize::{SourceEvents, build_normalization_pipeline, normalize};
pub use parse::parse_events;
pub use pipeline::{PipelineOutcome, TransformPipeline, TransformStep};
pub use resolve::{Resolved, build_resolution_pipeline, resolve, tag_pathways};
