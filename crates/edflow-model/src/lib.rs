//! Data model for emergency department flow analysis.
//!
//! - **event**: raw, in-flight and canonical event records
//! - **log**: canonical events grouped by visit
//! - **process**: `(event, pathway)` process identifiers
//! - **order**: tie-breaking order keys
//! - **transition**: transition edges and branch percentages
//! - **recurrence**: recurring background processes
//! - **config**: configuration surface and validation
//! - **stats**: per-stage exclusion and synthesis counts
//! - **redact**: row-level logging switch

pub mod config;
pub mod error;
pub mod event;
pub mod log;
pub mod order;
pub mod process;
pub mod recurrence;
pub mod redact;
pub mod stats;
pub mod transition;

pub use config::{
    AnalysisConfig, DuplicateGates, EventNames, NameCollision, PipelineConfig, Pruning,
    PruningMode,
};
pub use error::{ConfigError, Result};
pub use event::{AdmissionStatus, CanonicalEvent, EventOrigin, EventRecord, RawEvent, VisitId};
pub use log::CanonicalLog;
pub use order::{OrderKey, ProcessOrder};
pub use process::ProcessId;
pub use recurrence::{RecurrenceParameters, RecurrenceRule};
pub use redact::{REDACTED_VALUE, log_data_enabled, redact_value, set_log_data_enabled};
pub use stats::{GraphSummary, StageReport};
pub use transition::{Outgoing, PERCENT_TOLERANCE, TransitionEdge, percentage};
