//! Transition graph synthesis and post-processing.
//!
//! - **build**: next-event linkage and aggregation into counted edges
//! - **prune**: visit-level exclusion and edge-level pruning with renormalization
//! - **recurrence**: splicing recurring processes after their triggers
//! - **wait**: wait-in-place classification
//! - **analysis**: one configured analysis end to end

pub mod analysis;
pub mod build;
pub mod graph;
pub mod prune;
pub mod recurrence;
pub mod wait;

pub use analysis::{AnalysisOutcome, run_analysis};
pub use build::{Link, Linkage, aggregate, build_transitions, link_events};
pub use graph::TransitionGraph;
pub use prune::{PrunedGraph, prune_edges, visits_below};
pub use recurrence::{InjectedGraph, KICKOFF_NOTE, inject_recurrence};
pub use wait::wait_in_place;
