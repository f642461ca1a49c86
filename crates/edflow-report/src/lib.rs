//! Output tables for emergency department flow analyses.
//!
//! Each analysis writes, into its own directory:
//!
//! - **Events Data**: the resolved event log with next-process links
//! - **Pathway Definition**: the final transition graph
//! - **Process Recurrence Triggers** and **Process Recurrence**: spliced
//!   recurring processes and their interval parameters
//! - **Process Wait in Place**: processes that hold their location
//! - **Run Summary**: stage and graph counts as JSON

mod tables;
mod write;

pub use tables::{
    DEAD_END_NOTE, EventRow, PathwayRow, RecurrenceParameterRow, RecurrenceTriggerRow,
    WaitInPlaceRow, event_rows, format_percentage, pathway_rows, recurrence_parameter_rows,
    recurrence_trigger_rows, wait_in_place_rows,
};
pub use write::{
    EVENTS_FILE, PATHWAY_FILE, RECURRENCE_FILE, RECURRENCE_TRIGGERS_FILE, RunSummary,
    SUMMARY_FILE, WAIT_IN_PLACE_FILE, analysis_dir_name, render_csv, write_analysis_outputs,
    write_csv,
};
