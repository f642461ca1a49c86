//! Output table rows.
//!
//! Column names follow the files the downstream simulator reads, so every
//! row struct renames its fields explicitly.

use serde::Serialize;

use edflow_graph::{AnalysisOutcome, TransitionGraph};
use edflow_model::{
    CanonicalLog, EventNames, EventOrigin, RecurrenceParameters, RecurrenceRule, TransitionEdge,
};

/// Note written for origins whose every outgoing edge was pruned.
pub const DEAD_END_NOTE: &str = "No outgoing transitions";

/// One row of `Pathway Definition.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathwayRow {
    #[serde(rename = "From Process")]
    pub from: String,
    #[serde(rename = "To Process")]
    pub to: String,
    #[serde(rename = "(Consequent Priority)")]
    pub priority: String,
    #[serde(rename = "Percentage")]
    pub percentage: String,
    #[serde(rename = "Notes")]
    pub notes: String,
}

/// One row of `Process Recurrence Triggers.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurrenceTriggerRow {
    #[serde(rename = "Trigger Process")]
    pub trigger: String,
    #[serde(rename = "Recurrent Process")]
    pub recurrent: String,
    #[serde(rename = "Probability")]
    pub probability: String,
    #[serde(rename = "Notes")]
    pub notes: String,
}

/// One row of `Process Recurrence.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurrenceParameterRow {
    #[serde(rename = "Recurrent Process")]
    pub recurrent: String,
    #[serde(rename = "Mean")]
    pub mean: Option<u32>,
    #[serde(rename = "Std")]
    pub std_dev: Option<u32>,
    #[serde(rename = "Min")]
    pub min: u32,
    #[serde(rename = "Max")]
    pub max: Option<u32>,
}

/// One row of `Process Wait in Place.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaitInPlaceRow {
    #[serde(rename = "Process")]
    pub process: String,
}

/// One row of `Events Data.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRow {
    #[serde(rename = "VisitId")]
    pub visit_id: String,
    #[serde(rename = "EventName")]
    pub event_name: String,
    #[serde(rename = "EventTime")]
    pub event_time: String,
    #[serde(rename = "EventStaffId")]
    pub staff_id: Option<String>,
    #[serde(rename = "EventLocation")]
    pub location: String,
    #[serde(rename = "Pathway")]
    pub pathway: String,
    #[serde(rename = "Process")]
    pub process: String,
    #[serde(rename = "OrderKey")]
    pub order_key: u32,
    #[serde(rename = "Origin")]
    pub origin: String,
    #[serde(rename = "NextProcess")]
    pub next_process: Option<String>,
}

/// Percentages with at most four decimals and no trailing zeros.
pub fn format_percentage(value: f64) -> String {
    let text = format!("{value:.4}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn pathway_row(edge: &TransitionEdge) -> PathwayRow {
    PathwayRow {
        from: edge.from.label(),
        to: edge.to.label(),
        priority: String::new(),
        percentage: format_percentage(edge.percentage),
        notes: edge.note.clone().unwrap_or_default(),
    }
}

/// Pathway rows for every edge, then one row per dead end.
///
/// Edges leaving the opening sentinel are left out: they describe arrival
/// mix, not a process step.
pub fn pathway_rows(graph: &TransitionGraph, names: &EventNames) -> Vec<PathwayRow> {
    let mut rows: Vec<PathwayRow> = graph
        .edges()
        .filter(|edge| edge.from.event_name != names.opening_sentinel)
        .map(pathway_row)
        .collect();
    rows.extend(graph.dead_ends().map(|node| PathwayRow {
        from: node.label(),
        to: String::new(),
        priority: String::new(),
        percentage: String::new(),
        notes: DEAD_END_NOTE.to_string(),
    }));
    rows
}

/// One row per applied rule; the kickoff process starts the recurrence.
pub fn recurrence_trigger_rows(rules: &[RecurrenceRule]) -> Vec<RecurrenceTriggerRow> {
    rules
        .iter()
        .map(|rule| RecurrenceTriggerRow {
            trigger: rule.kickoff.label(),
            recurrent: rule.recurrent_process.clone(),
            probability: format_percentage(100.0),
            notes: format!("Triggered from {}", rule.trigger),
        })
        .collect()
}

/// Interval parameters per distinct recurrent process, in rule order.
pub fn recurrence_parameter_rows(rules: &[RecurrenceRule]) -> Vec<RecurrenceParameterRow> {
    let mut rows: Vec<RecurrenceParameterRow> = Vec::new();
    for rule in rules {
        if rows.iter().any(|row| row.recurrent == rule.recurrent_process) {
            continue;
        }
        let params = RecurrenceParameters::from_name(&rule.recurrent_process);
        rows.push(RecurrenceParameterRow {
            recurrent: params.recurrent_process,
            mean: params.mean,
            std_dev: params.std_dev,
            min: params.min,
            max: params.max,
        });
    }
    rows
}

pub fn wait_in_place_rows(outcome: &AnalysisOutcome) -> Vec<WaitInPlaceRow> {
    outcome
        .wait_in_place
        .iter()
        .map(|process| WaitInPlaceRow {
            process: process.clone(),
        })
        .collect()
}

/// Every canonical event with its successor's process, times rendered in
/// `timestamp_format`.
pub fn event_rows(log: &CanonicalLog, timestamp_format: &str) -> Vec<EventRow> {
    let mut rows = Vec::with_capacity(log.event_count());
    for (_, events) in log.visits() {
        for (index, event) in events.iter().enumerate() {
            rows.push(EventRow {
                visit_id: event.visit_id.to_string(),
                event_name: event.event_name.clone(),
                event_time: event.event_time.format(timestamp_format).to_string(),
                staff_id: event.staff_id.clone(),
                location: event.location.clone(),
                pathway: event.pathway.clone(),
                process: event.process().label(),
                order_key: event.order_key.value(),
                origin: origin_name(event.origin).to_string(),
                next_process: events.get(index + 1).map(|next| next.process().label()),
            });
        }
    }
    rows
}

fn origin_name(origin: EventOrigin) -> &'static str {
    match origin {
        EventOrigin::Recorded => "recorded",
        EventOrigin::WalkIn => "walk_in",
        EventOrigin::Boarding => "boarding",
        EventOrigin::OpeningSentinel => "opening_sentinel",
        EventOrigin::ClosingSentinel => "closing_sentinel",
    }
}
