//! Counts of what each stage removed or synthesized.
//!
//! Data-quality exclusions are silent in the output tables but never
//! invisible: every transform reports what it did here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Outcome of one transform unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: String,
    pub events_in: usize,
    pub events_out: usize,
    pub visits_in: usize,
    pub visits_out: usize,
    /// Events removed, by reason.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dropped_events: BTreeMap<String, usize>,
    /// Whole visits removed, by reason.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dropped_visits: BTreeMap<String, usize>,
    /// Events created, by kind.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub synthesized: BTreeMap<String, usize>,
    /// Events changed in place, by kind.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relabeled: BTreeMap<String, usize>,
}

impl StageReport {
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            ..Self::default()
        }
    }

    pub fn drop_events(&mut self, reason: &str, count: usize) {
        bump(&mut self.dropped_events, reason, count);
    }

    pub fn drop_visits(&mut self, reason: &str, count: usize) {
        bump(&mut self.dropped_visits, reason, count);
    }

    pub fn synthesize(&mut self, kind: &str, count: usize) {
        bump(&mut self.synthesized, kind, count);
    }

    pub fn relabel(&mut self, kind: &str, count: usize) {
        bump(&mut self.relabeled, kind, count);
    }

    pub fn total_dropped_events(&self) -> usize {
        self.dropped_events.values().sum()
    }

    pub fn total_dropped_visits(&self) -> usize {
        self.dropped_visits.values().sum()
    }

    /// True when the stage changed nothing.
    pub fn is_noop(&self) -> bool {
        self.events_in == self.events_out
            && self.visits_in == self.visits_out
            && self.total_dropped_events() == 0
            && self.total_dropped_visits() == 0
            && self.synthesized.values().sum::<usize>() == 0
            && self.relabeled.values().sum::<usize>() == 0
    }
}

fn bump(counts: &mut BTreeMap<String, usize>, key: &str, count: usize) {
    if count == 0 {
        return;
    }
    *counts.entry(key.to_string()).or_default() += count;
}

/// Summary of one analysis run over the transition graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub analysis: String,
    pub visits: usize,
    pub events: usize,
    pub edges: usize,
    pub excluded_visits: usize,
    pub pruned_edges: usize,
    pub injected_edges: usize,
    pub dead_ends: Vec<String>,
    pub ordering_ties: usize,
    pub wait_in_place: usize,
}
