//! Directed transition edges between processes.

use serde::{Deserialize, Serialize};

use crate::process::ProcessId;

/// Tolerance used when checking that branch probabilities sum to 100.
pub const PERCENT_TOLERANCE: f64 = 1e-6;

/// Share of `count` in `total`, in percent.
///
/// Returns `None` when `total` is zero: "no data" is not 0%.
pub fn percentage(count: usize, total: usize) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(100.0 * count as f64 / total as f64)
    }
}

/// A directed, probability-weighted link between two processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionEdge {
    pub from: ProcessId,
    pub to: ProcessId,
    /// Number of (visit, event) instances making this transition.
    pub count: usize,
    /// Number of (visit, event) instances at `from` that have a successor.
    pub total_from: usize,
    pub percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TransitionEdge {
    /// Builds an observed edge. Returns `None` when `total_from` is zero.
    pub fn observed(from: ProcessId, to: ProcessId, count: usize, total_from: usize) -> Option<Self> {
        let percentage = percentage(count, total_from)?;
        Some(Self {
            from,
            to,
            count,
            total_from,
            percentage,
            note: None,
        })
    }

    /// Builds a configured edge that has no observed counts behind it.
    pub fn configured(from: ProcessId, to: ProcessId, percentage: f64) -> Self {
        Self {
            from,
            to,
            count: 0,
            total_from: 0,
            percentage,
            note: None,
        }
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Outgoing branches of one node.
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing<'a> {
    /// At least one outgoing edge; percentages sum to 100.
    Edges(Vec<&'a TransitionEdge>),
    /// The node had edges, but every one was pruned away.
    DeadEnd,
    /// The node never had an outgoing edge.
    Absent,
}

impl Outgoing<'_> {
    /// Sum of branch percentages; `None` when there are no branches.
    pub fn total_percentage(&self) -> Option<f64> {
        match self {
            Self::Edges(edges) => Some(edges.iter().map(|edge| edge.percentage).sum()),
            Self::DeadEnd | Self::Absent => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_total_is_no_data() {
        assert_eq!(percentage(0, 0), None);
        assert_eq!(percentage(0, 4), Some(0.0));
        assert_eq!(percentage(1, 4), Some(25.0));
    }

    #[test]
    fn observed_edge_requires_population() {
        let from = ProcessId::new("Triaged", "Majors");
        let to = ProcessId::new("Discharged", "Majors");
        assert!(TransitionEdge::observed(from.clone(), to.clone(), 0, 0).is_none());
        let edge = TransitionEdge::observed(from, to, 3, 4).expect("edge");
        assert!((edge.percentage - 75.0).abs() < PERCENT_TOLERANCE);
    }
}
