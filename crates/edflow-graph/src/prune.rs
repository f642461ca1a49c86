//! Threshold pruning by visit and by edge.

use std::collections::BTreeSet;

use tracing::debug;

use edflow_model::{Outgoing, PERCENT_TOLERANCE, TransitionEdge, VisitId, redact_value};

use crate::build::Linkage;
use crate::graph::TransitionGraph;

/// Visits making at least one transition rarer than `threshold` percent.
///
/// Transitions out of sentinels are ignored. The caller re-aggregates the
/// remaining population once; edges that fall below the threshold as a
/// result are left alone.
pub fn visits_below(
    graph: &TransitionGraph,
    linkage: &Linkage,
    threshold: f64,
) -> BTreeSet<VisitId> {
    let mut excluded = BTreeSet::new();
    for link in &linkage.links {
        if link.origin.is_sentinel() || excluded.contains(&link.visit_id) {
            continue;
        }
        let rare = graph
            .edge(&link.from, &link.to)
            .is_some_and(|edge| edge.percentage < threshold);
        if rare {
            debug!(
                visit = redact_value(link.visit_id.as_str()),
                from = %link.from,
                to = %link.to,
                "visit makes a rare transition"
            );
            excluded.insert(link.visit_id.clone());
        }
    }
    excluded
}

/// Result of edge-level pruning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrunedGraph {
    pub graph: TransitionGraph,
    pub removed: usize,
}

/// Removes edges at or below `threshold` percent and rescales the survivors
/// of each origin to sum to 100.
///
/// An origin losing every edge becomes a dead end instead of a set of 0%
/// branches.
pub fn prune_edges(graph: &TransitionGraph, threshold: f64) -> PrunedGraph {
    let mut pruned = TransitionGraph::new();
    let mut removed = 0;
    for node in graph.dead_ends() {
        pruned.mark_dead_end(node.clone());
    }
    for from in graph.from_nodes() {
        let Outgoing::Edges(edges) = graph.outgoing(from) else {
            continue;
        };
        let survivors: Vec<&TransitionEdge> = edges
            .iter()
            .copied()
            .filter(|edge| edge.percentage > threshold + PERCENT_TOLERANCE)
            .collect();
        removed += edges.len() - survivors.len();

        let retained: f64 = survivors.iter().map(|edge| edge.percentage).sum();
        if survivors.is_empty() || retained <= 0.0 {
            debug!(from = %from, "every outgoing edge pruned");
            pruned.mark_dead_end(from.clone());
            continue;
        }
        let total_from = survivors.iter().map(|edge| edge.count).sum();
        for edge in survivors {
            pruned.insert(TransitionEdge {
                total_from,
                percentage: edge.percentage * 100.0 / retained,
                ..edge.clone()
            });
        }
    }
    PrunedGraph {
        graph: pruned,
        removed,
    }
}
