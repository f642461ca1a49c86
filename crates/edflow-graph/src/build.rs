//! Next-event linkage and population aggregation.

use std::collections::BTreeMap;

use tracing::warn;

use edflow_model::{CanonicalLog, EventOrigin, ProcessId, TransitionEdge, VisitId};

use crate::graph::TransitionGraph;

/// One event and the process of the event that follows it in its visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub visit_id: VisitId,
    pub from: ProcessId,
    pub to: ProcessId,
    /// Origin of the `from` event.
    pub origin: EventOrigin,
}

/// Per-(visit, event) next-event links of a log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Linkage {
    pub links: Vec<Link>,
    /// Adjacent events sharing both time and order key. Their relative order
    /// falls back to event name, then arrival order.
    pub ties: usize,
}

/// Links every event to its successor within its visit.
///
/// The last event of a visit has no successor and produces no link.
pub fn link_events(log: &CanonicalLog) -> Linkage {
    let mut linkage = Linkage::default();
    for (visit, events) in log.visits() {
        for pair in events.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            if current.sequence_key() == next.sequence_key() {
                linkage.ties += 1;
            }
            linkage.links.push(Link {
                visit_id: visit.clone(),
                from: current.process(),
                to: next.process(),
                origin: current.origin,
            });
        }
    }
    if linkage.ties > 0 {
        warn!(
            ties = linkage.ties,
            "events share time and order key; ordered by name"
        );
    }
    linkage
}

/// Aggregates links into counted, percentage-weighted edges.
///
/// `total_from` counts only events that have a successor.
pub fn aggregate(links: &[Link]) -> TransitionGraph {
    let mut counts: BTreeMap<(&ProcessId, &ProcessId), usize> = BTreeMap::new();
    let mut totals: BTreeMap<&ProcessId, usize> = BTreeMap::new();
    for link in links {
        *counts.entry((&link.from, &link.to)).or_default() += 1;
        *totals.entry(&link.from).or_default() += 1;
    }
    TransitionGraph::from_edges(counts.into_iter().filter_map(|((from, to), count)| {
        let total = totals.get(from).copied().unwrap_or_default();
        TransitionEdge::observed(from.clone(), to.clone(), count, total)
    }))
}

/// Links `log` and aggregates the links in one step.
pub fn build_transitions(log: &CanonicalLog) -> (TransitionGraph, Linkage) {
    let linkage = link_events(log);
    (aggregate(&linkage.links), linkage)
}
