//! Directed transition graph keyed by process.

use std::collections::{BTreeMap, BTreeSet};

use edflow_model::{Outgoing, ProcessId, TransitionEdge};

/// Edges grouped by origin, plus the nodes left without outgoing edges by
/// pruning.
///
/// Iteration is ordered by `(from, to)`, so every table derived from a graph
/// is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionGraph {
    outgoing: BTreeMap<ProcessId, BTreeMap<ProcessId, TransitionEdge>>,
    dead_ends: BTreeSet<ProcessId>,
}

impl TransitionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_edges(edges: impl IntoIterator<Item = TransitionEdge>) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph.insert(edge);
        }
        graph
    }

    /// Adds `edge`, replacing any edge between the same processes.
    pub fn insert(&mut self, edge: TransitionEdge) {
        self.dead_ends.remove(&edge.from);
        self.outgoing
            .entry(edge.from.clone())
            .or_default()
            .insert(edge.to.clone(), edge);
    }

    /// Records that `node` lost every outgoing edge.
    pub fn mark_dead_end(&mut self, node: ProcessId) {
        self.outgoing.remove(&node);
        self.dead_ends.insert(node);
    }

    /// Removes and returns every edge leaving `from`.
    pub fn remove_outgoing(&mut self, from: &ProcessId) -> Vec<TransitionEdge> {
        self.outgoing
            .remove(from)
            .map(|edges| edges.into_values().collect())
            .unwrap_or_default()
    }

    pub fn edge(&self, from: &ProcessId, to: &ProcessId) -> Option<&TransitionEdge> {
        self.outgoing.get(from).and_then(|edges| edges.get(to))
    }

    pub fn edges(&self) -> impl Iterator<Item = &TransitionEdge> {
        self.outgoing.values().flat_map(BTreeMap::values)
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.outgoing.is_empty() && self.dead_ends.is_empty()
    }

    /// Branches leaving `from`; dead ends are distinct from unknown nodes.
    pub fn outgoing(&self, from: &ProcessId) -> Outgoing<'_> {
        match self.outgoing.get(from) {
            Some(edges) if !edges.is_empty() => Outgoing::Edges(edges.values().collect()),
            _ if self.dead_ends.contains(from) => Outgoing::DeadEnd,
            _ => Outgoing::Absent,
        }
    }

    /// Nodes with at least one outgoing edge.
    pub fn from_nodes(&self) -> impl Iterator<Item = &ProcessId> {
        self.outgoing.keys()
    }

    pub fn dead_ends(&self) -> impl Iterator<Item = &ProcessId> {
        self.dead_ends.iter()
    }

    /// Every process appearing as an origin, destination or dead end.
    pub fn nodes(&self) -> BTreeSet<&ProcessId> {
        self.edges()
            .flat_map(|edge| [&edge.from, &edge.to])
            .chain(self.dead_ends.iter())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(name: &str) -> ProcessId {
        ProcessId::new(name, "Majors")
    }

    #[test]
    fn unknown_node_is_absent_and_pruned_node_is_dead_end() {
        let mut graph = TransitionGraph::from_edges([TransitionEdge::configured(
            process("A"),
            process("B"),
            100.0,
        )]);
        assert_eq!(graph.outgoing(&process("Z")), Outgoing::Absent);

        graph.mark_dead_end(process("A"));

        assert_eq!(graph.outgoing(&process("A")), Outgoing::DeadEnd);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.nodes().contains(&process("A")));
    }

    #[test]
    fn inserting_an_edge_revives_a_dead_end() {
        let mut graph = TransitionGraph::new();
        graph.mark_dead_end(process("A"));
        graph.insert(TransitionEdge::configured(process("A"), process("B"), 100.0));
        assert_eq!(graph.outgoing(&process("A")).total_percentage(), Some(100.0));
        assert_eq!(graph.dead_ends().count(), 0);
    }
}
